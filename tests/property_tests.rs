//! Property-based tests - pragmatic approach testing the core text
//! round-trip guarantees across generated documents.

use graphdoc::{parse, printer, DocMap, DocValue};
use proptest::prelude::*;

fn arb_doc() -> impl Strategy<Value = DocValue> {
    let leaf = prop_oneof![
        Just(DocValue::Null),
        any::<bool>().prop_map(DocValue::Bool),
        any::<i64>().prop_map(DocValue::Int),
        any::<f64>()
            .prop_filter("finite floats only", |f| f.is_finite())
            .prop_map(DocValue::Float),
        any::<String>().prop_map(DocValue::from),
    ];
    leaf.prop_recursive(3, 24, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(DocValue::Array),
            prop::collection::vec(("[a-z]{1,8}", inner), 0..6).prop_map(|entries| {
                let mut map = DocMap::new();
                for (key, value) in entries {
                    map.insert(key, value);
                }
                DocValue::Object(map)
            }),
        ]
    })
}

proptest! {
    #[test]
    fn prop_parse_inverts_print(value in arb_doc()) {
        let printed = printer::to_string(&value);
        let reparsed = parse(&printed).unwrap();
        prop_assert_eq!(reparsed, value);
    }

    #[test]
    fn prop_compact_printing_idempotent(value in arb_doc()) {
        let printed = printer::to_string(&value);
        prop_assert_eq!(printer::to_string(&parse(&printed).unwrap()), printed);
    }

    #[test]
    fn prop_pretty_printing_idempotent(value in arb_doc()) {
        let printed = printer::to_string_pretty(&value);
        prop_assert_eq!(printer::to_string_pretty(&parse(&printed).unwrap()), printed);
    }

    #[test]
    fn prop_int_kind_preserved(n in any::<i64>()) {
        let reparsed = parse(&printer::to_string(&DocValue::Int(n))).unwrap();
        prop_assert_eq!(reparsed, DocValue::Int(n));
    }

    #[test]
    fn prop_float_kind_preserved(f in any::<f64>().prop_filter("finite", |f| f.is_finite())) {
        let printed = printer::to_string(&DocValue::Float(f));
        let reparsed = parse(&printed).unwrap();
        prop_assert!(reparsed.is_float());
        prop_assert_eq!(reparsed, DocValue::Float(f));
    }

    #[test]
    fn prop_string_escaping_roundtrips(s in any::<String>()) {
        let reparsed = parse(&printer::to_string(&DocValue::from(s.clone()))).unwrap();
        prop_assert_eq!(reparsed, DocValue::from(s));
    }
}
