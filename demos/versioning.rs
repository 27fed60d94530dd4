//! Migrate a document stored under an old schema version to the current one.
//!
//! Run with: `cargo run --example versioning`

use graphdoc::{
    parse, printer, Config, DocValue, Error, GraphSerializer, Instance, StructConverter, TypeDesc,
    TypeRegistry,
};
use std::any::TypeId;
use std::sync::Arc;

// schema v1 stored one name field
#[derive(Default)]
struct ContactV1 {
    name: String,
}

// the current schema splits the name
#[derive(Default, Debug)]
struct Contact {
    first: String,
    last: String,
}

fn main() {
    let mut registry = TypeRegistry::new();
    registry.add(TypeDesc::of::<ContactV1>("demo.ContactV1").versioned("1"));
    registry.add(
        TypeDesc::of::<Contact>("demo.Contact")
            .versioned("2")
            .ancestor::<ContactV1>()
            .migrates_with(|old| {
                let v1 = old
                    .handle::<ContactV1>()
                    .ok_or_else(|| Error::custom("expected a ContactV1 instance"))?;
                let name = v1.borrow().name.clone();
                let (first, last) = name.split_once(' ').unwrap_or((name.as_str(), ""));
                Ok(Instance::new(Contact {
                    first: first.to_string(),
                    last: last.to_string(),
                }))
            }),
    );

    let mut ser = GraphSerializer::new(Config::new(), registry);
    ser.add_converter_for::<ContactV1>(Arc::new(StructConverter::new(ContactV1::default).field(
        "name",
        |c: &ContactV1| DocValue::from(c.name.clone()),
        |c, v| Ok(c.name = v.try_str()?.to_string()),
    )));
    ser.add_converter_for::<Contact>(Arc::new(
        StructConverter::new(Contact::default)
            .field(
                "first",
                |c: &Contact| DocValue::from(c.first.clone()),
                |c, v| Ok(c.first = v.try_str()?.to_string()),
            )
            .field(
                "last",
                |c: &Contact| DocValue::from(c.last.clone()),
                |c, v| Ok(c.last = v.try_str()?.to_string()),
            ),
    ));

    let stored = r#"{"$version": "1", "name": "Ada Lovelace"}"#;
    println!("stored document:   {stored}");

    let doc = parse(stored).unwrap();
    let contact = ser.deserialize(&doc, TypeId::of::<Contact>()).assert_clean();
    println!(
        "migrated instance: {:?}",
        contact.with(|c: &Contact| format!("{} / {}", c.first, c.last))
    );

    let rewritten = ser
        .serialize(TypeId::of::<Contact>(), &contact)
        .assert_clean();
    println!("re-serialized:     {}", printer::to_string(&rewritten));
}
