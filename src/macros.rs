#[macro_export]
macro_rules! doc {
    // Handle null
    (null) => {
        $crate::DocValue::Null
    };

    // Handle true
    (true) => {
        $crate::DocValue::Bool(true)
    };

    // Handle false
    (false) => {
        $crate::DocValue::Bool(false)
    };

    // Handle empty array
    ([]) => {
        $crate::DocValue::Array(vec![])
    };

    // Handle non-empty array
    ([ $($elem:tt),* $(,)? ]) => {
        $crate::DocValue::Array(vec![$($crate::doc!($elem)),*])
    };

    // Handle empty object
    ({}) => {
        $crate::DocValue::Object($crate::DocMap::new())
    };

    // Handle non-empty object
    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut object = $crate::DocMap::new();
        $(
            object.insert($key.to_string(), $crate::doc!($value));
        )*
        $crate::DocValue::Object(object)
    }};

    // Any other expression converts through From
    ($other:expr) => {
        $crate::DocValue::from($other)
    };
}

#[cfg(test)]
mod tests {
    use crate::{DocMap, DocValue};

    #[test]
    fn test_doc_macro_primitives() {
        assert_eq!(doc!(null), DocValue::Null);
        assert_eq!(doc!(true), DocValue::Bool(true));
        assert_eq!(doc!(false), DocValue::Bool(false));
        assert_eq!(doc!(42), DocValue::Int(42));
        assert_eq!(doc!(3.5), DocValue::Float(3.5));
        assert_eq!(doc!("hello"), DocValue::String("hello".to_string()));
    }

    #[test]
    fn test_doc_macro_arrays() {
        assert_eq!(doc!([]), DocValue::Array(vec![]));

        let arr = doc!([1, 2, "three"]);
        match arr {
            DocValue::Array(vec) => {
                assert_eq!(vec.len(), 3);
                assert_eq!(vec[0], DocValue::Int(1));
                assert_eq!(vec[2], DocValue::from("three"));
            }
            _ => panic!("Expected array"),
        }
    }

    #[test]
    fn test_doc_macro_objects() {
        assert_eq!(doc!({}), DocValue::Object(DocMap::new()));

        let obj = doc!({
            "name": "Alice",
            "age": 30,
            "nested": { "deep": [true] }
        });

        assert_eq!(obj.member("name").as_str(), Some("Alice"));
        assert_eq!(obj.member("age").as_i64(), Some(30));
        assert_eq!(obj.member("nested").member("deep").element(0).as_bool(), Some(true));
    }
}
