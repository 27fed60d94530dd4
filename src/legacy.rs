//! Rewrite pass for historical metadata shapes.
//!
//! Three shapes from earlier on-disk formats are recognized and rewritten
//! into the current marker vocabulary before the deserialization pipeline
//! runs:
//!
//! | Legacy shape | Becomes |
//! |---|---|
//! | `{"Type": t, "Data": d}` | `d` with `$type: t` attached |
//! | `{"SourceId": i, "Data": d}` | `d` with `$id: i` attached |
//! | `{"ReferenceId": i}` | `{"$ref": i}` |
//!
//! The rewrite is pure and keyed purely on shape — the number and identity of
//! the keys — never on a version marker, and it never recurses: nested legacy
//! shapes are handled as the pipeline reaches them. The module is isolated so
//! it can be deleted wholesale once no legacy documents remain.

use crate::{meta, DocMap, DocValue};

const LEGACY_TYPE: &str = "Type";
const LEGACY_DATA: &str = "Data";
const LEGACY_SOURCE_ID: &str = "SourceId";
const LEGACY_REFERENCE_ID: &str = "ReferenceId";

/// Rewrites one legacy-shaped object into the current marker vocabulary.
///
/// Returns `None` when `data` matches none of the historical shapes (the
/// common case); the caller keeps using the original value.
#[must_use]
pub fn modernize(data: &DocValue) -> Option<DocValue> {
    let map = data.as_object()?;
    match map.len() {
        1 => {
            let id = normalize_id(map.get(LEGACY_REFERENCE_ID)?)?;
            let mut out = DocMap::with_capacity(1);
            out.insert(meta::KEY_REF.to_string(), id);
            Some(DocValue::Object(out))
        }
        2 if map.contains_key(LEGACY_TYPE) && map.contains_key(LEGACY_DATA) => {
            let type_name = map.get(LEGACY_TYPE)?.clone();
            let mut out = ensure_object(map.get(LEGACY_DATA)?.clone());
            if let Ok(obj) = out.try_object_mut() {
                obj.insert(meta::KEY_TYPE.to_string(), type_name);
            }
            Some(out)
        }
        2 if map.contains_key(LEGACY_SOURCE_ID) && map.contains_key(LEGACY_DATA) => {
            let id = normalize_id(map.get(LEGACY_SOURCE_ID)?)?;
            let mut out = ensure_object(map.get(LEGACY_DATA)?.clone());
            if let Ok(obj) = out.try_object_mut() {
                obj.insert(meta::KEY_ID.to_string(), id);
            }
            Some(out)
        }
        _ => None,
    }
}

fn ensure_object(mut value: DocValue) -> DocValue {
    crate::meta::ensure_object(&mut value);
    value
}

/// Legacy documents carried ids as raw numbers; the current format uses
/// decimal strings.
fn normalize_id(value: &DocValue) -> Option<DocValue> {
    meta::parse_id(value).map(meta::encode_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;

    #[test]
    fn test_type_wrapper_shape() {
        let legacy = doc!({ "Type": "demo.Node", "Data": { "name": "a" } });
        let modern = modernize(&legacy).unwrap();
        assert_eq!(modern.member("$type").as_str(), Some("demo.Node"));
        assert_eq!(modern.member("name").as_str(), Some("a"));
    }

    #[test]
    fn test_type_wrapper_with_scalar_data() {
        let legacy = doc!({ "Type": "demo.Num", "Data": 7 });
        let modern = modernize(&legacy).unwrap();
        assert_eq!(modern.member("$type").as_str(), Some("demo.Num"));
        assert_eq!(modern.member("$content").as_i64(), Some(7));
    }

    #[test]
    fn test_source_id_shape() {
        let legacy = doc!({ "SourceId": 4, "Data": { "name": "a" } });
        let modern = modernize(&legacy).unwrap();
        assert_eq!(modern.member("$id").as_str(), Some("4"));
        assert_eq!(modern.member("name").as_str(), Some("a"));
    }

    #[test]
    fn test_reference_shape() {
        let legacy = doc!({ "ReferenceId": 4 });
        let modern = modernize(&legacy).unwrap();
        assert_eq!(modern.member("$ref").as_str(), Some("4"));
        assert_eq!(modern.count(), 1);
    }

    #[test]
    fn test_non_legacy_shapes_pass_through() {
        assert!(modernize(&doc!({ "name": "a" })).is_none());
        assert!(modernize(&doc!({ "Type": "t", "Extra": 1 })).is_none());
        assert!(modernize(&doc!({ "Type": "t", "Data": 1, "More": 2 })).is_none());
        assert!(modernize(&DocValue::Int(7)).is_none());
        assert!(modernize(&doc!({ "$ref": "3" })).is_none());
    }
}
