//! Reserved metadata keys and the wrapping helpers built on them.
//!
//! Five object keys are reserved for the engine. They are part of the wire
//! format and must stay bit-exact for compatibility with persisted documents:
//!
//! | Key | Meaning | Value shape |
//! |---|---|---|
//! | `$ref` | object reference | decimal-string id |
//! | `$id` | object definition | decimal-string id |
//! | `$type` | runtime type override | fully-qualified type name |
//! | `$version` | schema version tag | opaque version string |
//! | `$content` | wrapper payload | the original (possibly non-object) value |
//!
//! Converter-authored keys must never collide with these; use
//! [`is_reserved_key`] to defend against collisions.
//!
//! Reference and definition ids are serialized as decimal *strings*, never as
//! raw numbers — a raw number would be ambiguous with the int64/double
//! distinction the printer encodes through the decimal point.

use crate::{DocMap, DocValue};

/// Object reference marker.
pub const KEY_REF: &str = "$ref";
/// Object definition marker.
pub const KEY_ID: &str = "$id";
/// Runtime type override marker.
pub const KEY_TYPE: &str = "$type";
/// Schema version marker.
pub const KEY_VERSION: &str = "$version";
/// Content wrapper marker for non-object payloads.
pub const KEY_CONTENT: &str = "$content";

/// Returns `true` when `key` is one of the five reserved metadata keys.
///
/// # Examples
///
/// ```rust
/// use graphdoc::meta::is_reserved_key;
///
/// assert!(is_reserved_key("$ref"));
/// assert!(is_reserved_key("$content"));
/// assert!(!is_reserved_key("ref"));
/// assert!(!is_reserved_key("$refs"));
/// ```
#[must_use]
pub fn is_reserved_key(key: &str) -> bool {
    matches!(key, KEY_REF | KEY_ID | KEY_TYPE | KEY_VERSION | KEY_CONTENT)
}

/// Builds a `{"$ref": "<id>"}` marker object.
#[must_use]
pub(crate) fn make_reference(id: u32) -> DocValue {
    let mut map = DocMap::with_capacity(1);
    map.insert(KEY_REF.to_string(), DocValue::String(id.to_string()));
    DocValue::Object(map)
}

/// Encodes an id the way the markers carry it: as a decimal string.
#[must_use]
pub(crate) fn encode_id(id: u32) -> DocValue {
    DocValue::String(id.to_string())
}

/// Decodes a marker id. The writer always emits decimal strings; integer ids
/// are tolerated for documents that predate the string-id rule.
#[must_use]
pub(crate) fn parse_id(value: &DocValue) -> Option<u32> {
    match value {
        DocValue::String(s) => s.parse().ok(),
        DocValue::Int(i) => u32::try_from(*i).ok(),
        _ => None,
    }
}

/// Makes `value` an object that metadata keys can be attached to.
///
/// Objects pass through untouched. Any other kind is moved under the
/// [`KEY_CONTENT`] wrapper key of a fresh object, so the payload survives the
/// wrapping. The printers and the deserializer both unwrap transparently.
pub(crate) fn ensure_object(value: &mut DocValue) {
    if value.is_object() {
        return;
    }
    let payload = std::mem::take(value);
    value.become_object();
    if let DocValue::Object(map) = value {
        map.insert(KEY_CONTENT.to_string(), payload);
    }
}

/// Resolves the payload of a possibly-wrapped value: the `$content` entry when
/// present, the value itself otherwise.
#[must_use]
pub(crate) fn unwrap_content(value: &DocValue, fold: bool) -> &DocValue {
    match value {
        DocValue::Object(map) => map.get_fold(KEY_CONTENT, fold).unwrap_or(value),
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_key_predicate() {
        for key in [KEY_REF, KEY_ID, KEY_TYPE, KEY_VERSION, KEY_CONTENT] {
            assert!(is_reserved_key(key));
        }
        assert!(!is_reserved_key("$Ref"));
        assert!(!is_reserved_key("content"));
    }

    #[test]
    fn test_reference_marker_uses_decimal_string() {
        let marker = make_reference(17);
        assert_eq!(marker.member(KEY_REF).as_str(), Some("17"));
        assert!(marker.member(KEY_REF).as_i64().is_none());
    }

    #[test]
    fn test_parse_id_tolerates_integers() {
        assert_eq!(parse_id(&DocValue::String("42".to_string())), Some(42));
        assert_eq!(parse_id(&DocValue::Int(42)), Some(42));
        assert_eq!(parse_id(&DocValue::Int(-1)), None);
        assert_eq!(parse_id(&DocValue::String("x".to_string())), None);
        assert_eq!(parse_id(&DocValue::Float(42.0)), None);
    }

    #[test]
    fn test_ensure_object_wraps_payload() {
        let mut value = DocValue::from(42);
        ensure_object(&mut value);
        assert!(value.is_object());
        assert_eq!(value.member(KEY_CONTENT).as_i64(), Some(42));

        // already an object: untouched
        let mut obj = DocValue::new_object();
        obj.try_object_mut().unwrap().insert("k".to_string(), DocValue::from(1));
        ensure_object(&mut obj);
        assert!(!obj.has_key(KEY_CONTENT));
        assert_eq!(obj.member("k").as_i64(), Some(1));
    }

    #[test]
    fn test_unwrap_content() {
        let mut value = DocValue::from("payload");
        ensure_object(&mut value);
        assert_eq!(unwrap_content(&value, false).as_str(), Some("payload"));

        let plain = DocValue::from(7);
        assert_eq!(unwrap_content(&plain, false).as_i64(), Some(7));
    }
}
