//! The document value — a JSON-like closed union.
//!
//! [`DocValue`] is the exchange type of the whole crate: converters produce
//! it, the printers render it, the parser reconstructs it. It holds exactly
//! one of seven kinds:
//!
//! - `Null`, `Bool`, `Int` (64-bit), `Float` (64-bit), `String`
//! - `Array` — an ordered list of values
//! - `Object` — an insertion-ordered string-keyed map ([`DocMap`])
//!
//! Two invariants are load-bearing:
//!
//! - A `Float` always prints with a decimal point, so the parser can tell the
//!   numeric kinds apart from the text alone.
//! - Arrays and objects never self-reference. Cycles in a *source object
//!   graph* are encoded indirectly through the reserved `$ref`/`$id` markers,
//!   never as a cyclic value tree.
//!
//! ## Usage Patterns
//!
//! ```rust
//! use graphdoc::{doc, DocValue};
//!
//! let value = doc!({
//!     "name": "Alice",
//!     "scores": [7, 3.5]
//! });
//!
//! assert!(value.is_object());
//! assert_eq!(value.member("name").as_str(), Some("Alice"));
//! assert_eq!(value.member("scores").count(), 2);
//! // absent keys degrade to the null sentinel, never panic
//! assert!(value.member("missing").is_null());
//! ```

use crate::{DocMap, Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

static NULL_SENTINEL: DocValue = DocValue::Null;

/// A dynamically-typed document value holding exactly one of seven kinds.
#[derive(Clone, Debug, Default)]
pub enum DocValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<DocValue>),
    Object(DocMap),
}

/// Discriminant of a [`DocValue`], for kind queries and error messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocKind {
    Null,
    Bool,
    Int,
    Float,
    String,
    Array,
    Object,
}

impl DocKind {
    /// Human-readable kind name, as used in wrong-kind errors.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            DocKind::Null => "null",
            DocKind::Bool => "bool",
            DocKind::Int => "int64",
            DocKind::Float => "double",
            DocKind::String => "string",
            DocKind::Array => "array",
            DocKind::Object => "object",
        }
    }
}

impl fmt::Display for DocKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl DocValue {
    /// Creates an empty array value.
    #[must_use]
    pub fn new_array() -> Self {
        DocValue::Array(Vec::new())
    }

    /// Creates an empty object value.
    #[must_use]
    pub fn new_object() -> Self {
        DocValue::Object(DocMap::new())
    }

    /// Returns the active kind.
    #[must_use]
    pub const fn kind(&self) -> DocKind {
        match self {
            DocValue::Null => DocKind::Null,
            DocValue::Bool(_) => DocKind::Bool,
            DocValue::Int(_) => DocKind::Int,
            DocValue::Float(_) => DocKind::Float,
            DocValue::String(_) => DocKind::String,
            DocValue::Array(_) => DocKind::Array,
            DocValue::Object(_) => DocKind::Object,
        }
    }

    /// Returns `true` if the value is null.
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, DocValue::Null)
    }

    /// Returns `true` if the value is a boolean.
    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, DocValue::Bool(_))
    }

    /// Returns `true` if the value is a 64-bit integer.
    #[inline]
    #[must_use]
    pub const fn is_int(&self) -> bool {
        matches!(self, DocValue::Int(_))
    }

    /// Returns `true` if the value is a 64-bit float.
    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, DocValue::Float(_))
    }

    /// Returns `true` if the value is a string.
    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, DocValue::String(_))
    }

    /// Returns `true` if the value is an array.
    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, DocValue::Array(_))
    }

    /// Returns `true` if the value is an object.
    #[inline]
    #[must_use]
    pub const fn is_object(&self) -> bool {
        matches!(self, DocValue::Object(_))
    }

    /// If the value is a boolean, returns it.
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DocValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// If the value is an integer, returns it.
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DocValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// If the value is a float, returns it.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DocValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// If the value is a string, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DocValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// If the value is an array, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&Vec<DocValue>> {
        match self {
            DocValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// If the value is an object, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&DocMap> {
        match self {
            DocValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Narrows to a boolean, failing with a wrong-kind error otherwise.
    pub fn try_bool(&self) -> Result<bool> {
        self.as_bool()
            .ok_or_else(|| Error::wrong_kind(DocKind::Bool.name(), self.kind().name()))
    }

    /// Narrows to an integer, failing with a wrong-kind error otherwise.
    pub fn try_i64(&self) -> Result<i64> {
        self.as_i64()
            .ok_or_else(|| Error::wrong_kind(DocKind::Int.name(), self.kind().name()))
    }

    /// Narrows to a float, failing with a wrong-kind error otherwise.
    pub fn try_f64(&self) -> Result<f64> {
        self.as_f64()
            .ok_or_else(|| Error::wrong_kind(DocKind::Float.name(), self.kind().name()))
    }

    /// Narrows to a string, failing with a wrong-kind error otherwise.
    pub fn try_str(&self) -> Result<&str> {
        self.as_str()
            .ok_or_else(|| Error::wrong_kind(DocKind::String.name(), self.kind().name()))
    }

    /// Narrows to an array, failing with a wrong-kind error otherwise.
    pub fn try_array(&self) -> Result<&Vec<DocValue>> {
        self.as_array()
            .ok_or_else(|| Error::wrong_kind(DocKind::Array.name(), self.kind().name()))
    }

    /// Mutable variant of [`DocValue::try_array`].
    pub fn try_array_mut(&mut self) -> Result<&mut Vec<DocValue>> {
        let kind = self.kind();
        match self {
            DocValue::Array(arr) => Ok(arr),
            _ => Err(Error::wrong_kind(DocKind::Array.name(), kind.name())),
        }
    }

    /// Narrows to an object, failing with a wrong-kind error otherwise.
    pub fn try_object(&self) -> Result<&DocMap> {
        self.as_object()
            .ok_or_else(|| Error::wrong_kind(DocKind::Object.name(), self.kind().name()))
    }

    /// Mutable variant of [`DocValue::try_object`].
    pub fn try_object_mut(&mut self) -> Result<&mut DocMap> {
        let kind = self.kind();
        match self {
            DocValue::Object(obj) => Ok(obj),
            _ => Err(Error::wrong_kind(DocKind::Object.name(), kind.name())),
        }
    }

    /// Number of elements for arrays, number of entries for objects, −1 for
    /// every other kind.
    ///
    /// The −1 contract is deliberately weak; callers must check the kind (or
    /// the sign) before trusting the count.
    #[must_use]
    pub fn count(&self) -> i64 {
        match self {
            DocValue::Array(arr) => arr.len() as i64,
            DocValue::Object(obj) => obj.len() as i64,
            _ => -1,
        }
    }

    /// Array element access that degrades to the null sentinel on any
    /// out-of-range index or non-array value.
    #[must_use]
    pub fn element(&self, index: usize) -> &DocValue {
        self.get_array_element(index).unwrap_or(&NULL_SENTINEL)
    }

    /// Object key access that degrades to the null sentinel on any absent key
    /// or non-object value. Comparison is exact; the pipeline uses
    /// [`DocMap::get_fold`] directly when case folding is configured.
    #[must_use]
    pub fn member(&self, key: &str) -> &DocValue {
        self.get_value(key).unwrap_or(&NULL_SENTINEL)
    }

    /// Returns `true` if the value is an object containing `key`.
    #[must_use]
    pub fn has_key(&self, key: &str) -> bool {
        matches!(self, DocValue::Object(obj) if obj.contains_key(key))
    }

    /// Object key lookup that degrades to `None` rather than failing.
    #[must_use]
    pub fn get_value(&self, key: &str) -> Option<&DocValue> {
        match self {
            DocValue::Object(obj) => obj.get(key),
            _ => None,
        }
    }

    /// Array element lookup that degrades to `None` rather than failing.
    #[must_use]
    pub fn get_array_element(&self, index: usize) -> Option<&DocValue> {
        match self {
            DocValue::Array(arr) => arr.get(index),
            _ => None,
        }
    }

    /// Inserts or replaces an object entry, failing with a wrong-kind error
    /// when the value is not an object.
    pub fn set_member(&mut self, key: impl Into<String>, value: DocValue) -> Result<()> {
        self.try_object_mut()?.insert(key.into(), value);
        Ok(())
    }

    /// Replaces this value, whatever it currently holds, with an empty object.
    ///
    /// Preserves nothing. The pipeline uses this to wrap a non-object payload
    /// so metadata keys can be attached; the original payload is reinserted
    /// under the content-wrapper key by [`crate::meta::ensure_object`].
    pub fn become_object(&mut self) {
        *self = DocValue::Object(DocMap::new());
    }
}

// Structural equality, type-then-value. Float comparison is epsilon-based so
// values that survived a round trip through formatting still compare equal.
impl PartialEq for DocValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DocValue::Null, DocValue::Null) => true,
            (DocValue::Bool(a), DocValue::Bool(b)) => a == b,
            (DocValue::Int(a), DocValue::Int(b)) => a == b,
            (DocValue::Float(a), DocValue::Float(b)) => a == b || (a - b).abs() <= f64::EPSILON,
            (DocValue::String(a), DocValue::String(b)) => a == b,
            (DocValue::Array(a), DocValue::Array(b)) => a == b,
            (DocValue::Object(a), DocValue::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for DocValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::printer::to_string(self))
    }
}

impl From<bool> for DocValue {
    fn from(value: bool) -> Self {
        DocValue::Bool(value)
    }
}

impl From<i8> for DocValue {
    fn from(value: i8) -> Self {
        DocValue::Int(value as i64)
    }
}

impl From<i16> for DocValue {
    fn from(value: i16) -> Self {
        DocValue::Int(value as i64)
    }
}

impl From<i32> for DocValue {
    fn from(value: i32) -> Self {
        DocValue::Int(value as i64)
    }
}

impl From<i64> for DocValue {
    fn from(value: i64) -> Self {
        DocValue::Int(value)
    }
}

impl From<u8> for DocValue {
    fn from(value: u8) -> Self {
        DocValue::Int(value as i64)
    }
}

impl From<u16> for DocValue {
    fn from(value: u16) -> Self {
        DocValue::Int(value as i64)
    }
}

impl From<u32> for DocValue {
    fn from(value: u32) -> Self {
        DocValue::Int(value as i64)
    }
}

impl From<f32> for DocValue {
    fn from(value: f32) -> Self {
        DocValue::Float(value as f64)
    }
}

impl From<f64> for DocValue {
    fn from(value: f64) -> Self {
        DocValue::Float(value)
    }
}

impl From<String> for DocValue {
    fn from(value: String) -> Self {
        DocValue::String(value)
    }
}

impl From<&str> for DocValue {
    fn from(value: &str) -> Self {
        DocValue::String(value.to_string())
    }
}

impl From<Vec<DocValue>> for DocValue {
    fn from(value: Vec<DocValue>) -> Self {
        DocValue::Array(value)
    }
}

impl From<DocMap> for DocValue {
    fn from(value: DocMap) -> Self {
        DocValue::Object(value)
    }
}

impl Serialize for DocValue {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            DocValue::Null => serializer.serialize_unit(),
            DocValue::Bool(b) => serializer.serialize_bool(*b),
            DocValue::Int(i) => serializer.serialize_i64(*i),
            DocValue::Float(f) => serializer.serialize_f64(*f),
            DocValue::String(s) => serializer.serialize_str(s),
            DocValue::Array(arr) => {
                use serde::ser::SerializeSeq;
                let mut seq = serializer.serialize_seq(Some(arr.len()))?;
                for element in arr {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            DocValue::Object(obj) => {
                use serde::ser::SerializeMap;
                let mut map = serializer.serialize_map(Some(obj.len()))?;
                for (k, v) in obj.iter() {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for DocValue {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct DocValueVisitor;

        impl<'de> Visitor<'de> for DocValueVisitor {
            type Value = DocValue;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any valid document value")
            }

            fn visit_bool<E>(self, value: bool) -> std::result::Result<Self::Value, E> {
                Ok(DocValue::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> std::result::Result<Self::Value, E> {
                Ok(DocValue::Int(value))
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<Self::Value, E> {
                if value <= i64::MAX as u64 {
                    Ok(DocValue::Int(value as i64))
                } else {
                    Ok(DocValue::Float(value as f64))
                }
            }

            fn visit_f64<E>(self, value: f64) -> std::result::Result<Self::Value, E> {
                Ok(DocValue::Float(value))
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Self::Value, E> {
                Ok(DocValue::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> std::result::Result<Self::Value, E> {
                Ok(DocValue::String(value))
            }

            fn visit_unit<E>(self) -> std::result::Result<Self::Value, E> {
                Ok(DocValue::Null)
            }

            fn visit_none<E>(self) -> std::result::Result<Self::Value, E> {
                Ok(DocValue::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> std::result::Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut vec = Vec::new();
                while let Some(elem) = seq.next_element()? {
                    vec.push(elem);
                }
                Ok(DocValue::Array(vec))
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut values = DocMap::new();
                while let Some((key, value)) = map.next_entry()? {
                    values.insert(key, value);
                }
                Ok(DocValue::Object(values))
            }
        }

        deserializer.deserialize_any(DocValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_query() {
        assert_eq!(DocValue::Null.kind(), DocKind::Null);
        assert_eq!(DocValue::from(7).kind(), DocKind::Int);
        assert_eq!(DocValue::from(7.0).kind(), DocKind::Float);
        assert_eq!(DocValue::from("x").kind(), DocKind::String);
        assert_eq!(DocValue::new_array().kind(), DocKind::Array);
        assert_eq!(DocValue::new_object().kind(), DocKind::Object);
        assert_eq!(DocKind::Float.name(), "double");
    }

    #[test]
    fn test_int_and_float_are_distinct_kinds() {
        assert_ne!(DocValue::Int(7), DocValue::Float(7.0));
        assert_eq!(DocValue::Int(7), DocValue::Int(7));
        assert_eq!(DocValue::Float(7.0), DocValue::Float(7.0));
    }

    #[test]
    fn test_float_epsilon_equality() {
        let third = DocValue::Float(0.1 + 0.2);
        assert_eq!(third, DocValue::Float(0.3));
        assert_eq!(
            DocValue::Float(f64::INFINITY),
            DocValue::Float(f64::INFINITY)
        );
        assert_ne!(DocValue::Float(1.0), DocValue::Float(1.5));
    }

    #[test]
    fn test_narrowing_accessors() {
        let value = DocValue::from(42);
        assert_eq!(value.as_i64(), Some(42));
        assert_eq!(value.as_f64(), None);
        assert_eq!(value.try_i64().unwrap(), 42);

        let err = value.try_str().unwrap_err();
        assert_eq!(
            err.to_string(),
            "wrong document kind: expected string, found int64"
        );
    }

    #[test]
    fn test_count_weak_contract() {
        assert_eq!(DocValue::from(vec![DocValue::Null, DocValue::Null]).count(), 2);
        let mut obj = DocMap::new();
        obj.insert("a".to_string(), DocValue::Null);
        assert_eq!(DocValue::from(obj).count(), 1);
        assert_eq!(DocValue::Null.count(), -1);
        assert_eq!(DocValue::from("text").count(), -1);
    }

    #[test]
    fn test_sentinel_access_never_panics() {
        let arr = DocValue::from(vec![DocValue::from(1)]);
        assert_eq!(arr.element(0).as_i64(), Some(1));
        assert!(arr.element(99).is_null());
        assert!(arr.member("nope").is_null());

        let mut obj = DocMap::new();
        obj.insert("k".to_string(), DocValue::from(true));
        let obj = DocValue::from(obj);
        assert_eq!(obj.member("k").as_bool(), Some(true));
        assert!(obj.member("absent").is_null());
        assert!(obj.has_key("k"));
        assert!(!obj.has_key("absent"));
        assert!(obj.get_array_element(0).is_none());
    }

    #[test]
    fn test_become_object_discards_payload() {
        let mut value = DocValue::from(3.25);
        value.become_object();
        assert!(value.is_object());
        assert_eq!(value.count(), 0);
    }

    #[test]
    fn test_set_member() {
        let mut value = DocValue::new_object();
        value.set_member("k", DocValue::from(1)).unwrap();
        value.set_member("k", DocValue::from(2)).unwrap();
        assert_eq!(value.member("k").as_i64(), Some(2));

        assert!(DocValue::Null.clone().set_member("k", DocValue::Null).is_err());
    }

    #[test]
    fn test_serde_roundtrip_through_json() {
        let value = crate::doc!({
            "id": 9,
            "ratio": 0.5,
            "tags": ["a", "b"],
            "nested": { "ok": true, "none": null }
        });

        let json = serde_json::to_string(&value).unwrap();
        let back: DocValue = serde_json::from_str(&json).unwrap();
        assert_eq!(value, back);
    }
}
