//! Ordered map type for document objects.
//!
//! [`DocMap`] wraps [`IndexMap`] so object entries keep their insertion order —
//! the printed form of an object is deterministic and mirrors the order in
//! which the pipeline (or a parser) produced its entries.
//!
//! Key comparison is case-sensitive by default. The serializer consults its
//! configuration and switches to the `*_fold` lookup variants when
//! case-insensitive key resolution is enabled; the map itself carries no mode
//! so equality stays purely structural.
//!
//! ## Examples
//!
//! ```rust
//! use graphdoc::{DocMap, DocValue};
//!
//! let mut map = DocMap::new();
//! map.insert("name".to_string(), DocValue::from("Alice"));
//! map.insert("age".to_string(), DocValue::from(30));
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get("name").and_then(|v| v.as_str()), Some("Alice"));
//! assert!(map.get("NAME").is_none());
//! assert!(map.get_fold("NAME", true).is_some());
//! ```

use crate::DocValue;
use indexmap::IndexMap;
use std::collections::HashMap;

/// An insertion-ordered map of string keys to document values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocMap(IndexMap<String, DocValue>);

impl DocMap {
    /// Creates an empty `DocMap`.
    #[must_use]
    pub fn new() -> Self {
        DocMap(IndexMap::new())
    }

    /// Creates an empty `DocMap` with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        DocMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair, returning the previous value for the key.
    pub fn insert(&mut self, key: String, value: DocValue) -> Option<DocValue> {
        self.0.insert(key, value)
    }

    /// Inserts with optional case folding: when `fold` is set and an existing
    /// key matches case-insensitively, that entry is overwritten in place
    /// (keeping its original spelling and position).
    pub fn insert_fold(&mut self, key: String, value: DocValue, fold: bool) -> Option<DocValue> {
        if fold {
            if let Some(existing) = self.position_fold(&key) {
                let slot = &mut self.0[existing];
                return Some(std::mem::replace(slot, value));
            }
        }
        self.0.insert(key, value)
    }

    /// Returns the value for `key`, comparing exactly.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&DocValue> {
        self.0.get(key)
    }

    /// Mutable access to the value for `key`, comparing exactly.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut DocValue> {
        self.0.get_mut(key)
    }

    /// Returns the value for `key`; when `fold` is set the comparison ignores
    /// ASCII case. Exact matches win over folded ones.
    #[must_use]
    pub fn get_fold(&self, key: &str, fold: bool) -> Option<&DocValue> {
        if let Some(value) = self.0.get(key) {
            return Some(value);
        }
        if fold {
            let index = self.position_fold(key)?;
            return Some(&self.0[index]);
        }
        None
    }

    /// Returns `true` if the map contains `key` (exact comparison).
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Case-folding variant of [`DocMap::contains_key`].
    #[must_use]
    pub fn contains_key_fold(&self, key: &str, fold: bool) -> bool {
        self.get_fold(key, fold).is_some()
    }

    /// Removes `key` and returns its value, preserving the order of the
    /// remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<DocValue> {
        self.0.shift_remove(key)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The single entry of a one-entry map, or `None` otherwise.
    #[must_use]
    pub fn sole_entry(&self) -> Option<(&str, &DocValue)> {
        if self.0.len() == 1 {
            self.0.iter().next().map(|(k, v)| (k.as_str(), v))
        } else {
            None
        }
    }

    /// Iterates over keys in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, DocValue> {
        self.0.keys()
    }

    /// Iterates over values in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, DocValue> {
        self.0.values()
    }

    /// Iterates over mutable values in insertion order.
    pub fn values_mut(&mut self) -> indexmap::map::ValuesMut<'_, String, DocValue> {
        self.0.values_mut()
    }

    /// Iterates over key-value pairs in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, DocValue> {
        self.0.iter()
    }

    /// Iterates over key-value pairs with mutable values, in insertion order.
    pub fn iter_mut(&mut self) -> indexmap::map::IterMut<'_, String, DocValue> {
        self.0.iter_mut()
    }

    fn position_fold(&self, key: &str) -> Option<usize> {
        self.0.keys().position(|k| k.eq_ignore_ascii_case(key))
    }
}

impl From<HashMap<String, DocValue>> for DocMap {
    fn from(map: HashMap<String, DocValue>) -> Self {
        DocMap(map.into_iter().collect())
    }
}

impl IntoIterator for DocMap {
    type Item = (String, DocValue);
    type IntoIter = indexmap::map::IntoIter<String, DocValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a DocMap {
    type Item = (&'a String, &'a DocValue);
    type IntoIter = indexmap::map::Iter<'a, String, DocValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, DocValue)> for DocMap {
    fn from_iter<T: IntoIterator<Item = (String, DocValue)>>(iter: T) -> Self {
        DocMap(IndexMap::from_iter(iter))
    }
}

impl Extend<(String, DocValue)> for DocMap {
    fn extend<T: IntoIterator<Item = (String, DocValue)>>(&mut self, iter: T) {
        self.0.extend(iter)
    }
}
