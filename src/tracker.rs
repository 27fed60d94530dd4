//! Per-traversal reference bookkeeping.
//!
//! Both types in this module are scoped strictly to one top-level
//! serialize/deserialize call: the orchestrator enters a scope per object,
//! and when the outermost scope closes everything here is cleared. Nothing
//! survives across calls.
//!
//! [`ReferenceTracker`] answers "have I visited this object already?" during
//! serialization (keyed on pointer identity) and "which instance does this id
//! name?" during deserialization.
//!
//! [`DefinitionWriter`] guarantees the emitted document carries exactly one
//! `$id` per instance that is actually referenced from somewhere else, and
//! none for instances referenced zero or one times. Definitions are written
//! as instances finish serializing and a single sweep at scope close removes
//! the markers nothing referenced; the sweep is skipped entirely when every
//! written id was referenced.

use crate::{meta, DocValue, Instance};
use std::collections::{HashMap, HashSet};

/// Visited-instance tracking for one traversal.
///
/// Identity is pointer identity of the shared object cell
/// ([`Instance::address`]); ids are small integers assigned in visit order.
#[derive(Debug, Default)]
pub struct ReferenceTracker {
    depth: usize,
    next_id: u32,
    seen: HashMap<usize, u32>,
    instances: HashMap<u32, Instance>,
}

impl ReferenceTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current scope depth; zero outside any traversal.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Enters a nested reference scope.
    pub fn enter_scope(&mut self) {
        self.depth += 1;
    }

    /// Exits the current scope. Returns `true` when this closed the outermost
    /// scope, meaning the caller must clear traversal state.
    pub fn exit_scope(&mut self) -> bool {
        debug_assert!(self.depth > 0, "exit_scope without matching enter_scope");
        self.depth = self.depth.saturating_sub(1);
        self.depth == 0
    }

    /// Marks an object as visited, assigning an id on first sight.
    ///
    /// Returns `(id, already_seen)`. Marking happens *before* recursing into
    /// the object's members so self-referential graphs terminate.
    pub fn mark(&mut self, address: usize) -> (u32, bool) {
        if let Some(&id) = self.seen.get(&address) {
            return (id, true);
        }
        let id = self.next_id;
        self.next_id += 1;
        self.seen.insert(address, id);
        (id, false)
    }

    /// Registers a (possibly still unpopulated) instance under `id` so later
    /// `$ref` markers in the same document resolve to this exact object.
    pub fn register_instance(&mut self, id: u32, instance: Instance) {
        self.instances.insert(id, instance);
    }

    /// Resolves an id recorded by [`ReferenceTracker::register_instance`].
    #[must_use]
    pub fn resolve(&self, id: u32) -> Option<Instance> {
        self.instances.get(&id).cloned()
    }

    /// Drops all traversal state. Called when the outermost scope closes.
    pub fn clear(&mut self) {
        self.next_id = 0;
        self.seen.clear();
        self.instances.clear();
    }
}

/// Emits `$id` definition markers only for instances something referenced.
#[derive(Debug, Default)]
pub struct DefinitionWriter {
    written: HashSet<u32>,
    referenced: HashSet<u32>,
}

impl DefinitionWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that the instance with `id` finished serializing as `value`,
    /// attaching the definition marker. Markers whose id is never referenced
    /// are removed again by [`DefinitionWriter::sweep`] before the document
    /// leaves the traversal.
    ///
    /// Non-object values are wrapped under `$content` first so the marker has
    /// an object to live on.
    pub fn record_definition(&mut self, id: u32, value: &mut DocValue) {
        meta::ensure_object(value);
        if let Ok(map) = value.try_object_mut() {
            map.insert(meta::KEY_ID.to_string(), meta::encode_id(id));
        }
        self.written.insert(id);
    }

    /// Records that some point in the graph emitted a `$ref` to `id`.
    pub fn record_reference(&mut self, id: u32) {
        self.referenced.insert(id);
    }

    /// Returns `true` when a definition was written that nothing referenced.
    #[must_use]
    pub fn has_unreferenced(&self) -> bool {
        self.written.difference(&self.referenced).next().is_some()
    }

    /// Removes every `$id` marker whose id was never referenced, unwrapping
    /// objects that only existed to carry the marker.
    pub fn sweep(&self, root: &mut DocValue) {
        match root {
            DocValue::Array(elements) => {
                for element in elements {
                    self.sweep(element);
                }
            }
            DocValue::Object(map) => {
                let stale = map
                    .get(meta::KEY_ID)
                    .and_then(meta::parse_id)
                    .is_some_and(|id| self.written.contains(&id) && !self.referenced.contains(&id));
                if stale {
                    map.remove(meta::KEY_ID);
                }
                for value in map.values_mut() {
                    self.sweep(value);
                }
                // a wrapper that only existed to carry the marker collapses
                if stale {
                    if let Some((key, _)) = map.sole_entry() {
                        if key == meta::KEY_CONTENT {
                            let inner = map.remove(meta::KEY_CONTENT).unwrap_or(DocValue::Null);
                            *root = inner;
                        }
                    }
                }
            }
            _ => {}
        }
    }

    /// Drops all pending state. Called when the outermost scope closes.
    pub fn clear(&mut self) {
        self.written.clear();
        self.referenced.clear();
    }
}
