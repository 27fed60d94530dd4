//! The serialization orchestrator.
//!
//! [`GraphSerializer`] drives the multi-stage pipeline in both directions:
//!
//! ```text
//! serialize:    cycles → inheritance → versioning → converter
//! deserialize:  legacy rewrite → $ref → $version → $type → construct →
//!               register $id → unwrap $content → populate
//! ```
//!
//! Each stage can short-circuit: an already-visited instance serializes as a
//! bare `{"$ref": id}`, a `$ref` marker deserializes straight out of the
//! tracker. Object processors wrap every object — before-hooks in
//! registration order, after-hooks in reverse.
//!
//! One serializer instance is **not** safe for concurrent use: the reference
//! scope, the converter cache and the note buffer are mutated in place across
//! a traversal. Construct one per thread, or [`GraphSerializer::fork`] an
//! existing one to get an independent worker with the same policy and
//! converters but fresh traversal state. Recursion depth is bounded only by
//! the call stack.
//!
//! ## Examples
//!
//! ```rust
//! use graphdoc::{
//!     printer, Config, DocValue, GraphSerializer, Instance, StructConverter, TypeRegistry,
//! };
//! use std::any::TypeId;
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct Point { x: i64, y: i64 }
//!
//! let mut ser = GraphSerializer::new(Config::new(), TypeRegistry::new());
//! ser.add_converter_for::<Point>(Arc::new(
//!     StructConverter::new(Point::default)
//!         .field("x", |p: &Point| DocValue::from(p.x), |p, v| Ok(p.x = v.try_i64()?))
//!         .field("y", |p: &Point| DocValue::from(p.y), |p, v| Ok(p.y = v.try_i64()?)),
//! ));
//!
//! let point = Instance::new(Point { x: 1, y: 2 });
//! let doc = ser.serialize(TypeId::of::<Point>(), &point).assert_clean();
//! assert_eq!(printer::to_string(&doc), r#"{"x":1,"y":2}"#);
//!
//! let back = ser.deserialize(&doc, TypeId::of::<Point>()).assert_clean();
//! assert_eq!(back.with(|p: &Point| p.y), Some(2));
//! ```

use crate::convert::Converter;
use crate::processor::ObjectProcessor;
use crate::registry::{self, TypeRegistry};
use crate::tracker::{DefinitionWriter, ReferenceTracker};
use crate::{legacy, meta, Config, DocValue, Error, Instance, Outcome, Result, TypeTagMode};
use std::any::TypeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

/// Orchestrates object-graph ⇄ document conversion.
pub struct GraphSerializer {
    config: Config,
    registry: Arc<TypeRegistry>,
    direct: HashMap<TypeId, Arc<dyn Converter>>,
    general: Vec<Arc<dyn Converter>>,
    processors: Vec<Arc<dyn ObjectProcessor>>,
    cache: RefCell<HashMap<TypeId, Arc<dyn Converter>>>,
    tracker: RefCell<ReferenceTracker>,
    definitions: RefCell<DefinitionWriter>,
    notes: RefCell<Vec<String>>,
}

impl GraphSerializer {
    /// Creates a serializer with an explicit policy and type table.
    #[must_use]
    pub fn new(config: Config, registry: TypeRegistry) -> Self {
        GraphSerializer {
            config,
            registry: Arc::new(registry),
            direct: HashMap::new(),
            general: Vec::new(),
            processors: Vec::new(),
            cache: RefCell::new(HashMap::new()),
            tracker: RefCell::new(ReferenceTracker::new()),
            definitions: RefCell::new(DefinitionWriter::new()),
            notes: RefCell::new(Vec::new()),
        }
    }

    /// Clones policy, registry, converters and processors into an independent
    /// serializer with empty caches and no traversal state — the way to get a
    /// per-thread worker.
    #[must_use]
    pub fn fork(&self) -> Self {
        GraphSerializer {
            config: self.config.clone(),
            registry: Arc::clone(&self.registry),
            direct: self.direct.clone(),
            general: self.general.clone(),
            processors: self.processors.clone(),
            cache: RefCell::new(HashMap::new()),
            tracker: RefCell::new(ReferenceTracker::new()),
            definitions: RefCell::new(DefinitionWriter::new()),
            notes: RefCell::new(Vec::new()),
        }
    }

    /// The policy this serializer was constructed with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The type table this serializer was constructed with.
    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Registers a converter for exactly `T`. Invalidates the resolution
    /// cache.
    pub fn add_converter_for<T: ?Sized + 'static>(&mut self, converter: Arc<dyn Converter>) {
        self.direct.insert(TypeId::of::<T>(), converter);
        self.cache.get_mut().clear();
    }

    /// Appends a general converter; the ordered list is scanned first-match
    /// after the direct map misses. Invalidates the resolution cache.
    pub fn add_converter(&mut self, converter: Arc<dyn Converter>) {
        self.general.push(converter);
        self.cache.get_mut().clear();
    }

    /// Appends a lifecycle processor.
    pub fn add_processor(&mut self, processor: Arc<dyn ObjectProcessor>) {
        self.processors.push(processor);
    }

    /// Records a diagnostic note on the current traversal's outcome.
    pub fn note(&self, note: impl Into<String>) {
        self.notes.borrow_mut().push(note.into());
    }

    /// Resolves the converter for `ty`: registry override, then the direct
    /// map, then first match over the general list. Cached per type.
    pub fn converter_for(&self, ty: TypeId) -> Result<Arc<dyn Converter>> {
        if let Some(converter) = self.cache.borrow().get(&ty) {
            return Ok(converter.clone());
        }
        let resolved = self
            .registry
            .info(ty)
            .and_then(|info| info.converter_override.clone())
            .or_else(|| self.direct.get(&ty).cloned())
            .or_else(|| self.general.iter().find(|c| c.can_convert(ty)).cloned());
        match resolved {
            Some(converter) => {
                self.cache.borrow_mut().insert(ty, converter.clone());
                Ok(converter)
            }
            None => Err(Error::ConverterNotFound(self.type_label(ty))),
        }
    }

    /// Serializes an instance declared as `declared` into a document value.
    ///
    /// This is the top-level entry point; it packages the accumulated
    /// diagnostic notes into the [`Outcome`]. Converters recursing into
    /// nested objects call [`GraphSerializer::serialize_instance`] or
    /// [`GraphSerializer::serialize_handle`] instead.
    pub fn serialize(&self, declared: TypeId, instance: &Instance) -> Outcome<DocValue> {
        let top_level = self.tracker.borrow().depth() == 0;
        if top_level {
            self.notes.borrow_mut().clear();
        }
        let result = self.serialize_instance(declared, instance);
        let notes = if top_level { self.take_notes() } else { Vec::new() };
        Outcome::new(result, notes)
    }

    /// Serializes one instance; the recursion point converters call for
    /// nested objects.
    pub fn serialize_instance(&self, declared: TypeId, instance: &Instance) -> Result<DocValue> {
        if instance.is_null() {
            return Ok(DocValue::Null);
        }
        let runtime = instance.type_id().unwrap_or(declared);
        let processors = self.processors_for(runtime);
        for processor in &processors {
            if let Err(err) = processor.before_serialize(runtime, instance) {
                self.note(format!(
                    "{} before-serialize hook failed: {err}",
                    processor.name()
                ));
            }
        }

        let mut result = self.serialize_cycles(declared, runtime, instance);

        if let Ok(value) = result.as_mut() {
            for processor in processors.iter().rev() {
                if let Err(err) = processor.after_serialize(runtime, instance, value) {
                    self.note(format!(
                        "{} after-serialize hook failed: {err}",
                        processor.name()
                    ));
                }
            }
        }
        result
    }

    /// Typed shorthand: serialize a shared handle under its own type.
    pub fn serialize_handle<T: 'static>(&self, handle: &Rc<RefCell<T>>) -> Result<DocValue> {
        self.serialize_instance(TypeId::of::<T>(), &Instance::from_handle(handle.clone()))
    }

    // Stage 1: reference scope, cycle detection, definition bookkeeping.
    fn serialize_cycles(
        &self,
        declared: TypeId,
        runtime: TypeId,
        instance: &Instance,
    ) -> Result<DocValue> {
        self.tracker.borrow_mut().enter_scope();
        let mut result = self.serialize_cycles_inner(declared, runtime, instance);
        let closed = self.tracker.borrow_mut().exit_scope();
        if closed {
            {
                let definitions = self.definitions.borrow();
                if let Ok(value) = result.as_mut() {
                    if definitions.has_unreferenced() {
                        definitions.sweep(value);
                    }
                }
            }
            self.definitions.borrow_mut().clear();
            self.tracker.borrow_mut().clear();
        }
        result
    }

    fn serialize_cycles_inner(
        &self,
        declared: TypeId,
        runtime: TypeId,
        instance: &Instance,
    ) -> Result<DocValue> {
        let converter = self.converter_for(runtime)?;
        if !converter.wants_cycle_support(runtime) {
            return self.serialize_inheritance(declared, runtime, instance, &converter);
        }

        let address = instance
            .address()
            .ok_or_else(|| Error::custom("cannot track a null instance"))?;
        // mark before recursing so self-referential graphs terminate
        let (id, seen) = self.tracker.borrow_mut().mark(address);
        if seen {
            self.definitions.borrow_mut().record_reference(id);
            return Ok(meta::make_reference(id));
        }

        let mut value = self.serialize_inheritance(declared, runtime, instance, &converter)?;
        self.definitions.borrow_mut().record_definition(id, &mut value);
        Ok(value)
    }

    // Stage 2: $type tagging.
    fn serialize_inheritance(
        &self,
        declared: TypeId,
        runtime: TypeId,
        instance: &Instance,
        converter: &Arc<dyn Converter>,
    ) -> Result<DocValue> {
        let mut value = self.serialize_version(runtime, instance, converter)?;

        let tag_needed = match self.config.type_tag_mode {
            TypeTagMode::Never => false,
            TypeTagMode::Always => true,
            TypeTagMode::WhenNeeded => declared != runtime && self.declared_wants_tag(declared),
        };
        if tag_needed {
            match self.registry.tag_name(runtime) {
                Some(name) => {
                    let name = name.to_string();
                    meta::ensure_object(&mut value);
                    if let Ok(map) = value.try_object_mut() {
                        map.insert(meta::KEY_TYPE.to_string(), DocValue::String(name));
                    }
                }
                None => self.note(format!(
                    "type tag skipped: runtime type {} is not registered",
                    self.type_label(runtime)
                )),
            }
        }
        Ok(value)
    }

    // Stage 3: $version tagging.
    fn serialize_version(
        &self,
        runtime: TypeId,
        instance: &Instance,
        converter: &Arc<dyn Converter>,
    ) -> Result<DocValue> {
        // stage 4: the converter is the only stage touching object internals
        let mut value = converter.to_document(self, instance, runtime)?;

        if let Some(info) = self.registry.info(runtime) {
            if let Some(version) = &info.version {
                let tag = version.version.clone();
                meta::ensure_object(&mut value);
                if let Ok(map) = value.try_object_mut() {
                    map.insert(meta::KEY_VERSION.to_string(), DocValue::String(tag));
                }
            }
        }
        Ok(value)
    }

    /// Deserializes a document value as the declared type.
    ///
    /// This is the top-level entry point; it packages the accumulated
    /// diagnostic notes into the [`Outcome`]. Converters recursing into
    /// nested values call [`GraphSerializer::deserialize_instance`] or
    /// [`GraphSerializer::deserialize_handle`] instead.
    pub fn deserialize(&self, data: &DocValue, declared: TypeId) -> Outcome<Instance> {
        self.deserialize_entry(data, declared, None)
    }

    /// Deserializes into a caller-supplied instance instead of constructing
    /// one.
    pub fn deserialize_into(
        &self,
        data: &DocValue,
        declared: TypeId,
        existing: Instance,
    ) -> Outcome<Instance> {
        self.deserialize_entry(data, declared, Some(existing))
    }

    fn deserialize_entry(
        &self,
        data: &DocValue,
        declared: TypeId,
        existing: Option<Instance>,
    ) -> Outcome<Instance> {
        let top_level = self.tracker.borrow().depth() == 0;
        if top_level {
            self.notes.borrow_mut().clear();
        }
        let result = self.deserialize_instance(data, declared, existing);
        let notes = if top_level { self.take_notes() } else { Vec::new() };
        Outcome::new(result, notes)
    }

    /// Deserializes one value; the recursion point converters call for
    /// nested values.
    pub fn deserialize_instance(
        &self,
        data: &DocValue,
        declared: TypeId,
        existing: Option<Instance>,
    ) -> Result<Instance> {
        self.tracker.borrow_mut().enter_scope();
        let result = self.deserialize_inner(data, declared, existing);
        if self.tracker.borrow_mut().exit_scope() {
            self.tracker.borrow_mut().clear();
            self.definitions.borrow_mut().clear();
        }
        result
    }

    /// Typed shorthand: deserialize a value declared as `T` and extract the
    /// typed handle. Fails when inheritance resolved a different runtime
    /// type; polymorphic fields keep the [`Instance`] from
    /// [`GraphSerializer::deserialize_instance`] instead.
    pub fn deserialize_handle<T: 'static>(&self, data: &DocValue) -> Result<Rc<RefCell<T>>> {
        let instance = self.deserialize_instance(data, TypeId::of::<T>(), None)?;
        instance.handle::<T>().ok_or_else(|| {
            Error::custom(format!(
                "deserialized instance is not a {}",
                std::any::type_name::<T>()
            ))
        })
    }

    fn deserialize_inner(
        &self,
        data: &DocValue,
        declared: TypeId,
        existing: Option<Instance>,
    ) -> Result<Instance> {
        // historical metadata shapes are rewritten before anything else
        let upgraded = legacy::modernize(data);
        let data = upgraded.as_ref().unwrap_or(data);

        if data.is_null() {
            return Ok(Instance::null());
        }

        let fold = self.config.fold_keys();
        let processors = self.processors_for(declared);
        for processor in &processors {
            if let Err(err) = processor.before_deserialize(declared, data) {
                self.note(format!(
                    "{} before-deserialize hook failed: {err}",
                    processor.name()
                ));
            }
        }

        // reference markers resolve immediately; object identity must be
        // settled before anything else can be trusted
        if let DocValue::Object(map) = data {
            if let Some(marker) = map.get_fold(meta::KEY_REF, fold) {
                let id = meta::parse_id(marker)
                    .ok_or_else(|| Error::custom(format!("malformed $ref id: {marker}")))?;
                return self
                    .tracker
                    .borrow()
                    .resolve(id)
                    .ok_or(Error::UnresolvedReference(id));
            }
        }

        // version check and migration
        if let DocValue::Object(map) = data {
            if let Some(marker) = map.get_fold(meta::KEY_VERSION, fold) {
                match marker.as_str() {
                    Some(stored) => {
                        let current = self
                            .registry
                            .info(declared)
                            .and_then(|info| info.version.as_ref())
                            .map(|v| v.version.as_str());
                        if current != Some(stored) {
                            match self.registry.version_path(stored, declared) {
                                Some(path) if path.len() > 1 => {
                                    return self.migrate_through(data, &path);
                                }
                                _ => self.note(format!(
                                    "no migration path from stored version {stored:?}; \
                                     deserializing as the declared type"
                                )),
                            }
                        }
                    }
                    None => self.note("malformed $version value; expected a string".to_string()),
                }
            }
        }

        // inheritance: accept the embedded type only when assignable
        let mut resolved = declared;
        if let DocValue::Object(map) = data {
            if let Some(marker) = map.get_fold(meta::KEY_TYPE, fold) {
                match marker.as_str() {
                    Some(name) => {
                        let clean = registry::strip_assembly_qualifier(name);
                        match self.registry.resolve_name(clean) {
                            Some(ty) => {
                                if self.registry.is_assignable(ty, declared) {
                                    resolved = ty;
                                } else {
                                    self.note(format!(
                                        "type {clean:?} is not assignable to the declared type \
                                         {}; keeping the declared type",
                                        self.type_label(declared)
                                    ));
                                }
                            }
                            None => self.note(format!(
                                "unresolvable type name {clean:?}; keeping the declared type"
                            )),
                        }
                    }
                    None => self.note("malformed $type value; expected a string".to_string()),
                }
            }
        }

        let converter = self.converter_for(resolved)?;
        let instance = match existing {
            Some(existing) => existing,
            None => match converter.create_instance(data, resolved) {
                Ok(instance) => instance,
                Err(err) => {
                    // containment boundary: one bad sub-object must not fail
                    // the whole document
                    self.note(format!(
                        "instance construction failed for {}: {err}; substituting null",
                        self.type_label(resolved)
                    ));
                    Instance::null()
                }
            },
        };

        for processor in &processors {
            if let Err(err) = processor.before_populate(resolved, &instance, data) {
                self.note(format!(
                    "{} before-populate hook failed: {err}",
                    processor.name()
                ));
            }
        }

        // register under $id before population so references encountered
        // while this very instance's fields are being filled resolve to it
        if let DocValue::Object(map) = data {
            if let Some(marker) = map.get_fold(meta::KEY_ID, fold) {
                match meta::parse_id(marker) {
                    Some(id) => self
                        .tracker
                        .borrow_mut()
                        .register_instance(id, instance.clone()),
                    None => self.note(format!(
                        "malformed $id value {marker}; definition not registered"
                    )),
                }
            }
        }

        if instance.is_null() {
            self.note(format!(
                "skipping population of null instance for {}",
                self.type_label(resolved)
            ));
        } else {
            let content = meta::unwrap_content(data, fold);
            converter.populate(self, content, &instance, resolved)?;
        }

        for processor in processors.iter().rev() {
            if let Err(err) = processor.after_deserialize(resolved, &instance) {
                self.note(format!(
                    "{} after-deserialize hook failed: {err}",
                    processor.name()
                ));
            }
        }
        Ok(instance)
    }

    /// Deserializes as the oldest type on the path, then applies each step's
    /// transform strictly left to right.
    fn migrate_through(&self, data: &DocValue, path: &[TypeId]) -> Result<Instance> {
        let mut instance = self.deserialize_inner(data, path[0], None)?;
        for pair in path.windows(2) {
            let (previous, step) = (pair[0], pair[1]);
            let info = self
                .registry
                .info(step)
                .ok_or_else(|| Error::custom("migration step type is not registered"))?;
            let from = self
                .registry
                .info(previous)
                .and_then(|i| i.version.as_ref())
                .map(|v| v.version.clone())
                .unwrap_or_default();
            let migrate = info
                .version
                .as_ref()
                .and_then(|v| v.migrate.clone())
                .ok_or_else(|| Error::MissingMigration {
                    ty: info.name.clone(),
                    from,
                })?;
            instance = migrate(&instance)?;
        }
        Ok(instance)
    }

    fn declared_wants_tag(&self, declared: TypeId) -> bool {
        self.converter_for(declared)
            .map(|c| c.wants_inheritance_support(declared))
            .unwrap_or(true)
    }

    fn processors_for(&self, ty: TypeId) -> Vec<Arc<dyn ObjectProcessor>> {
        if let Some(forced) = self
            .registry
            .info(ty)
            .and_then(|info| info.processor_override.clone())
        {
            return vec![forced];
        }
        self.processors
            .iter()
            .filter(|p| p.can_process(ty))
            .cloned()
            .collect()
    }

    fn type_label(&self, ty: TypeId) -> String {
        match self.registry.info(ty) {
            Some(info) => info.name.clone(),
            None => format!("{ty:?}"),
        }
    }

    fn take_notes(&self) -> Vec<String> {
        std::mem::take(&mut *self.notes.borrow_mut())
    }
}
