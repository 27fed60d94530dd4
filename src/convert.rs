//! The converter contract and the registered converter builders.
//!
//! A [`Converter`] is the only part of the pipeline that touches object
//! internals. Given a runtime type it answers two policy questions — does the
//! type need cycle support, does the declared type need inheritance-tag
//! support — and implements three operations: extract an instance into a
//! document value, create an instance (not necessarily populated) for a
//! document value, and populate an instance's contents from one.
//!
//! Converters are selected per type: a registry-level override first, then
//! the exact-type direct map, then a first-match scan over the ordered
//! general list; the result is cached until a converter is added.
//!
//! Since this crate has no reflection, two builders cover the common cases
//! with explicit registration:
//!
//! - [`StructConverter`] — per-field closures over a concrete `T`; fields
//!   holding nested objects recurse through the serializer, which is what
//!   routes them through cycle/inheritance/version handling.
//! - [`LeafConverter`] — an encode/decode pair for atomic types.
//!
//! ## Examples
//!
//! ```rust
//! use graphdoc::{DocValue, StructConverter};
//!
//! #[derive(Default)]
//! struct Point { x: i64, y: i64 }
//!
//! let converter = StructConverter::new(Point::default)
//!     .field(
//!         "x",
//!         |p: &Point| DocValue::from(p.x),
//!         |p, v| Ok(p.x = v.try_i64()?),
//!     )
//!     .field(
//!         "y",
//!         |p: &Point| DocValue::from(p.y),
//!         |p, v| Ok(p.y = v.try_i64()?),
//!     );
//! # let _ = converter;
//! ```

use crate::serializer::GraphSerializer;
use crate::{DocMap, DocValue, Error, Instance, Result};
use std::any::TypeId;

/// Per-type serialization strategy consumed by the orchestrator.
pub trait Converter {
    /// Returns `true` when this converter handles `ty`. Consulted during the
    /// general-converter scan; direct-registered converters are looked up by
    /// exact type instead.
    fn can_convert(&self, ty: TypeId) -> bool;

    /// Does `ty` participate in reference tracking? Types that answer `false`
    /// skip the cycle stage entirely and can never be shared in a document.
    fn wants_cycle_support(&self, ty: TypeId) -> bool {
        let _ = ty;
        false
    }

    /// Should a field declared as `ty` carry `$type` tags when the runtime
    /// type differs? Atomic types answer `false`.
    fn wants_inheritance_support(&self, ty: TypeId) -> bool {
        let _ = ty;
        true
    }

    /// Extracts `instance` into a document fragment. The only stage that
    /// reads object internals; nested objects recurse via `ser`.
    fn to_document(
        &self,
        ser: &GraphSerializer,
        instance: &Instance,
        ty: TypeId,
    ) -> Result<DocValue>;

    /// Creates an instance for `data` without necessarily populating it. The
    /// pipeline registers the instance under any `$id` before population so
    /// cycles resolve to it.
    fn create_instance(&self, data: &DocValue, ty: TypeId) -> Result<Instance>;

    /// Populates `instance` from `data` (already unwrapped of `$content`).
    fn populate(
        &self,
        ser: &GraphSerializer,
        data: &DocValue,
        instance: &Instance,
        ty: TypeId,
    ) -> Result<()>;
}

type ReadFn<T> = Box<dyn Fn(&T, &GraphSerializer) -> Result<DocValue>>;
type WriteFn<T> = Box<dyn Fn(&mut T, &DocValue, &GraphSerializer) -> Result<()>>;

struct FieldSpec<T> {
    name: &'static str,
    read: ReadFn<T>,
    write: WriteFn<T>,
}

/// Field-registered converter for a concrete struct type.
pub struct StructConverter<T: 'static> {
    make: Box<dyn Fn() -> T>,
    fields: Vec<FieldSpec<T>>,
    cycles: bool,
    inheritance: bool,
}

impl<T: 'static> StructConverter<T> {
    /// Starts a converter whose instances are created by `make`.
    #[must_use]
    pub fn new(make: impl Fn() -> T + 'static) -> Self {
        StructConverter {
            make: Box::new(make),
            fields: Vec::new(),
            cycles: false,
            inheritance: true,
        }
    }

    /// Opts the type into reference tracking. Required for any type that can
    /// appear more than once in a graph or participate in a cycle.
    #[must_use]
    pub fn with_cycles(mut self) -> Self {
        self.cycles = true;
        self
    }

    /// Opts the type out of `$type` tagging when used as a declared type.
    #[must_use]
    pub fn without_inheritance(mut self) -> Self {
        self.inheritance = false;
        self
    }

    /// Registers a plain field: the accessors see only the value.
    #[must_use]
    pub fn field(
        self,
        name: &'static str,
        get: impl Fn(&T) -> DocValue + 'static,
        set: impl Fn(&mut T, &DocValue) -> Result<()> + 'static,
    ) -> Self {
        self.field_with(
            name,
            move |value, _| Ok(get(value)),
            move |value, data, _| set(value, data),
        )
    }

    /// Registers a field whose accessors recurse through the serializer —
    /// how nested object handles are wired up.
    #[must_use]
    pub fn field_with(
        mut self,
        name: &'static str,
        read: impl Fn(&T, &GraphSerializer) -> Result<DocValue> + 'static,
        write: impl Fn(&mut T, &DocValue, &GraphSerializer) -> Result<()> + 'static,
    ) -> Self {
        self.fields.push(FieldSpec {
            name,
            read: Box::new(read),
            write: Box::new(write),
        });
        self
    }

    fn typed_handle(&self, instance: &Instance) -> Result<std::rc::Rc<std::cell::RefCell<T>>> {
        instance.handle::<T>().ok_or_else(|| {
            Error::custom(format!(
                "converter for {} received an instance of another type",
                std::any::type_name::<T>()
            ))
        })
    }
}

impl<T: 'static> Converter for StructConverter<T> {
    fn can_convert(&self, ty: TypeId) -> bool {
        ty == TypeId::of::<T>()
    }

    fn wants_cycle_support(&self, _ty: TypeId) -> bool {
        self.cycles
    }

    fn wants_inheritance_support(&self, _ty: TypeId) -> bool {
        self.inheritance
    }

    fn to_document(
        &self,
        ser: &GraphSerializer,
        instance: &Instance,
        _ty: TypeId,
    ) -> Result<DocValue> {
        let handle = self.typed_handle(instance)?;
        let guard = handle.borrow();
        let mut map = DocMap::with_capacity(self.fields.len());
        for field in &self.fields {
            if ser.config().member_allowed(field.name) == Some(false) {
                continue;
            }
            map.insert(field.name.to_string(), (field.read)(&guard, ser)?);
        }
        Ok(DocValue::Object(map))
    }

    fn create_instance(&self, _data: &DocValue, _ty: TypeId) -> Result<Instance> {
        Ok(Instance::new((self.make)()))
    }

    fn populate(
        &self,
        ser: &GraphSerializer,
        data: &DocValue,
        instance: &Instance,
        _ty: TypeId,
    ) -> Result<()> {
        let object = data.try_object()?;
        let fold = ser.config().fold_keys();
        let handle = self.typed_handle(instance)?;
        let mut guard = handle.borrow_mut();
        for field in &self.fields {
            if ser.config().member_allowed(field.name) == Some(false) {
                continue;
            }
            if let Some(value) = object.get_fold(field.name, fold) {
                (field.write)(&mut guard, value, ser)?;
            }
        }
        Ok(())
    }
}

/// Encode/decode converter for atomic types: no cycle participation, no
/// inheritance tagging.
pub struct LeafConverter<T: 'static> {
    make: Box<dyn Fn() -> T>,
    encode: Box<dyn Fn(&T) -> DocValue>,
    decode: Box<dyn Fn(&DocValue) -> Result<T>>,
}

impl<T: 'static> LeafConverter<T> {
    #[must_use]
    pub fn new(
        make: impl Fn() -> T + 'static,
        encode: impl Fn(&T) -> DocValue + 'static,
        decode: impl Fn(&DocValue) -> Result<T> + 'static,
    ) -> Self {
        LeafConverter {
            make: Box::new(make),
            encode: Box::new(encode),
            decode: Box::new(decode),
        }
    }
}

impl<T: 'static> Converter for LeafConverter<T> {
    fn can_convert(&self, ty: TypeId) -> bool {
        ty == TypeId::of::<T>()
    }

    fn wants_inheritance_support(&self, _ty: TypeId) -> bool {
        false
    }

    fn to_document(
        &self,
        _ser: &GraphSerializer,
        instance: &Instance,
        _ty: TypeId,
    ) -> Result<DocValue> {
        instance.with(|value: &T| (self.encode)(value)).ok_or_else(|| {
            Error::custom(format!(
                "leaf converter for {} received an instance of another type",
                std::any::type_name::<T>()
            ))
        })
    }

    fn create_instance(&self, _data: &DocValue, _ty: TypeId) -> Result<Instance> {
        Ok(Instance::new((self.make)()))
    }

    fn populate(
        &self,
        _ser: &GraphSerializer,
        data: &DocValue,
        instance: &Instance,
        _ty: TypeId,
    ) -> Result<()> {
        let decoded = (self.decode)(data)?;
        instance
            .with_mut(|value: &mut T| *value = decoded)
            .map(|_| ())
            .ok_or_else(|| Error::custom("leaf converter cannot populate a null instance"))
    }
}
