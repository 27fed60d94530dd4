//! Statically registered type metadata.
//!
//! The engine never inspects Rust types ambiently; everything it knows about
//! a type is registered up front through [`TypeDesc`] and held in a
//! [`TypeRegistry`]:
//!
//! - the wire name carried by `$type` tags (and an optional tag override);
//! - base types, defining the assignability relation that bounds `$type`
//!   resolution;
//! - an optional converter or lifecycle-processor override, taking precedence
//!   over the serializer's converter lookup;
//! - an optional schema version: a version string, the ancestor types of
//!   earlier schemas, and the transform that migrates an ancestor instance
//!   into this type.
//!
//! ## Examples
//!
//! ```rust
//! use graphdoc::{TypeDesc, TypeRegistry};
//! use std::any::TypeId;
//!
//! struct Shape;
//! struct Circle;
//!
//! let mut registry = TypeRegistry::new();
//! registry.add(TypeDesc::of::<Shape>("demo.Shape"));
//! registry.add(TypeDesc::of::<Circle>("demo.Circle").base::<Shape>());
//!
//! assert!(registry.is_assignable(TypeId::of::<Circle>(), TypeId::of::<Shape>()));
//! assert!(!registry.is_assignable(TypeId::of::<Shape>(), TypeId::of::<Circle>()));
//! assert_eq!(registry.resolve_name("demo.Circle"), Some(TypeId::of::<Circle>()));
//! ```

use crate::convert::Converter;
use crate::processor::ObjectProcessor;
use crate::{Instance, Result};
use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Transform migrating an instance of an ancestor schema type into this type.
pub type MigrationFn = Arc<dyn Fn(&Instance) -> Result<Instance>>;

/// Schema version metadata for one registered type.
pub struct VersionInfo {
    pub version: String,
    /// Types of earlier schemas this type can migrate from (most recent
    /// first is conventional but not required; the path search is a DFS).
    pub ancestors: Vec<TypeId>,
    /// Builds an instance of this type from an immediate-ancestor instance.
    pub migrate: Option<MigrationFn>,
}

/// Everything registered about one type.
pub struct TypeInfo {
    pub id: TypeId,
    pub name: String,
    pub bases: Vec<TypeId>,
    pub tag_override: Option<String>,
    pub version: Option<VersionInfo>,
    pub converter_override: Option<Arc<dyn Converter>>,
    pub processor_override: Option<Arc<dyn ObjectProcessor>>,
}

/// Builder for one type registration.
pub struct TypeDesc {
    info: TypeInfo,
}

impl TypeDesc {
    /// Starts a registration for `T` under the given wire name.
    ///
    /// `T` may be unsized (`dyn Trait`), which is how abstract declared types
    /// are registered.
    #[must_use]
    pub fn of<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        TypeDesc {
            info: TypeInfo {
                id: TypeId::of::<T>(),
                name: name.into(),
                bases: Vec::new(),
                tag_override: None,
                version: None,
                converter_override: None,
                processor_override: None,
            },
        }
    }

    /// Declares `B` as a base of this type (assignability edge).
    #[must_use]
    pub fn base<B: ?Sized + 'static>(mut self) -> Self {
        self.info.bases.push(TypeId::of::<B>());
        self
    }

    /// Overrides the name emitted in `$type` tags for this type.
    #[must_use]
    pub fn tag_as(mut self, name: impl Into<String>) -> Self {
        self.info.tag_override = Some(name.into());
        self
    }

    /// Registers this type with a schema version string.
    #[must_use]
    pub fn versioned(mut self, version: impl Into<String>) -> Self {
        self.info.version = Some(VersionInfo {
            version: version.into(),
            ancestors: Vec::new(),
            migrate: None,
        });
        self
    }

    /// Adds `A` as an earlier-schema ancestor. Requires [`TypeDesc::versioned`]
    /// to have been called first.
    ///
    /// # Panics
    ///
    /// Panics if the type has no version registered — that is a registration
    /// bug, not a runtime condition.
    #[must_use]
    pub fn ancestor<A: ?Sized + 'static>(mut self) -> Self {
        self.version_mut().ancestors.push(TypeId::of::<A>());
        self
    }

    /// Sets the transform building this type from an ancestor instance.
    ///
    /// # Panics
    ///
    /// Panics if the type has no version registered.
    #[must_use]
    pub fn migrates_with(mut self, f: impl Fn(&Instance) -> Result<Instance> + 'static) -> Self {
        self.version_mut().migrate = Some(Arc::new(f));
        self
    }

    /// Forces a specific converter for this type, bypassing the serializer's
    /// converter lookup entirely.
    #[must_use]
    pub fn with_converter(mut self, converter: Arc<dyn Converter>) -> Self {
        self.info.converter_override = Some(converter);
        self
    }

    /// Forces a specific lifecycle processor for this type, replacing the
    /// serializer's processor list.
    #[must_use]
    pub fn with_processor(mut self, processor: Arc<dyn ObjectProcessor>) -> Self {
        self.info.processor_override = Some(processor);
        self
    }

    fn version_mut(&mut self) -> &mut VersionInfo {
        self.info
            .version
            .as_mut()
            .expect("call .versioned(..) before adding ancestors or migrations")
    }
}

/// The type metadata table consulted by the serialization pipeline.
#[derive(Default)]
pub struct TypeRegistry {
    by_id: HashMap<TypeId, TypeInfo>,
    by_name: HashMap<String, TypeId>,
}

impl TypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a registration; later registrations for the same type replace
    /// earlier ones.
    pub fn add(&mut self, desc: TypeDesc) {
        let info = desc.info;
        self.by_name.insert(info.name.clone(), info.id);
        if let Some(tag) = &info.tag_override {
            self.by_name.insert(tag.clone(), info.id);
        }
        self.by_id.insert(info.id, info);
    }

    /// Metadata for a type, if registered.
    #[must_use]
    pub fn info(&self, ty: TypeId) -> Option<&TypeInfo> {
        self.by_id.get(&ty)
    }

    /// The wire name a `$type` tag carries for `ty`: the tag override when
    /// present, the registered name otherwise.
    #[must_use]
    pub fn tag_name(&self, ty: TypeId) -> Option<&str> {
        let info = self.info(ty)?;
        Some(info.tag_override.as_deref().unwrap_or(&info.name))
    }

    /// Resolves a cleaned wire name back to a type.
    #[must_use]
    pub fn resolve_name(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// Returns `true` when `derived` is `declared` or transitively declares
    /// it as a base.
    #[must_use]
    pub fn is_assignable(&self, derived: TypeId, declared: TypeId) -> bool {
        if derived == declared {
            return true;
        }
        let mut visited = HashSet::new();
        let mut stack = vec![derived];
        while let Some(ty) = stack.pop() {
            if !visited.insert(ty) {
                continue;
            }
            if let Some(info) = self.by_id.get(&ty) {
                for &base in &info.bases {
                    if base == declared {
                        return true;
                    }
                    stack.push(base);
                }
            }
        }
        false
    }

    /// Computes the migration path from a stored version string to `target`:
    /// an ordered list of types starting at the type registered under the
    /// stored version and ending at `target`.
    ///
    /// Returns `None` when no registered ancestor chain carries the stored
    /// version (including when `target` itself is unversioned).
    #[must_use]
    pub fn version_path(&self, stored: &str, target: TypeId) -> Option<Vec<TypeId>> {
        let mut visited = HashSet::new();
        self.version_path_inner(stored, target, &mut visited)
    }

    fn version_path_inner(
        &self,
        stored: &str,
        target: TypeId,
        visited: &mut HashSet<TypeId>,
    ) -> Option<Vec<TypeId>> {
        if !visited.insert(target) {
            return None;
        }
        let version = self.by_id.get(&target)?.version.as_ref()?;
        if version.version == stored {
            return Some(vec![target]);
        }
        for &ancestor in &version.ancestors {
            if let Some(mut path) = self.version_path_inner(stored, ancestor, visited) {
                path.push(target);
                return Some(path);
            }
        }
        None
    }
}

/// Strips assembly qualifiers from a stored type name: everything from the
/// first comma on. Persisted documents from the original runtime carry names
/// like `Demo.Node, Demo.Assembly, Version=1.0.0.0`; only the leading
/// fully-qualified name is meaningful here.
#[must_use]
pub fn strip_assembly_qualifier(name: &str) -> &str {
    match name.find(',') {
        Some(index) => name[..index].trim_end(),
        None => name,
    }
}
