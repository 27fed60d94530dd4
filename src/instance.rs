//! Dynamic object handles exchanged across the converter contract.
//!
//! The pipeline moves objects around without knowing their concrete types, so
//! it needs a handle that carries three things at once:
//!
//! - shared mutable access to the object (`Rc<RefCell<T>>`), so an instance
//!   can be registered under its `$id` *before* its fields are populated and
//!   later references resolve to the very same object;
//! - the runtime [`TypeId`] of the contained value, driving converter
//!   selection and inheritance tagging;
//! - pointer identity, which the reference tracker keys its visited-map on.
//!
//! [`Instance`] also has an explicit null state: the containment fallback the
//! deserializer substitutes when instance construction fails.
//!
//! ## Examples
//!
//! ```rust
//! use graphdoc::Instance;
//! use std::any::TypeId;
//!
//! let a = Instance::new(42i32);
//! let alias = a.clone();
//! assert_eq!(a.type_id(), Some(TypeId::of::<i32>()));
//! assert_eq!(a.address(), alias.address());          // same object
//! assert_ne!(a.address(), Instance::new(42i32).address()); // equal value, distinct object
//!
//! let _ = a.with_mut(|v: &mut i32| *v += 1);
//! assert_eq!(alias.with(|v: &i32| *v), Some(43));
//! ```

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A shared, dynamically-typed handle to one object in a graph, or null.
#[derive(Clone)]
pub struct Instance {
    inner: Option<Cell>,
}

#[derive(Clone)]
struct Cell {
    // concrete type behind the erasure is always RefCell<T>
    cell: Rc<dyn Any>,
    ty: TypeId,
}

impl Instance {
    /// Wraps a fresh value in a new shared cell.
    #[must_use]
    pub fn new<T: 'static>(value: T) -> Self {
        Self::from_handle(Rc::new(RefCell::new(value)))
    }

    /// Wraps an existing shared cell, preserving its identity.
    ///
    /// Handles cloned from the same `Rc` compare equal under
    /// [`Instance::address`], which is what lets shared and cyclic graphs
    /// serialize with correct topology.
    #[must_use]
    pub fn from_handle<T: 'static>(handle: Rc<RefCell<T>>) -> Self {
        Instance {
            inner: Some(Cell {
                cell: handle,
                ty: TypeId::of::<T>(),
            }),
        }
    }

    /// The null instance: the construction-failure fallback.
    #[must_use]
    pub const fn null() -> Self {
        Instance { inner: None }
    }

    /// Returns `true` for the null instance.
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.inner.is_none()
    }

    /// Runtime type of the contained value; `None` for null.
    #[inline]
    #[must_use]
    pub fn type_id(&self) -> Option<TypeId> {
        self.inner.as_ref().map(|c| c.ty)
    }

    /// Pointer identity of the shared cell; `None` for null.
    #[inline]
    #[must_use]
    pub fn address(&self) -> Option<usize> {
        self.inner
            .as_ref()
            .map(|c| Rc::as_ptr(&c.cell) as *const () as usize)
    }

    /// Extracts the typed shared cell, or `None` when the contained type is
    /// not `T` (or the instance is null).
    #[must_use]
    pub fn handle<T: 'static>(&self) -> Option<Rc<RefCell<T>>> {
        let cell = self.inner.as_ref()?;
        cell.cell.clone().downcast::<RefCell<T>>().ok()
    }

    /// Borrows the contained value immutably for the duration of `f`.
    pub fn with<T: 'static, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let handle = self.handle::<T>()?;
        let guard = handle.borrow();
        Some(f(&guard))
    }

    /// Borrows the contained value mutably for the duration of `f`.
    pub fn with_mut<T: 'static, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let handle = self.handle::<T>()?;
        let mut guard = handle.borrow_mut();
        Some(f(&mut guard))
    }
}

impl Default for Instance {
    /// The null instance, so graph structs holding `Instance` fields can
    /// derive `Default`.
    fn default() -> Self {
        Instance::null()
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            None => f.write_str("Instance(null)"),
            Some(cell) => write!(f, "Instance({:?} @ {:#x})", cell.ty, self.address().unwrap_or(0)),
        }
    }
}
