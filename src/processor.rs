//! Lifecycle hooks around serialize/deserialize.
//!
//! An [`ObjectProcessor`] observes (and may adjust) every object the pipeline
//! touches. Multiple processors can apply to the same type: the pipeline runs
//! before-hooks in registration order and after-hooks in *reverse*
//! registration order, so the last processor to prepare an object is the
//! first to finalize it.
//!
//! Hooks are fallible by signature but cannot fail the pipeline: the
//! orchestrator downgrades a hook error to a diagnostic note on the
//! [`Outcome`](crate::Outcome) and keeps going.

use crate::{DocValue, Instance, Result};
use std::any::TypeId;

/// Lifecycle callbacks invoked around each object the pipeline processes.
///
/// All hooks default to no-ops; implement only what you need.
pub trait ObjectProcessor {
    /// Name used in diagnostic notes when a hook fails.
    fn name(&self) -> &str {
        "object-processor"
    }

    /// Filters which types this processor observes.
    fn can_process(&self, ty: TypeId) -> bool {
        let _ = ty;
        true
    }

    /// Runs before an instance is serialized.
    fn before_serialize(&self, ty: TypeId, instance: &Instance) -> Result<()> {
        let _ = (ty, instance);
        Ok(())
    }

    /// Runs after an instance was serialized; may adjust the produced value.
    fn after_serialize(&self, ty: TypeId, instance: &Instance, data: &mut DocValue) -> Result<()> {
        let _ = (ty, instance, data);
        Ok(())
    }

    /// Runs before deserialization starts for a value.
    fn before_deserialize(&self, ty: TypeId, data: &DocValue) -> Result<()> {
        let _ = (ty, data);
        Ok(())
    }

    /// Runs after the instance exists but before its contents are populated.
    fn before_populate(&self, ty: TypeId, instance: &Instance, data: &DocValue) -> Result<()> {
        let _ = (ty, instance, data);
        Ok(())
    }

    /// Runs after deserialization finished for an instance.
    fn after_deserialize(&self, ty: TypeId, instance: &Instance) -> Result<()> {
        let _ = (ty, instance);
        Ok(())
    }
}
