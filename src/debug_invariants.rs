//! Invariant checking hooks.
//!
//! Structures with internal bookkeeping (the engine registry, topology
//! element counts) implement [`DebugInvariants`]. Checks run after mutation
//! in debug builds and whenever the `check-invariants` feature is enabled;
//! `strict-invariants` implies it.

use crate::topo_error::TopoError;

/// Trait for validating data structure invariants.
pub trait DebugInvariants {
    /// Validate invariants and return the first violation encountered.
    fn validate_invariants(&self) -> Result<(), TopoError>;

    /// Panic if invariants are violated and invariant checking is enabled.
    fn debug_assert_invariants(&self) {
        if cfg!(any(debug_assertions, feature = "check-invariants")) {
            if let Err(e) = self.validate_invariants() {
                panic!("[invariants] {}: {e}", self.invariant_context());
            }
        }
    }

    /// Label used in invariant panics.
    fn invariant_context(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
