//! TopoError: Unified error type for topology-change propagation.
//!
//! Every fallible operation in this crate returns `Result<_, TopoError>`.
//! Degraded-mode conditions (a missing topology or handler) are normally
//! absorbed by the engine and reported through a
//! [`DiagnosticSink`](crate::diagnostics::DiagnosticSink); they only surface as
//! errors when the engine is configured to escalate them.

use thiserror::Error;

use crate::topology::element::{ChangeKind, ElementKind};

/// Broad classification of a [`TopoError`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// A collaborator (topology source, handler) is absent.
    Configuration,
    /// A record does not match the state of the data it is applied to.
    Consistency,
    /// A registration request could not be honored.
    Registration,
    /// A controller callback reported a failure.
    Callback,
}

/// Unified error type for topology propagation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopoError {
    /// A record references an element outside the tracked range.
    #[error("{change:?}: index {index} out of bounds for {len} tracked elements")]
    IndexOutOfBounds {
        change: ChangeKind,
        index: usize,
        len: usize,
    },
    /// A removal record lists the same index more than once.
    #[error("{change:?}: index {index} listed more than once")]
    DuplicateIndex { change: ChangeKind, index: usize },
    /// Added elements must extend the array at its tail, in order.
    #[error("{change:?}: expected new element index {expected}, found {found}")]
    NonTailAddition {
        change: ChangeKind,
        expected: usize,
        found: usize,
    },
    /// Ancestry metadata does not line up with the elements it describes.
    #[error("ancestry mismatch: expected {expected} entries, found {found}")]
    AncestryMismatch { expected: usize, found: usize },
    /// Ancestor list and weight list of one element differ in length.
    #[error("element {element}: {ancestors} ancestors but {weights} weights")]
    WeightCountMismatch {
        element: usize,
        ancestors: usize,
        weights: usize,
    },
    /// Adding `count` elements to `len` existing ones overflows `usize`.
    #[error("cannot add {count} {kind} elements to {len}: count overflows")]
    CountOverflow {
        kind: ElementKind,
        count: usize,
        len: usize,
    },
    /// After applying point records the array length differs from the topology.
    #[error("point data holds {found} entries but topology has {expected} points")]
    PointCountMismatch { expected: usize, found: usize },
    /// The topology does not expose the requested element kind.
    #[error("element kind {0:?} is not supported by this topology")]
    UnsupportedElementKind(ElementKind),
    /// The registry's ordering and lookup tables disagree.
    #[error("engine registry corrupted: {entries} entries but {order} ordered keys")]
    RegistryCorrupted { entries: usize, order: usize },
    /// No topology source is bound, or it has been dropped.
    #[error("engine `{engine}`: topology is not dynamic or no longer available")]
    MissingTopology { engine: String },
    /// The engine has no handler to apply changes with.
    #[error("engine `{engine}`: topology handler not available")]
    MissingHandler { engine: String },
    /// A controller callback returned an error.
    #[error("callback `{callback}` failed: {message}")]
    CallbackFailed {
        callback: &'static str,
        message: String,
    },
}

impl TopoError {
    /// Classify this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            TopoError::IndexOutOfBounds { .. }
            | TopoError::DuplicateIndex { .. }
            | TopoError::NonTailAddition { .. }
            | TopoError::AncestryMismatch { .. }
            | TopoError::WeightCountMismatch { .. }
            | TopoError::CountOverflow { .. }
            | TopoError::PointCountMismatch { .. } => ErrorCategory::Consistency,
            TopoError::MissingTopology { .. } | TopoError::MissingHandler { .. } => {
                ErrorCategory::Configuration
            }
            TopoError::UnsupportedElementKind(_) | TopoError::RegistryCorrupted { .. } => {
                ErrorCategory::Registration
            }
            TopoError::CallbackFailed { .. } => ErrorCategory::Callback,
        }
    }

    /// Shorthand for `category() == ErrorCategory::Consistency`.
    #[inline]
    pub fn is_consistency(&self) -> bool {
        self.category() == ErrorCategory::Consistency
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        let e = TopoError::IndexOutOfBounds {
            change: ChangeKind::PointsRemoved,
            index: 9,
            len: 5,
        };
        assert!(e.is_consistency());
        assert_eq!(
            TopoError::MissingHandler { engine: "e".into() }.category(),
            ErrorCategory::Configuration
        );
        assert_eq!(
            TopoError::UnsupportedElementKind(ElementKind::Hexahedron).category(),
            ErrorCategory::Registration
        );
    }

    #[test]
    fn display_mentions_bounds() {
        let e = TopoError::IndexOutOfBounds {
            change: ChangeKind::EdgesRemoved,
            index: 7,
            len: 3,
        };
        let msg = e.to_string();
        assert!(msg.contains("index 7"));
        assert!(msg.contains("3 tracked"));
    }
}
