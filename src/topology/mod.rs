//! Topology side of change propagation.
//!
//! This module provides:
//! - element kinds, record families and change kinds
//! - `TopologyRecord` and the `ChangeLog` queue
//! - the `TopologySource` collaborator trait and the `MeshTopology` container
//! - the explicit `EngineRegistry` edits are fanned out through

pub mod cache;
pub mod change_log;
pub mod element;
pub mod mesh;
pub mod record;
pub mod registry;
pub mod source;

pub use cache::InvalidateCache;
pub use change_log::{ChangeLog, SharedChangeLog};
pub use element::{ChangeKind, ElementFamily, ElementKind, FamilySet};
pub use mesh::MeshTopology;
pub use record::{Ancestry, RemovalStrategy, TopologyRecord};
pub use registry::{EngineLink, EngineRegistry, Registration};
pub use source::{SharedTopology, TopologySource};
