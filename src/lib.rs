#![cfg_attr(docsrs, feature(doc_cfg))]
//! # topo-propagate
//!
//! topo-propagate keeps per-element data arrays consistent with a mesh
//! topology that changes at run time. Every edit of the topology (points,
//! edges, faces or volumes added or removed) is recorded and fanned out to
//! the engines registered with it; each engine replays the pending records
//! on the data it owns the next time it is refreshed.
//!
//! ## Features
//! - `TopologyRecord` and `ChangeLog`: ordered, serializable edit records
//! - `MeshTopology` with an explicit `EngineRegistry` filtered by record family
//! - `TopologyEngine`: dirty tracking, weak topology binding, degraded mode
//!   reported through a `DiagnosticSink`
//! - `ElementDataHandler` and `TopologyData`: all-or-nothing batch
//!   application with ancestor interpolation and creation/destruction hooks
//! - `ScriptedController`: typed event dispatch gated by a callback table
//!
//! ## Threading
//!
//! Everything here is single-threaded. Shared state uses `Rc`, `RefCell` and
//! `Cell`, so engines and topologies are neither `Send` nor `Sync`.
//!
//! ## Usage
//!
//! ```
//! use topo_propagate::prelude::*;
//!
//! let topo = MeshTopology::new("mesh", 5).shared();
//! let mut mass = TopologyData::new("mass", ElementKind::Point, vec![1.0_f64; 5]);
//! mass.depend_on(Some(topo.clone()));
//!
//! topo.add_points(3).unwrap();
//! topo.remove_points(&[1, 4]).unwrap();
//! assert_eq!(mass.values().unwrap().len(), topo.nb_points());
//! ```
//!
//! ## Invariant checks
//! Debug builds validate registry and topology invariants after every edit.
//! Enable the `check-invariants` feature to keep them in release builds.

pub mod controller;
pub mod debug_invariants;
pub mod diagnostics;
pub mod engine;
pub mod topo_error;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::controller::{
        ControllerCallbacks, ControllerEvent, Dispatch, EventKind, Lifecycle, ScriptedController,
    };
    pub use crate::diagnostics::{Diagnostic, DiagnosticSink, LogSink, RecordingSink, Severity};
    pub use crate::engine::{
        ElementDataHandler, ElementValue, EngineOptions, EngineState, MissingCollaborator, Refresh,
        SkipReason, TopologyData, TopologyEngine, TopologyHandler,
    };
    pub use crate::topo_error::{ErrorCategory, TopoError};
    pub use crate::topology::{
        Ancestry, ChangeKind, ChangeLog, ElementFamily, ElementKind, FamilySet, InvalidateCache,
        MeshTopology, RemovalStrategy, TopologyRecord, TopologySource,
    };
}

static_assertions::assert_impl_all!(topo_error::TopoError: Clone, Send, Sync);
