//! Data side of change propagation: handlers that apply topology edits to
//! per-element data, and the engine that decides when to run them.

pub mod element_data;
pub mod handler;
pub mod options;
pub mod topology_data;
pub mod topology_engine;
pub mod value;

pub use element_data::ElementDataHandler;
pub use handler::TopologyHandler;
pub use options::{DEFAULT_PREFIX, EngineOptions, MissingCollaborator};
pub use topology_data::TopologyData;
pub use topology_engine::{EngineState, Refresh, SkipReason, TopologyEngine};
pub use value::ElementValue;
