//! Scripted controllers: typed event dispatch to user callbacks, gated by a
//! capability table detected when the controller is loaded.

pub mod callbacks;
pub mod event;
pub mod scripted;

pub use callbacks::{CallbackResult, CallbackTable, ControllerCallbacks};
pub use event::{ControllerEvent, EventKind, Lifecycle, MouseButton};
pub use scripted::{Dispatch, DispatchStats, ScriptedController};
