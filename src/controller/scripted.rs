//! `ScriptedController`: typed dispatch of events to script callbacks.
//!
//! Which callbacks exist is detected once, when the controller is loaded, and
//! kept in a [`CallbackTable`] owned by the controller. Events whose callback
//! is missing are skipped without calling into the script at all.
//!
//! A failing callback never propagates: the failure is reported to the
//! controller's diagnostic sink and dispatch carries on.

use std::time::{Duration, Instant};

use crate::controller::callbacks::{CallbackResult, CallbackTable, ControllerCallbacks};
use crate::controller::event::{ControllerEvent, EventKind, Lifecycle};
use crate::diagnostics::{Diagnostic, Severity, SharedSink, default_sink};

/// Outcome of [`ScriptedController::handle`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Dispatch {
    /// The controller is not loaded, or the callback is not implemented.
    Skipped,
    /// The callback ran. `handled` is what key callbacks returned, and
    /// `false` for every other kind.
    Called { handled: bool },
    /// The callback returned an error, which was reported.
    Failed,
}

impl Dispatch {
    /// Whether the event should be marked handled by the host.
    #[inline]
    pub fn handled(self) -> bool {
        matches!(self, Dispatch::Called { handled: true })
    }
}

/// Per event kind dispatch accounting.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub calls: u64,
    pub failures: u64,
    pub elapsed: Duration,
}

/// A controller whose behavior is provided by `C`.
pub struct ScriptedController<C> {
    name: String,
    callbacks: C,
    table: CallbackTable,
    loaded: bool,
    stats: [DispatchStats; EventKind::ALL.len()],
    sink: SharedSink,
}

impl<C: ControllerCallbacks> ScriptedController<C> {
    pub fn new(name: impl Into<String>, callbacks: C) -> Self {
        ScriptedController {
            name: name.into(),
            callbacks,
            table: CallbackTable::NONE,
            loaded: false,
            stats: [DispatchStats::default(); EventKind::ALL.len()],
            sink: default_sink(),
        }
    }

    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.sink = sink;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn callbacks(&self) -> &C {
        &self.callbacks
    }

    #[inline]
    pub fn callbacks_mut(&mut self) -> &mut C {
        &mut self.callbacks
    }

    #[inline]
    pub fn table(&self) -> CallbackTable {
        self.table
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn stats(&self, kind: EventKind) -> DispatchStats {
        self.stats[kind.index()]
    }

    /// Detect the callbacks, then call `onLoaded`.
    pub fn load(&mut self) {
        self.table = CallbackTable::detect(&self.callbacks);
        for kind in self.table.missing() {
            log::debug!("{}: {} not found", self.name, kind.callback_name());
        }
        self.loaded = true;
        self.lifecycle(Lifecycle::Loaded);
    }

    /// Swap in new callbacks and load them. Returns the previous ones.
    pub fn reload(&mut self, callbacks: C) -> C {
        let old = std::mem::replace(&mut self.callbacks, callbacks);
        self.load();
        old
    }

    /// Run a lifecycle callback. These are not gated by the callback table.
    /// Returns `false` if the callback failed.
    pub fn lifecycle(&mut self, call: Lifecycle) -> bool {
        let c = &mut self.callbacks;
        let result = match call {
            Lifecycle::Loaded => c.on_loaded(),
            Lifecycle::CreateGraph => c.create_graph(),
            Lifecycle::InitGraph => c.init_graph(),
            Lifecycle::BwdInitGraph => c.bwd_init_graph(),
            Lifecycle::StoreResetState => c.store_reset_state(),
            Lifecycle::Reset => c.reset(),
            Lifecycle::Cleanup => c.cleanup(),
            Lifecycle::HeartBeat => {
                let start = Instant::now();
                let r = c.on_heart_beat();
                log::trace!(
                    "ScriptController_HeartBeat_{}: {:?}",
                    self.name,
                    start.elapsed()
                );
                r
            }
        };
        self.settle(call.callback_name(), result).is_some()
    }

    /// Dispatch `event` if the controller is loaded and implements it.
    pub fn handle(&mut self, event: &ControllerEvent) -> Dispatch {
        let kind = event.kind();
        if !self.loaded || !self.table.contains(kind) {
            return Dispatch::Skipped;
        }

        let start = Instant::now();
        let result = self.call(event);
        let elapsed = start.elapsed();
        log::trace!(
            "ScriptController_{}_{}: {} took {:?}",
            kind.timer_group(),
            self.name,
            kind.callback_name(),
            elapsed
        );

        let stats = &mut self.stats[kind.index()];
        stats.calls += 1;
        stats.elapsed += elapsed;
        match self.settle(kind.callback_name(), result) {
            Some(handled) => Dispatch::Called { handled },
            None => {
                self.stats[kind.index()].failures += 1;
                Dispatch::Failed
            }
        }
    }

    fn call(&mut self, event: &ControllerEvent) -> CallbackResult<bool> {
        let c = &mut self.callbacks;
        match event {
            ControllerEvent::Draw => c.draw().map(|()| false),
            ControllerEvent::BeginAnimationStep { dt } => {
                c.on_begin_animation_step(*dt).map(|()| false)
            }
            ControllerEvent::EndAnimationStep { dt } => c.on_end_animation_step(*dt).map(|()| false),
            ControllerEvent::KeyPressed(key) => c.on_key_pressed(*key),
            ControllerEvent::KeyReleased(key) => c.on_key_released(*key),
            ControllerEvent::MouseMove { x, y } => c.on_mouse_move(*x, *y).map(|()| false),
            ControllerEvent::MouseButton {
                button,
                x,
                y,
                pressed,
            } => c.on_mouse_button(*button, *x, *y, *pressed).map(|()| false),
            ControllerEvent::MouseWheel { x, y, delta } => {
                c.on_mouse_wheel(*x, *y, *delta).map(|()| false)
            }
            ControllerEvent::Script {
                sender,
                name,
                payload,
            } => c.on_script_event(sender, name, payload).map(|()| false),
            ControllerEvent::Gui {
                control,
                value_name,
                value,
            } => c.on_gui_event(control, value_name, value).map(|()| false),
        }
    }

    /// Report a failed callback; `None` on failure.
    fn settle<T>(&self, callback: &str, result: CallbackResult<T>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.sink.emit(Diagnostic {
                    severity: Severity::Error,
                    origin: self.name.clone(),
                    message: format!("{callback}: {e}"),
                });
                None
            }
        }
    }
}

impl<C> std::fmt::Debug for ScriptedController<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedController")
            .field("name", &self.name)
            .field("loaded", &self.loaded)
            .field("table", &self.table)
            .finish()
    }
}
