//! `TopologyEngine`: dirty-tracking node that keeps derived data in sync
//! with a topology.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized --init--> Clean <--refresh-- Dirty
//!                           |                  ^
//!                           +--edits/mark_dirty+
//! any state --detach/drop--> Destroyed
//! ```
//!
//! Records may be queued before `init`, but nothing is applied until then.
//! Rebinding to another topology drops the records pending from the old
//! one, since they refer to its numbering.
//!
//! The engine owns its handler, shares its change log with the topology
//! through an [`EngineLink`], and refers to the topology weakly: it never
//! keeps the topology alive, and a dropped topology puts the engine in the
//! same degraded mode as an absent one.

use std::rc::{Rc, Weak};

use crate::diagnostics::{Diagnostic, Severity, SharedSink, default_sink};
use crate::engine::handler::TopologyHandler;
use crate::engine::options::{DEFAULT_PREFIX, EngineOptions, MissingCollaborator};
use crate::topo_error::TopoError;
use crate::topology::cache::InvalidateCache;
use crate::topology::change_log::SharedChangeLog;
use crate::topology::element::{ElementFamily, ElementKind, FamilySet};
use crate::topology::registry::EngineLink;
use crate::topology::source::{SharedTopology, TopologySource};

/// Observable state of an engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EngineState {
    Uninitialized,
    Clean,
    Dirty,
    Destroyed,
}

/// Why a refresh did not reach the handler.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// `init` has not been called yet.
    Uninitialized,
    MissingTopology,
    MissingHandler,
    Destroyed,
}

/// Outcome of a successful [`TopologyEngine::refresh`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Refresh {
    /// The handler consumed `records` pending records.
    Applied { records: usize },
    /// Nothing was pending.
    Clean,
    /// Degraded mode; nothing was applied.
    Skipped(SkipReason),
}

/// Propagation node between a topology and one handler.
pub struct TopologyEngine<H> {
    data_name: String,
    prefix: String,
    initialized: bool,
    destroyed: bool,
    link: Rc<EngineLink>,
    handler: Option<H>,
    topology: Option<Weak<dyn TopologySource>>,
    linked: [bool; 6],
    outputs: Vec<String>,
    options: EngineOptions,
    sink: SharedSink,
    batches: u64,
}

impl<H: TopologyHandler> TopologyEngine<H> {
    /// Engine for the data named `data_name`, applying changes with `handler`.
    ///
    /// A missing handler is reported when the engine is refreshed.
    pub fn new(data_name: impl Into<String>, handler: Option<H>) -> Self {
        let data_name = data_name.into();
        TopologyEngine {
            link: EngineLink::new(data_name.clone()),
            data_name,
            prefix: String::new(),
            initialized: false,
            destroyed: false,
            handler,
            topology: None,
            linked: [false; 6],
            outputs: Vec::new(),
            options: EngineOptions::default(),
            sink: default_sink(),
            batches: 0,
        }
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.prefix = options.prefix.clone();
        self.options = options;
        self
    }

    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.sink = sink;
        self
    }

    /// `prefix + data name`.
    pub fn name(&self) -> String {
        format!("{}{}", self.prefix, self.data_name)
    }

    #[inline]
    pub fn data_name(&self) -> &str {
        &self.data_name
    }

    #[inline]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn set_prefix(&mut self, prefix: impl Into<String>) {
        self.prefix = prefix.into();
    }

    #[inline]
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    #[inline]
    pub fn handler(&self) -> Option<&H> {
        self.handler.as_ref()
    }

    #[inline]
    pub fn handler_mut(&mut self) -> Option<&mut H> {
        self.handler.as_mut()
    }

    /// Shared handle to the engine's pending edits.
    pub fn change_log(&self) -> SharedChangeLog {
        Rc::clone(self.link.log())
    }

    #[inline]
    pub fn link(&self) -> &Rc<EngineLink> {
        &self.link
    }

    /// The bound topology, if any and still alive.
    pub fn topology(&self) -> Option<SharedTopology> {
        self.topology.as_ref().and_then(Weak::upgrade)
    }

    /// Names of the data this engine feeds.
    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    /// Declare `name` as depending on this engine. Duplicates are ignored.
    pub fn add_output(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.outputs.contains(&name) {
            self.outputs.push(name);
        }
    }

    /// Number of batches successfully applied.
    #[inline]
    pub fn batches_applied(&self) -> u64 {
        self.batches
    }

    pub fn state(&self) -> EngineState {
        if self.destroyed {
            EngineState::Destroyed
        } else if !self.initialized {
            EngineState::Uninitialized
        } else if self.link.is_dirty() {
            EngineState::Dirty
        } else {
            EngineState::Clean
        }
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.link.is_dirty()
    }

    /// Flag derived data stale; the next refresh reaches the handler.
    #[inline]
    pub fn mark_dirty(&self) {
        self.link.mark_dirty();
    }

    /// Whether this engine receives records for `kind`'s family.
    #[inline]
    pub fn is_linked(&self, kind: ElementKind) -> bool {
        self.linked[kind.index()]
    }

    fn report(&self, severity: Severity, message: impl Into<String>) {
        self.sink.emit(Diagnostic {
            severity,
            origin: self.name(),
            message: message.into(),
        });
    }

    /// Bind to `source` and register with it.
    ///
    /// `None` leaves the engine in degraded mode (refresh is a no-op) and
    /// emits a warning. Any previously bound topology is left first, and
    /// records still pending from it are discarded with a warning.
    /// Returns whether a topology is now bound.
    pub fn bind_topology_source(&mut self, source: Option<SharedTopology>) -> bool {
        self.leave_topology();
        match source {
            Some(topo) => {
                self.topology = Some(Rc::downgrade(&topo));
                self.register_with(topo.as_ref());
                if self.initialized {
                    self.link_handler_kind();
                }
                true
            }
            None => {
                self.report(Severity::Warning, "topology is not dynamic");
                false
            }
        }
    }

    /// Register again with the bound topology (idempotent).
    pub fn register_topology(&mut self) -> bool {
        match self.topology() {
            Some(topo) => {
                self.register_with(topo.as_ref());
                true
            }
            None => {
                self.report(Severity::Warning, "topology is not dynamic");
                false
            }
        }
    }

    fn register_with(&mut self, topo: &dyn TopologySource) {
        let mut families = FamilySet::only(ElementFamily::Points);
        for kind in ElementKind::ALL.into_iter().filter(|k| self.linked[k.index()]) {
            families.insert(kind.family());
        }
        topo.register_engine(&self.link, families);
        self.linked[ElementKind::Point.index()] = true;
        log::trace!("{}: registered with topology `{}`", self.name(), topo.name());
    }

    /// Also receive records for `kind`'s family.
    ///
    /// Fails with a warning if no topology is bound or it does not maintain
    /// `kind`. Linking an already linked kind is a no-op.
    pub fn link_to(&mut self, kind: ElementKind) -> bool {
        if self.linked[kind.index()] {
            return true;
        }
        let Some(topo) = self.topology() else {
            self.report(
                Severity::Warning,
                format!("cannot link to {kind} data: topology is not dynamic"),
            );
            return false;
        };
        if !topo.supports(kind) {
            self.report(
                Severity::Warning,
                format!(
                    "cannot link to {kind} data: topology `{}` has no {kind}s",
                    topo.name()
                ),
            );
            return false;
        }
        topo.register_engine(&self.link, FamilySet::only(kind.family()));
        self.linked[kind.index()] = true;
        true
    }

    fn link_handler_kind(&mut self) {
        if let Some(kind) = self.handler.as_ref().map(TopologyHandler::element_kind) {
            self.link_to(kind);
        }
    }

    /// One-time setup: assign the default prefix if none was set, declare
    /// the data as an output and link the handler's element kind.
    /// Calling it again does nothing.
    pub fn init(&mut self) {
        if self.initialized || self.destroyed {
            return;
        }
        if self.prefix.is_empty() {
            self.prefix = DEFAULT_PREFIX.to_owned();
        }
        let data = self.data_name.clone();
        self.add_output(data);
        if self.topology().is_some() {
            self.link_handler_kind();
        }
        self.initialized = true;
        log::debug!("{}: initialized", self.name());
    }

    /// Refresh regardless of the dirty flag.
    pub fn reinit(&mut self) -> Result<Refresh, TopoError> {
        self.mark_dirty();
        self.refresh()
    }

    /// Apply pending edits if dirty.
    ///
    /// # Errors
    /// A consistency error from the handler. The rejected batch is put back
    /// in front of the log and the engine stays dirty; see
    /// [`discard_pending`](Self::discard_pending).
    /// With [`MissingCollaborator::Error`], a missing topology or handler.
    pub fn refresh(&mut self) -> Result<Refresh, TopoError> {
        if self.destroyed {
            return Ok(Refresh::Skipped(SkipReason::Destroyed));
        }
        if !self.initialized {
            log::debug!("{}: refresh before init ignored", self.name());
            return Ok(Refresh::Skipped(SkipReason::Uninitialized));
        }
        let Some(topo) = self.topology() else {
            return self.degraded(SkipReason::MissingTopology);
        };
        if self.handler.is_none() {
            return self.degraded(SkipReason::MissingHandler);
        }
        if !self.link.is_dirty() {
            return Ok(Refresh::Clean);
        }

        let records = self.link.log().borrow_mut().drain();
        let nb_points = topo.nb_points();
        if self.options.log_changes {
            log::debug!(
                "{}: {} topological change(s), {} point(s)",
                self.name(),
                records.len(),
                nb_points
            );
        }
        let Some(handler) = self.handler.as_mut() else {
            return self.degraded(SkipReason::MissingHandler);
        };
        match handler.apply_topology_changes(&records, nb_points) {
            Ok(()) => {
                self.link.mark_clean();
                self.batches += 1;
                Ok(Refresh::Applied {
                    records: records.len(),
                })
            }
            Err(e) => {
                log::warn!("{}: batch of {} rejected: {e}", self.name(), records.len());
                self.link.log().borrow_mut().requeue_front(records);
                Err(e)
            }
        }
    }

    fn degraded(&self, reason: SkipReason) -> Result<Refresh, TopoError> {
        let (severity, err) = match reason {
            SkipReason::MissingTopology => (
                Severity::Warning,
                TopoError::MissingTopology { engine: self.name() },
            ),
            _ => (
                Severity::Error,
                TopoError::MissingHandler { engine: self.name() },
            ),
        };
        match self.options.on_missing {
            MissingCollaborator::Ignore => Ok(Refresh::Skipped(reason)),
            MissingCollaborator::Warn => {
                self.report(severity, err.to_string());
                Ok(Refresh::Skipped(reason))
            }
            MissingCollaborator::Error => {
                self.report(severity, err.to_string());
                Err(err)
            }
        }
    }

    /// Drop every pending record and clear the dirty flag.
    /// Returns the number of records dropped.
    pub fn discard_pending(&mut self) -> usize {
        let dropped = self.link.log().borrow_mut().drain().len();
        self.link.mark_clean();
        dropped
    }

    fn leave_topology(&mut self) {
        self.linked = [false; 6];
        let Some(previous) = self.topology.take() else {
            return;
        };
        if let Some(topo) = previous.upgrade() {
            topo.registry().deregister(&self.link);
        }
        let dropped = self.discard_pending();
        if dropped > 0 {
            self.report(
                Severity::Warning,
                format!("discarded {dropped} record(s) pending from the previous topology"),
            );
        }
    }

    /// Deregister from the topology and enter the destroyed state.
    pub fn detach(&mut self) {
        if self.destroyed {
            return;
        }
        self.leave_topology();
        self.destroyed = true;
        log::trace!("{}: detached", self.name());
    }
}

impl<H> Drop for TopologyEngine<H> {
    fn drop(&mut self) {
        if let Some(topo) = self.topology.take().and_then(|w| w.upgrade()) {
            topo.registry().deregister(&self.link);
        }
    }
}

impl<H: TopologyHandler> InvalidateCache for TopologyEngine<H> {
    fn invalidate_cache(&mut self) {
        self.mark_dirty();
    }
}

impl<H> std::fmt::Debug for TopologyEngine<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopologyEngine")
            .field("data_name", &self.data_name)
            .field("prefix", &self.prefix)
            .field("initialized", &self.initialized)
            .field("destroyed", &self.destroyed)
            .field("dirty", &self.link.is_dirty())
            .field("has_handler", &self.handler.is_some())
            .field("has_topology", &self.topology.is_some())
            .field("outputs", &self.outputs)
            .finish()
    }
}

static_assertions::assert_not_impl_any!(
    TopologyEngine<crate::engine::ElementDataHandler<f64>>: Send, Sync
);
