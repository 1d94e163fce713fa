//! Diagnostic sinks for degraded-mode conditions.
//!
//! Engines never abort the host when a collaborator is missing; they report
//! the condition to a [`DiagnosticSink`] and carry on. The default sink
//! forwards to the `log` facade; [`RecordingSink`] keeps the messages so a
//! host (or a test) can inspect them.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Severity of a diagnostic.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A severity-tagged message attributed to a named origin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub origin: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}: {}", self.severity, self.origin, self.message)
    }
}

/// Receiver of diagnostics.
pub trait DiagnosticSink {
    fn emit(&self, diagnostic: Diagnostic);
}

/// Shared handle to a sink.
pub type SharedSink = Rc<dyn DiagnosticSink>;

/// Forwards diagnostics to the `log` crate.
#[derive(Copy, Clone, Debug, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&self, d: Diagnostic) {
        match d.severity {
            Severity::Info => log::info!("{}: {}", d.origin, d.message),
            Severity::Warning => log::warn!("{}: {}", d.origin, d.message),
            Severity::Error => log::error!("{}: {}", d.origin, d.message),
        }
    }
}

/// Stores every diagnostic it receives, and also forwards it to `log`.
#[derive(Debug, Default)]
pub struct RecordingSink {
    entries: RefCell<Vec<Diagnostic>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all diagnostics received so far.
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.borrow().clone()
    }

    /// Number of diagnostics with exactly `severity`.
    pub fn count(&self, severity: Severity) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Forget everything received so far.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl DiagnosticSink for RecordingSink {
    fn emit(&self, d: Diagnostic) {
        LogSink.emit(d.clone());
        self.entries.borrow_mut().push(d);
    }
}

/// The sink used when none is supplied.
pub fn default_sink() -> SharedSink {
    Rc::new(LogSink)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_counts_by_severity() {
        let sink = RecordingSink::new();
        sink.emit(Diagnostic {
            severity: Severity::Warning,
            origin: "a".into(),
            message: "w".into(),
        });
        sink.emit(Diagnostic {
            severity: Severity::Error,
            origin: "a".into(),
            message: "e".into(),
        });
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.count(Severity::Warning), 1);
        assert_eq!(sink.count(Severity::Info), 0);
        assert_eq!(sink.entries()[1].to_string(), "[Error] a: e");
        sink.clear();
        assert!(sink.is_empty());
    }
}
