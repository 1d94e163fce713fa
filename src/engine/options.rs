//! Engine and handler configuration.

/// What an engine does when a collaborator (topology or handler) is missing.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MissingCollaborator {
    /// Emit a diagnostic and skip the refresh.
    #[default]
    Warn,
    /// Emit a diagnostic and return an error from the refresh.
    Error,
    /// Skip the refresh silently.
    Ignore,
}

/// Prefix given to engines that were not configured with one.
pub const DEFAULT_PREFIX: &str = "TopologyEngine_";

/// Options for a [`TopologyEngine`](crate::engine::TopologyEngine).
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Name prefix; empty means [`DEFAULT_PREFIX`] is assigned at `init`.
    pub prefix: String,
    /// Policy for a missing or dropped topology, or a missing handler.
    pub on_missing: MissingCollaborator,
    /// Log the size of every batch at `debug` level.
    pub log_changes: bool,
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_uses_defaults() {
        let opts: EngineOptions = serde_json::from_str(r#"{ "on_missing": "Error" }"#).unwrap();
        assert_eq!(opts.on_missing, MissingCollaborator::Error);
        assert!(opts.prefix.is_empty());
        assert!(!opts.log_changes);
    }
}
