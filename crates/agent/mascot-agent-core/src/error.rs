//! Error types for the agent core.

use thiserror::Error;

/// Errors produced while loading agent data or executing queued tasks.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AgentError {
    /// Stored-agent JSON could not be deserialized.
    #[error("agent data parse error: {0}")]
    Parse(String),

    /// Agent data deserialized but violates a structural invariant.
    #[error("invalid agent data: {reason}")]
    InvalidData { reason: String },

    /// A queued task reported failure.
    #[error("task failed: {reason}")]
    Task { reason: String },

    /// A sound source could not be played by the host.
    #[error("audio playback failed: {reason}")]
    Audio { reason: String },
}

impl AgentError {
    /// Convenience constructor for task failures.
    pub fn task(reason: impl Into<String>) -> Self {
        Self::Task {
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
