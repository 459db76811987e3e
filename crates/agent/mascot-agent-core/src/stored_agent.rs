//! Stored-agent JSON loading.

use crate::data::AgentData;
use crate::error::AgentError;

/// Parse a stored agent definition into the canonical [`AgentData`] model.
///
/// Notes:
/// - Field names are camelCase (`framesize`, `overlayCount`, `sounds`,
///   `animations`; per-frame `exitBranch`, `branching`, `useExitBranching`).
/// - Frame durations are kept in ticks; a missing or zero duration falls back
///   to the configured default at playback time, not here.
/// - Basic invariants (non-empty frame lists, in-range branch targets) are
///   validated before the data is handed to callers.
pub fn parse_agent_json(s: &str) -> Result<AgentData, AgentError> {
    let data: AgentData = serde_json::from_str(s)?;
    data.validate_basic()?;
    Ok(data)
}
