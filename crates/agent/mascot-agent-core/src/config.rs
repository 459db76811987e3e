//! Core configuration for mascot-agent-core.

use serde::{Deserialize, Serialize};

/// Tunables for playback timing and the idle loop.
/// Keep this minimal; expand as needed without breaking API.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Delay applied when a frame declares no duration (or zero), in ticks.
    pub default_frame_duration: u64,

    /// Animations whose name starts with this prefix are idle candidates.
    pub idle_prefix: String,

    /// Ticks between an idle animation exiting and the next idle step.
    pub idle_restart_delay: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_frame_duration: 100,
            idle_prefix: "Idle".to_string(),
            idle_restart_delay: 1,
        }
    }
}
