//! Canonical agent data model: sprite-frame animations keyed by name.
//!
//! The data set is created once when an agent loads and is read-only for the
//! entity's lifetime. Wire names are camelCase (`overlayCount`, `exitBranch`,
//! `useExitBranching`, `frameIndex`), matching the stored-agent JSON format.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// One weighted branch target.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub frame_index: usize,
    pub weight: f32,
}

/// Weighted random branch table evaluated at a frame boundary.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Branching {
    pub branches: Vec<Branch>,
}

/// One step of a sprite animation.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    /// Display time in ticks. Zero falls back to the configured default.
    #[serde(default)]
    pub duration: u64,

    /// Per-layer sprite-sheet offsets; layers beyond this list are hidden.
    #[serde(default)]
    pub images: Vec<[i32; 2]>,

    /// Sound key looked up in the sound map when the frame renders.
    #[serde(default)]
    pub sound: Option<String>,

    /// Frame to jump to once an exit has been requested.
    #[serde(default)]
    pub exit_branch: Option<usize>,

    #[serde(default)]
    pub branching: Option<Branching>,
}

/// An ordered frame sequence. With `use_exit_branching` the final frame index
/// is a wait state that holds until an exit is requested.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnimationDefinition {
    pub frames: Vec<Frame>,
    #[serde(default)]
    pub use_exit_branching: bool,
}

/// Static data set for one agent: sprite geometry, sound keys, animations.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentData {
    /// Width and height of one sprite frame.
    pub framesize: [u32; 2],

    /// Number of stacked sprite layers the renderer composites.
    pub overlay_count: u32,

    #[serde(default)]
    pub sounds: Vec<String>,

    pub animations: HashMap<String, AnimationDefinition>,
}

impl AgentData {
    /// Validate basic invariants: non-empty frame lists, in-range branch
    /// targets, finite non-negative weights.
    pub fn validate_basic(&self) -> Result<(), AgentError> {
        for (name, animation) in &self.animations {
            if animation.frames.is_empty() {
                return Err(AgentError::InvalidData {
                    reason: format!("animation '{name}' has no frames"),
                });
            }
            let len = animation.frames.len();
            for (idx, frame) in animation.frames.iter().enumerate() {
                if let Some(exit) = frame.exit_branch {
                    if exit >= len {
                        return Err(AgentError::InvalidData {
                            reason: format!(
                                "exitBranch {exit} out of range in '{name}' frame {idx}"
                            ),
                        });
                    }
                }
                if let Some(branching) = &frame.branching {
                    for branch in &branching.branches {
                        if branch.frame_index >= len {
                            return Err(AgentError::InvalidData {
                                reason: format!(
                                    "branch target {} out of range in '{name}' frame {idx}",
                                    branch.frame_index
                                ),
                            });
                        }
                        if !branch.weight.is_finite() || branch.weight < 0.0 {
                            return Err(AgentError::InvalidData {
                                reason: format!(
                                    "branch weight {} invalid in '{name}' frame {idx}",
                                    branch.weight
                                ),
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Animation names in sorted order.
    pub fn animation_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.animations.keys().cloned().collect();
        names.sort();
        names
    }

    #[inline]
    pub fn has_animation(&self, name: &str) -> bool {
        self.animations.contains_key(name)
    }
}
