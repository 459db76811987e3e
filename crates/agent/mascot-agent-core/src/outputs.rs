//! Output contracts from the agent core.
//!
//! Outputs carry only this tick's render/sound effects and a separate list of
//! semantic events. Hosts apply effects through the [`Renderer`]/[`AudioSink`]
//! contracts and transport events.

use serde::{Deserialize, Serialize};

use crate::epoch::QueueGeneration;
use crate::error::AgentError;

/// Observable playback state at a frame boundary.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum SessionState {
    /// Final frame index reached with exit branching armed and no exit
    /// requested; the session stays alive on its timer cadence.
    Waiting,

    /// The session ended.
    Exited,
}

/// One render/sound side effect of a rendered frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    LayerOffset { layer: u32, x: i32, y: i32 },
    LayerVisible { layer: u32, visible: bool },
    Sound { key: String },
}

/// Discrete semantic signals emitted during stepping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum AgentEvent {
    PlaybackStarted {
        animation: String,
    },
    PlaybackState {
        animation: String,
        state: SessionState,
    },
    /// The pending count transitioned to exactly zero after a completion.
    QueueEmptied,
    /// Fires once per `clear()` call.
    QueueCleared {
        generation: QueueGeneration,
    },
    TaskFailed {
        reason: String,
    },
}

/// Outputs returned by `Agent::update()`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub effects: Vec<Effect>,
    #[serde(default)]
    pub events: Vec<AgentEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.effects.clear();
        self.events.clear();
    }

    #[inline]
    pub fn push_effect(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    #[inline]
    pub fn push_event(&mut self, event: AgentEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty() && self.events.is_empty()
    }

    /// Dispatch effects to the host collaborators. Audio failures are logged
    /// and swallowed; they never interrupt playback.
    pub fn apply(&self, renderer: &mut dyn Renderer, audio: &mut dyn AudioSink) {
        for effect in &self.effects {
            match effect {
                Effect::LayerOffset { layer, x, y } => renderer.set_layer_offset(*layer, *x, *y),
                Effect::LayerVisible { layer, visible } => {
                    renderer.set_layer_visible(*layer, *visible)
                }
                Effect::Sound { key } => {
                    if let Err(err) = audio.play(key) {
                        log::debug!("sound '{key}' failed to play: {err}");
                    }
                }
            }
        }
    }
}

/// Host rendering surface for the stacked sprite layers.
pub trait Renderer {
    fn set_layer_offset(&mut self, layer: u32, x: i32, y: i32);
    fn set_layer_visible(&mut self, layer: u32, visible: bool);
}

/// Best-effort sound playback.
pub trait AudioSink {
    fn play(&mut self, key: &str) -> Result<(), AgentError>;
}
