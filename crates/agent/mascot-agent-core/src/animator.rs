//! Sprite animation state machine.
//!
//! Computes the next frame (sequential, exit-branch, or weighted-branch),
//! renders per-frame layer/sound effects into [`Outputs`], and runs playback
//! as epoch-guarded sessions on the timer wheel. Exactly one session is
//! current at a time; epoch comparison is the sole invalidation mechanism.

use hashbrown::HashMap;

use crate::data::{AgentData, AnimationDefinition};
use crate::epoch::PlaybackEpoch;
use crate::outputs::{AgentEvent, Effect, Outputs, SessionState};
use crate::rng::RandomSource;
use crate::scheduler::{Scheduler, Wakeup};

/// Sound sources keyed by the sound names frames refer to.
pub type SoundMap = HashMap<String, String>;

/// Cancellable reference to one playback session. Compare with the live
/// session through [`Animator::finished`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PlaybackHandle {
    pub(crate) epoch: PlaybackEpoch,
}

/// The only mutable run-time unit of the state machine.
///
/// `frame_index` is where the playhead is parked; `data_index` is the frame
/// whose data (duration, exit branch, branching table, images) is live. The
/// two diverge in the exit-branching wait state: the playhead parks on the
/// final index while the data of the frame last entered normally stays in
/// effect, so its exit branch and cadence keep governing the wait.
#[derive(Clone, Debug)]
struct PlaybackSession {
    animation: String,
    epoch: PlaybackEpoch,
    frame_index: usize,
    data_index: Option<usize>,
}

#[derive(Debug)]
pub struct Animator {
    epoch: PlaybackEpoch,
    session: Option<PlaybackSession>,
    exit_requested: bool,
    sounds: SoundMap,
    default_frame_duration: u64,
}

impl Animator {
    pub fn new(default_frame_duration: u64, sounds: SoundMap) -> Self {
        Self {
            epoch: PlaybackEpoch(0),
            session: None,
            exit_requested: false,
            sounds,
            default_frame_duration,
        }
    }

    /// Swap sound sources and bump the lifecycle epoch so every outstanding
    /// frame timer from the previous animation set goes stale.
    pub fn reinitialize(&mut self, sounds: SoundMap) {
        self.sounds = sounds;
        self.session = None;
        self.exit_requested = false;
        self.epoch = self.epoch.bump();
        log::debug!("animator reinitialized");
    }

    /// Set up a session at frame 0 without rendering anything yet. Absent
    /// names yield an already-finished handle: no frames, no error.
    pub fn begin(&mut self, data: &AgentData, name: &str) -> PlaybackHandle {
        self.epoch = self.epoch.bump();
        let handle = PlaybackHandle { epoch: self.epoch };
        if !data.animations.contains_key(name) {
            log::debug!("animation '{name}' is not in the data set; playback is a no-op");
            return handle;
        }
        self.exit_requested = false;
        self.session = Some(PlaybackSession {
            animation: name.to_string(),
            epoch: self.epoch,
            frame_index: 0,
            data_index: None,
        });
        log::debug!("playback started: {name}");
        handle
    }

    /// Start a session and render its first frame immediately.
    pub fn play(
        &mut self,
        data: &AgentData,
        name: &str,
        scheduler: &mut Scheduler,
        outputs: &mut Outputs,
        rng: &mut dyn RandomSource,
    ) -> PlaybackHandle {
        let handle = self.begin(data, name);
        if !self.finished(handle) {
            self.step(data, scheduler, outputs, rng);
        }
        handle
    }

    /// Request an exit at the next frame boundary. Animations without exit
    /// data simply finish naturally.
    #[inline]
    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    /// Drop the current session without routing through an exit sequence.
    pub fn cancel(&mut self) {
        if let Some(session) = self.session.take() {
            log::debug!("playback cancelled: {}", session.animation);
        }
        self.exit_requested = false;
    }

    /// True once the session behind `handle` is no longer live.
    #[inline]
    pub fn finished(&self, handle: PlaybackHandle) -> bool {
        self.epoch_finished(handle.epoch)
    }

    #[inline]
    pub(crate) fn epoch_finished(&self, epoch: PlaybackEpoch) -> bool {
        self.session.as_ref().map_or(true, |s| s.epoch != epoch)
    }

    #[inline]
    pub fn current_animation(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.animation.as_str())
    }

    /// Index the playhead is parked on, if a session is live.
    #[inline]
    pub fn current_frame_index(&self) -> Option<usize> {
        self.session.as_ref().map(|s| s.frame_index)
    }

    /// Frame-timer continuation. Stale epochs drop silently; this is clean
    /// cancellation, never an error.
    pub fn on_frame_timer(
        &mut self,
        epoch: PlaybackEpoch,
        data: &AgentData,
        scheduler: &mut Scheduler,
        outputs: &mut Outputs,
        rng: &mut dyn RandomSource,
    ) {
        if self.epoch_finished(epoch) {
            log::trace!("frame timer for stale epoch {} dropped", epoch.0);
            return;
        }
        self.step(data, scheduler, outputs, rng);
    }

    /// One frame boundary: select the next index, render the live frame,
    /// emit the terminal state when the final index is reached, and arm the
    /// next timer from the live frame's duration.
    fn step(
        &mut self,
        data: &AgentData,
        scheduler: &mut Scheduler,
        outputs: &mut Outputs,
        rng: &mut dyn RandomSource,
    ) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(animation) = data.animations.get(&session.animation) else {
            // Data set swapped under a live session; nothing sensible to render.
            self.session = None;
            return;
        };
        let Some(last) = animation.frames.len().checked_sub(1) else {
            self.session = None;
            return;
        };
        let starting = session.data_index.is_none();
        let next = next_frame_index(session, animation, self.exit_requested, rng);
        let new_index = next.min(last);
        let frame_changed = starting || session.frame_index != new_index;
        session.frame_index = new_index;
        let at_last = new_index == last;
        // Hold the previous frame's data through the wait state.
        if !(at_last && animation.use_exit_branching) || session.data_index.is_none() {
            session.data_index = Some(new_index);
        }

        if starting {
            outputs.push_event(AgentEvent::PlaybackStarted {
                animation: session.animation.clone(),
            });
        }

        let mut delay = self.default_frame_duration;
        if let Some(live) = session.data_index {
            let frame = &animation.frames[live];
            for layer in 0..data.overlay_count {
                match frame.images.get(layer as usize) {
                    Some(&[x, y]) => {
                        outputs.push_effect(Effect::LayerOffset { layer, x, y });
                        outputs.push_effect(Effect::LayerVisible {
                            layer,
                            visible: true,
                        });
                    }
                    None => outputs.push_effect(Effect::LayerVisible {
                        layer,
                        visible: false,
                    }),
                }
            }
            if let Some(key) = &frame.sound {
                if self.sounds.contains_key(key) {
                    outputs.push_effect(Effect::Sound { key: key.clone() });
                }
            }
            if frame.duration > 0 {
                delay = frame.duration;
            }
        }

        let epoch = session.epoch;
        if at_last {
            if animation.use_exit_branching && !self.exit_requested {
                if frame_changed {
                    outputs.push_event(AgentEvent::PlaybackState {
                        animation: session.animation.clone(),
                        state: SessionState::Waiting,
                    });
                }
            } else {
                let name = session.animation.clone();
                outputs.push_event(AgentEvent::PlaybackState {
                    animation: name.clone(),
                    state: SessionState::Exited,
                });
                log::debug!("playback exited: {name}");
                self.session = None;
                self.exit_requested = false;
                return;
            }
        }
        // A zero delay would respin within the same drain.
        scheduler.schedule_after(delay.max(1), Wakeup::FrameStep { epoch });
    }
}

/// Next-frame selection, evaluated once per frame boundary:
/// exit branch first, then the weighted table, then sequential advance.
fn next_frame_index(
    session: &PlaybackSession,
    animation: &AnimationDefinition,
    exit_requested: bool,
    rng: &mut dyn RandomSource,
) -> usize {
    let Some(live) = session.data_index else {
        return 0;
    };
    let frame = &animation.frames[live];
    if exit_requested {
        if let Some(exit) = frame.exit_branch {
            return exit;
        }
    }
    if let Some(branching) = &frame.branching {
        let mut draw = rng.percent();
        for branch in &branching.branches {
            if draw <= branch.weight {
                return branch.frame_index;
            }
            draw -= branch.weight;
        }
        // Underweighted table: fall through to sequential advance.
    }
    session.frame_index + 1
}
