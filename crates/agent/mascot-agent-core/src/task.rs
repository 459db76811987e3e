//! Queued-task contract: opaque units of work polled cooperatively by the
//! action sequencer.

use crate::animator::{Animator, PlaybackHandle};
use crate::data::AgentData;
use crate::error::AgentError;
use crate::outputs::Outputs;
use crate::rng::RandomSource;
use crate::scheduler::Scheduler;

/// Progress of a queued task at one poll.
#[derive(Debug)]
pub enum TaskPoll {
    /// Still working; polled again next tick.
    Pending,
    Complete,
    Failed(AgentError),
}

/// An opaque unit of queued work.
///
/// The sequencer polls the current task once per engine tick and never
/// inspects its internals. Intermediate `Pending` polls do not advance the
/// queue; only `Complete`/`Failed` does. Tasks must tolerate being polled
/// after they could have completed earlier in the same tick.
pub trait Task {
    fn poll(&mut self, ctx: &mut TaskContext<'_>) -> TaskPoll;
}

/// Capabilities handed to the current task while it executes.
pub struct TaskContext<'a> {
    pub(crate) data: &'a AgentData,
    pub(crate) animator: &'a mut Animator,
    pub(crate) scheduler: &'a mut Scheduler,
    pub(crate) outputs: &'a mut Outputs,
    pub(crate) rng: &'a mut dyn RandomSource,
}

impl TaskContext<'_> {
    /// Current tick clock.
    #[inline]
    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    #[inline]
    pub fn has_animation(&self, name: &str) -> bool {
        self.data.has_animation(name)
    }

    /// Start a playback session and render its first frame this tick.
    /// Unknown names yield an already-finished handle (no frames, no error).
    pub fn play_animation(&mut self, name: &str) -> PlaybackHandle {
        self.animator
            .play(self.data, name, self.scheduler, self.outputs, self.rng)
    }

    /// Request an exit of the active session at its next frame boundary.
    pub fn exit_animation(&mut self) {
        self.animator.request_exit();
    }

    /// True once the session behind `handle` is no longer live.
    pub fn playback_finished(&self, handle: PlaybackHandle) -> bool {
        self.animator.finished(handle)
    }
}
