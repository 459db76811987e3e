//! Idle-loop scheduler: ambient animations play whenever nothing is queued,
//! yielding instantly to any newly queued work.

use crate::animator::Animator;
use crate::config::Config;
use crate::data::AgentData;
use crate::epoch::{IdleToken, PlaybackEpoch};
use crate::outputs::Outputs;
use crate::rng::RandomSource;
use crate::scheduler::Scheduler;

#[derive(Debug)]
pub(crate) struct IdleLoop {
    token: IdleToken,
    session: Option<PlaybackEpoch>,
}

impl IdleLoop {
    pub fn new() -> Self {
        Self {
            token: IdleToken(0),
            session: None,
        }
    }

    #[inline]
    pub fn token(&self) -> IdleToken {
        self.token
    }

    /// Epoch of the idle-owned playback session, if one was started.
    #[inline]
    pub fn session_epoch(&self) -> Option<PlaybackEpoch> {
        self.session
    }

    #[inline]
    pub fn clear_session(&mut self) {
        self.session = None;
    }

    /// Invalidate the loop before any new work starts: bump the token so
    /// armed re-entries go stale, and cancel the idle-owned session so no
    /// idle frame renders after this instant.
    pub fn invalidate(&mut self, animator: &mut Animator) {
        self.token = self.token.bump();
        if let Some(epoch) = self.session.take() {
            if !animator.epoch_finished(epoch) {
                log::debug!("idle loop interrupted");
                animator.cancel();
            }
        }
    }

    /// Play one idle animation, chosen uniformly among the names carrying
    /// the idle prefix. Does nothing when no candidate exists.
    pub fn step(
        &mut self,
        data: &AgentData,
        config: &Config,
        animator: &mut Animator,
        scheduler: &mut Scheduler,
        outputs: &mut Outputs,
        rng: &mut dyn RandomSource,
    ) {
        let mut candidates: Vec<&str> = data
            .animations
            .keys()
            .filter(|name| name.starts_with(&config.idle_prefix))
            .map(String::as_str)
            .collect();
        if candidates.is_empty() {
            log::debug!("no idle animations in the data set");
            self.session = None;
            return;
        }
        // Stable pick order for a given random sequence.
        candidates.sort_unstable();
        let name = candidates[rng.index(candidates.len())];
        let handle = animator.play(data, name, scheduler, outputs, rng);
        self.session = Some(handle.epoch);
    }
}
