//! Reference implementations of the queued-task contract.

use crate::animator::PlaybackHandle;
use crate::task::{Task, TaskContext, TaskPoll};

/// Plays a named animation to completion.
///
/// With an exit timeout the task requests `exit_animation` once if the
/// animation is still running after the given ticks; wait-state animations
/// need that nudge to ever finish.
pub struct PlayAnimationTask {
    name: String,
    exit_after: Option<u64>,
    started: Option<Started>,
}

struct Started {
    handle: PlaybackHandle,
    deadline: Option<u64>,
    exit_sent: bool,
}

impl PlayAnimationTask {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exit_after: None,
            started: None,
        }
    }

    /// Request an exit if the animation is still running `ticks` after it
    /// started.
    pub fn with_exit_after(mut self, ticks: u64) -> Self {
        self.exit_after = Some(ticks);
        self
    }
}

impl Task for PlayAnimationTask {
    fn poll(&mut self, ctx: &mut TaskContext<'_>) -> TaskPoll {
        if self.started.is_none() {
            let handle = ctx.play_animation(&self.name);
            let deadline = self.exit_after.map(|ticks| ctx.now() + ticks);
            self.started = Some(Started {
                handle,
                deadline,
                exit_sent: false,
            });
        }
        let Some(started) = self.started.as_mut() else {
            return TaskPoll::Pending;
        };
        // An unknown animation name resolves as finished right away.
        if ctx.playback_finished(started.handle) {
            return TaskPoll::Complete;
        }
        if let Some(deadline) = started.deadline {
            if !started.exit_sent && ctx.now() >= deadline {
                started.exit_sent = true;
                ctx.exit_animation();
            }
        }
        TaskPoll::Pending
    }
}

/// Holds the queue for a fixed number of ticks.
pub struct DelayTask {
    ticks: u64,
    deadline: Option<u64>,
}

impl DelayTask {
    pub fn new(ticks: u64) -> Self {
        Self {
            ticks,
            deadline: None,
        }
    }
}

impl Task for DelayTask {
    fn poll(&mut self, ctx: &mut TaskContext<'_>) -> TaskPoll {
        let now = ctx.now();
        let deadline = *self.deadline.get_or_insert(now + self.ticks);
        if now >= deadline {
            TaskPoll::Complete
        } else {
            TaskPoll::Pending
        }
    }
}
