//! Engine facade: owns the agent's data set and subsystems and executes all
//! state mutation on a single logical thread of scheduled continuations.
//!
//! Hosts call the public operations between ticks and drive [`Agent::update`]
//! from their event loop; effects and events surface only through the
//! returned [`Outputs`]. Nothing here blocks; suspension is always a
//! continuation armed on the timer wheel.

use std::mem;

use crate::animator::{Animator, PlaybackHandle, SoundMap};
use crate::config::Config;
use crate::data::AgentData;
use crate::epoch::QueueGeneration;
use crate::idle::IdleLoop;
use crate::outputs::{AgentEvent, Outputs};
use crate::rng::{EntropyRandom, RandomSource};
use crate::scheduler::{Scheduler, Wakeup};
use crate::sequencer::Sequencer;
use crate::task::{Task, TaskContext};

pub struct Agent {
    config: Config,
    data: AgentData,
    animator: Animator,
    sequencer: Sequencer,
    idle: IdleLoop,
    scheduler: Scheduler,
    outputs: Outputs,
    /// Events produced by operations between ticks; drained into the next
    /// update's outputs so they are never wiped by `Outputs::clear`.
    queued_events: Vec<AgentEvent>,
    rng: Box<dyn RandomSource>,
    visible: bool,
}

impl Agent {
    /// Create an agent over a validated data set. Entities start hidden.
    pub fn new(config: Config, data: AgentData, sounds: SoundMap) -> Self {
        Self::with_random(config, data, sounds, Box::new(EntropyRandom::new()))
    }

    /// Like [`Agent::new`] with an explicit random source, for deterministic
    /// tests and replays.
    pub fn with_random(
        config: Config,
        data: AgentData,
        sounds: SoundMap,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        let animator = Animator::new(config.default_frame_duration, sounds);
        Self {
            config,
            data,
            animator,
            sequencer: Sequencer::new(),
            idle: IdleLoop::new(),
            scheduler: Scheduler::new(),
            outputs: Outputs::default(),
            queued_events: Vec::new(),
            rng,
            visible: false,
        }
    }

    /// Advance the tick clock by `dt`, dispatch due continuations, then poll
    /// the task pipeline. Returns this tick's effects and events.
    pub fn update(&mut self, dt: u64) -> &Outputs {
        self.outputs.clear();
        for event in mem::take(&mut self.queued_events) {
            self.outputs.push_event(event);
        }
        self.scheduler.advance(dt);
        while let Some(wakeup) = self.scheduler.pop_due() {
            self.dispatch(wakeup);
        }
        self.tick_queue();
        &self.outputs
    }

    /// Append a task to the pipeline. The idle loop is silenced before
    /// anything else; the task is first polled on the next update.
    pub fn enqueue(&mut self, task: Box<dyn Task>) {
        self.idle.invalidate(&mut self.animator);
        self.sequencer.enqueue(task);
    }

    /// Abort the in-flight task and the buffer; a fresh pipeline observes
    /// future enqueues. `QueueCleared` surfaces on the next update.
    pub fn clear_queue(&mut self) {
        let generation = self.sequencer.clear();
        self.queued_events
            .push(AgentEvent::QueueCleared { generation });
    }

    /// Start `name` outside the queue. Unknown names return an
    /// already-finished handle without touching the idle loop. The first
    /// frame renders on the next update.
    pub fn play_animation(&mut self, name: &str) -> PlaybackHandle {
        if !self.data.has_animation(name) {
            return self.animator.begin(&self.data, name);
        }
        self.idle.invalidate(&mut self.animator);
        let handle = self.animator.begin(&self.data, name);
        self.scheduler.schedule_after(
            0,
            Wakeup::FrameStep {
                epoch: handle.epoch,
            },
        );
        handle
    }

    /// Request an exit of the active animation at its next frame boundary.
    pub fn exit_animation(&mut self) {
        self.animator.request_exit();
    }

    /// Ask only the active animation to exit; queued work is untouched.
    pub fn stop_current(&mut self) {
        self.animator.request_exit();
    }

    /// Clear the queue and ask the active animation to exit gracefully.
    pub fn stop(&mut self) {
        self.clear_queue();
        self.animator.request_exit();
    }

    /// Show or hide the entity. Hiding silences the idle loop before
    /// anything else; showing with an empty pipeline starts it.
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible == visible {
            return;
        }
        self.visible = visible;
        if visible {
            if self.sequencer.pending() == 0 {
                self.scheduler.schedule_after(
                    0,
                    Wakeup::IdleStep {
                        token: self.idle.token(),
                    },
                );
            }
        } else {
            self.idle.invalidate(&mut self.animator);
        }
    }

    /// Swap the animation set and sound map. Outstanding frame timers from
    /// the previous set are stranded by the lifecycle epoch bump; queued
    /// tasks stay queued (absent names degrade to no-ops).
    pub fn reinitialize(&mut self, data: AgentData, sounds: SoundMap) {
        self.idle.invalidate(&mut self.animator);
        self.animator.reinitialize(sounds);
        self.data = data;
    }

    // ---- pure lookups -----------------------------------------------------

    /// Animation names in sorted order.
    pub fn animations(&self) -> Vec<String> {
        self.data.animation_names()
    }

    #[inline]
    pub fn has_animation(&self, name: &str) -> bool {
        self.data.has_animation(name)
    }

    /// True once the session behind `handle` is no longer live.
    #[inline]
    pub fn playback_finished(&self, handle: PlaybackHandle) -> bool {
        self.animator.finished(handle)
    }

    #[inline]
    pub fn current_animation(&self) -> Option<&str> {
        self.animator.current_animation()
    }

    #[inline]
    pub fn current_frame_index(&self) -> Option<usize> {
        self.animator.current_frame_index()
    }

    #[inline]
    pub fn pending_tasks(&self) -> usize {
        self.sequencer.pending()
    }

    #[inline]
    pub fn queue_generation(&self) -> QueueGeneration {
        self.sequencer.generation()
    }

    #[inline]
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Current tick clock.
    #[inline]
    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    #[inline]
    pub fn data(&self) -> &AgentData {
        &self.data
    }

    // ---- internal dispatch ------------------------------------------------

    fn dispatch(&mut self, wakeup: Wakeup) {
        match wakeup {
            Wakeup::FrameStep { epoch } => {
                self.animator.on_frame_timer(
                    epoch,
                    &self.data,
                    &mut self.scheduler,
                    &mut self.outputs,
                    self.rng.as_mut(),
                );
                self.reconcile_idle();
            }
            Wakeup::IdleStep { token } => {
                if token != self.idle.token() {
                    log::trace!("idle wakeup for stale token dropped");
                    return;
                }
                if !self.visible || self.sequencer.pending() > 0 {
                    return;
                }
                self.idle_step();
            }
        }
    }

    fn tick_queue(&mut self) {
        let tick = {
            let mut ctx = TaskContext {
                data: &self.data,
                animator: &mut self.animator,
                scheduler: &mut self.scheduler,
                outputs: &mut self.outputs,
                rng: self.rng.as_mut(),
            };
            self.sequencer.tick(&mut ctx)
        };
        if tick.became_empty && self.visible {
            self.idle_step();
        }
    }

    fn idle_step(&mut self) {
        self.idle.step(
            &self.data,
            &self.config,
            &mut self.animator,
            &mut self.scheduler,
            &mut self.outputs,
            self.rng.as_mut(),
        );
        self.reconcile_idle();
    }

    /// Arm the next idle step once an idle-owned session has exited.
    fn reconcile_idle(&mut self) {
        let Some(epoch) = self.idle.session_epoch() else {
            return;
        };
        if self.animator.epoch_finished(epoch) {
            self.idle.clear_session();
            if self.visible {
                self.scheduler.schedule_after(
                    self.config.idle_restart_delay.max(1),
                    Wakeup::IdleStep {
                        token: self.idle.token(),
                    },
                );
            }
        }
    }
}
