//! Action sequencer: opaque tasks execute one at a time in enqueue order,
//! advancing only on task completion.
//!
//! `clear()` tears the active pipeline down by ownership: the in-flight task
//! and the buffer are dropped, so no continuation or buffered work can leak
//! into the post-clear state. Each clear bumps the generation counter
//! observed in the `QueueCleared` event.

use std::collections::VecDeque;

use crate::epoch::QueueGeneration;
use crate::outputs::{AgentEvent, Outputs};
use crate::task::{Task, TaskContext, TaskPoll};

/// Result of one sequencer tick.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct QueueTick {
    /// The pending count transitioned to zero after a completion this tick.
    pub became_empty: bool,
}

pub struct Sequencer {
    current: Option<Box<dyn Task>>,
    buffered: VecDeque<Box<dyn Task>>,
    pending: usize,
    generation: QueueGeneration,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sequencer {
    pub fn new() -> Self {
        Self {
            current: None,
            buffered: VecDeque::new(),
            pending: 0,
            generation: QueueGeneration(0),
        }
    }

    /// Append a task to the execution pipeline. It becomes current at once
    /// when nothing is executing; otherwise it waits for its predecessors.
    pub fn enqueue(&mut self, task: Box<dyn Task>) {
        self.pending += 1;
        if self.current.is_none() && self.buffered.is_empty() {
            self.current = Some(task);
        } else {
            self.buffered.push_back(task);
        }
    }

    /// Abort everything and re-arm a fresh pipeline for future enqueues.
    /// Returns the new generation; emits no completion or empty events.
    pub fn clear(&mut self) -> QueueGeneration {
        self.current = None;
        self.buffered.clear();
        self.pending = 0;
        self.generation = self.generation.bump();
        log::debug!("queue cleared (generation {})", self.generation.0);
        self.generation
    }

    /// Poll the current task; on completion keep advancing through the
    /// buffer until a task reports `Pending` or the pipeline drains.
    pub(crate) fn tick(&mut self, ctx: &mut TaskContext<'_>) -> QueueTick {
        let mut result = QueueTick::default();
        loop {
            let Some(task) = self.current.as_mut() else {
                match self.buffered.pop_front() {
                    Some(next) => {
                        self.current = Some(next);
                        continue;
                    }
                    None => break,
                }
            };
            match task.poll(ctx) {
                TaskPoll::Pending => break,
                TaskPoll::Complete => {
                    self.current = None;
                    result.became_empty |= self.settle_completion(ctx.outputs);
                }
                TaskPoll::Failed(err) => {
                    // Failures are isolated per task; the pipeline survives.
                    log::warn!("queued task failed: {err}");
                    ctx.outputs.push_event(AgentEvent::TaskFailed {
                        reason: err.to_string(),
                    });
                    self.current = None;
                    result.became_empty |= self.settle_completion(ctx.outputs);
                }
            }
        }
        result
    }

    /// Decrement with a floor of zero; the empty check still fires whenever
    /// the floored count lands on zero, guarding double-counting bugs.
    fn settle_completion(&mut self, outputs: &mut Outputs) -> bool {
        self.pending = self.pending.saturating_sub(1);
        if self.pending == 0 {
            outputs.push_event(AgentEvent::QueueEmptied);
            true
        } else {
            false
        }
    }

    /// Tasks enqueued but not yet completed.
    #[inline]
    pub fn pending(&self) -> usize {
        self.pending
    }

    #[inline]
    pub fn generation(&self) -> QueueGeneration {
        self.generation
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.current.is_none() && self.buffered.is_empty()
    }
}
