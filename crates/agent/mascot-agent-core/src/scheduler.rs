//! Trampolined timer wheel: continuations are armed as data and dispatched
//! when the tick clock passes their due time.
//!
//! Continuations never nest; a dispatch that wants to continue later arms a
//! fresh entry, so stack depth stays bounded regardless of chain length.
//! Epoch/token staleness is checked at dispatch, never at scheduling.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::epoch::{IdleToken, PlaybackEpoch};

/// A scheduled continuation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Wakeup {
    /// Advance the playback session started under `epoch`.
    FrameStep { epoch: PlaybackEpoch },

    /// Re-enter the idle loop if `token` is still current.
    IdleStep { token: IdleToken },
}

#[derive(Debug, Eq, PartialEq)]
struct Entry {
    due: u64,
    seq: u64,
    wakeup: Wakeup,
}

// Entries with equal due times dispatch in scheduling order.
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Monotonic tick clock plus pending wakeups.
#[derive(Debug, Default)]
pub struct Scheduler {
    now: u64,
    seq: u64,
    wheel: BinaryHeap<Reverse<Entry>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current tick clock.
    #[inline]
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Arm `wakeup` to fire `delay` ticks from now.
    pub fn schedule_after(&mut self, delay: u64, wakeup: Wakeup) {
        let entry = Entry {
            due: self.now.saturating_add(delay),
            seq: self.seq,
            wakeup,
        };
        self.seq += 1;
        self.wheel.push(Reverse(entry));
    }

    /// Advance the clock by `dt` ticks. Due entries drain via [`pop_due`].
    ///
    /// [`pop_due`]: Scheduler::pop_due
    #[inline]
    pub fn advance(&mut self, dt: u64) {
        self.now = self.now.saturating_add(dt);
    }

    /// Next due wakeup in `(due, seq)` order, if any. Entries armed during a
    /// drain with a due time inside the already-elapsed window are returned
    /// by the same drain.
    pub fn pop_due(&mut self) -> Option<Wakeup> {
        match self.wheel.peek() {
            Some(Reverse(entry)) if entry.due <= self.now => {
                self.wheel.pop().map(|Reverse(entry)| entry.wakeup)
            }
            _ => None,
        }
    }

    /// Number of armed (possibly stale) entries.
    #[inline]
    pub fn pending(&self) -> usize {
        self.wheel.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(epoch: u64) -> Wakeup {
        Wakeup::FrameStep {
            epoch: PlaybackEpoch(epoch),
        }
    }

    #[test]
    fn dispatch_order_is_due_then_seq() {
        let mut sched = Scheduler::new();
        sched.schedule_after(200, frame(0));
        sched.schedule_after(100, frame(1));
        sched.schedule_after(100, frame(2));

        sched.advance(250);
        assert_eq!(sched.pop_due(), Some(frame(1)));
        assert_eq!(sched.pop_due(), Some(frame(2)));
        assert_eq!(sched.pop_due(), Some(frame(0)));
        assert_eq!(sched.pop_due(), None);
    }

    #[test]
    fn entries_are_held_until_due() {
        let mut sched = Scheduler::new();
        sched.schedule_after(100, frame(0));
        sched.advance(99);
        assert_eq!(sched.pop_due(), None);
        sched.advance(1);
        assert_eq!(sched.pop_due(), Some(frame(0)));
    }

    #[test]
    fn entries_armed_inside_the_elapsed_window_fire_in_the_same_drain() {
        let mut sched = Scheduler::new();
        sched.schedule_after(100, frame(0));
        sched.advance(300);

        assert_eq!(sched.pop_due(), Some(frame(0)));
        // A continuation armed mid-drain whose due time has already passed.
        sched.schedule_after(100, frame(1));
        assert_eq!(sched.pop_due(), Some(frame(1)));
        sched.schedule_after(100, frame(2));
        assert_eq!(sched.pop_due(), Some(frame(2)));
        // The next link lands past the window and waits.
        sched.schedule_after(100, frame(3));
        assert_eq!(sched.pop_due(), None);
        assert_eq!(sched.pending(), 1);
    }
}
