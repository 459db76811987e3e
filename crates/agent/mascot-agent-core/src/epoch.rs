//! Epoch-style counters used to invalidate stale continuations cooperatively.
//!
//! Every scheduled continuation captures the counter value current when it was
//! armed; the value is compared at dispatch and stale work drops silently.

use serde::{Deserialize, Serialize};

/// Identity of one playback session. Starting a new session bumps the epoch,
/// stranding every frame timer armed under an older one.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct PlaybackEpoch(pub u64);

/// Identity of one run of the idle loop. Bumped before any new work starts.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct IdleToken(pub u64);

/// Identity of one sequencer pipeline. Bumped by `clear()`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct QueueGeneration(pub u64);

impl PlaybackEpoch {
    #[inline]
    pub fn bump(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl IdleToken {
    #[inline]
    pub fn bump(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl QueueGeneration {
    #[inline]
    pub fn bump(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}
