//! Mascot Agent Core (host-agnostic)
//!
//! Sprite-frame animation state machine, strictly-ordered action sequencer,
//! and idle-loop scheduler for an animated on-screen character. Hosts drive
//! [`Agent::update`] from their event loop at whatever cadence they like and
//! apply the returned [`Outputs`] through the [`Renderer`]/[`AudioSink`]
//! contracts; how frames are painted, audio is decoded, or assets are
//! fetched is entirely the host's business.
//!
//! Everything runs on one logical thread: suspension is a continuation armed
//! on the timer wheel, and cancellation is a cooperative epoch/token check at
//! the start of every continuation.

pub mod agent;
pub mod animator;
pub mod config;
pub mod data;
pub mod epoch;
pub mod error;
mod idle;
pub mod outputs;
pub mod rng;
pub mod scheduler;
pub mod sequencer;
pub mod stored_agent;
pub mod task;
pub mod tasks;

// Re-exports for consumers (hosts)
pub use agent::Agent;
pub use animator::{Animator, PlaybackHandle, SoundMap};
pub use config::Config;
pub use data::{AgentData, AnimationDefinition, Branch, Branching, Frame};
pub use epoch::{IdleToken, PlaybackEpoch, QueueGeneration};
pub use error::AgentError;
pub use outputs::{AgentEvent, AudioSink, Effect, Outputs, Renderer, SessionState};
pub use rng::{EntropyRandom, RandomSource};
pub use scheduler::{Scheduler, Wakeup};
pub use sequencer::Sequencer;
pub use stored_agent::parse_agent_json;
pub use task::{Task, TaskContext, TaskPoll};
pub use tasks::{DelayTask, PlayAnimationTask};
