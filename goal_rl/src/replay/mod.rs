//! Episode storage and hindsight experience replay.

pub mod her_buffer;
pub mod transition;

pub use her_buffer::{GoalSelectionStrategy, HerConfig, HerReplayBuffer};
pub use transition::{GoalBatch, GoalEpisode, GoalTransition};
