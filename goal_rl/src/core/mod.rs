//! Shared building blocks used across algorithms and runners.

pub mod episode_state;
pub mod policy_slot;
pub mod running_stats;
pub mod target_network;

pub use episode_state::{EpisodeOutcome, EpisodeTracker, FinishedEpisode};
pub use policy_slot::{policy_slot, policy_slot_with, PolicySlot, SharedPolicySlot};
pub use running_stats::RunningScalarStats;
pub use target_network::{
    hard_copy, soft_update, TargetNetworkConfig, TargetNetworkManager,
};
