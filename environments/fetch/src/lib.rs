//! Tabletop Manipulation Tasks for Goal-Conditioned RL
//!
//! Kinematic models of three gripper tasks (reach, pick-and-place, slide)
//! exposing the goal_rl training interface. These are deliberately not a
//! physics simulation: the gripper is a point under first-order velocity
//! control and the object follows two coupling rules, a grasp rule and a
//! push rule, which is enough structure for sparse-reward goal reaching
//! with hindsight relabeling.
//!
//! # Features
//!
//! - **Vectorized**: one instance simulates `n_envs` parallel task copies
//!   on flat SoA state arrays
//! - **Goal-conditioned**: achieved/desired goal channels plus a detached
//!   reward handle for relabeling
//! - **Composable rewards**: sparse, dense and shaped stacks built from
//!   compile-time reward term tuples
//! - **Deterministic**: per-instance xorshift RNG streams derived from one
//!   seed, optional Gaussian observation noise
//! - **Traceable**: `RenderMode::Trace` records gripper/object/goal paths
//!   for plotting
//!
//! # Example
//!
//! ```rust,ignore
//! use fetch_env::{FetchConfig, FetchTask, RenderMode};
//! use goal_rl::GoalEnv;
//!
//! let mut env = FetchConfig::new(FetchTask::PickAndPlace, 8)
//!     .with_seed(42)
//!     .with_render_mode(RenderMode::Trace)
//!     .build()
//!     .unwrap();
//!
//! let actions = vec![0.0f32; 8 * 4];
//! let result = env.step(&actions);
//!
//! let mut obs = vec![0.0f32; 8 * env.obs_size()];
//! env.write_observations(&mut obs);
//! assert_eq!(result.rewards.len(), 8);
//! ```

// Core modules
pub mod config;
pub mod constants;
pub mod state;

// Task dynamics
pub mod kinematics;
pub mod noise;
pub mod observation;
pub mod reward;
pub mod termination;

// Environment and integration
pub mod adapter;
pub mod env;
pub mod trace;

// Comprehensive test suite
#[cfg(test)]
pub mod tests;

// Re-exports for convenience
pub use config::{FetchConfig, FetchTask, RenderMode, RewardVariant};
pub use constants::{
    ACTION_POS_SCALE, DEFAULT_HORIZON, DISTANCE_THRESHOLD, GRIPPER_HOME, MIN_GOAL_DISTANCE,
    OBJECT_REST_HEIGHT, TABLE_HEIGHT, WORKSPACE_MAX, WORKSPACE_MIN,
};
pub use env::FetchEnv;
pub use noise::{NoiseConfig, XorShiftRng};
pub use state::FetchState;
pub use trace::TrajectoryTrace;

// Re-export reward types for easy access
pub use reward::components::{
    ActionEnergyPenalty, DenseDistanceReward, GoalDistanceReward, LiftBonus, ProgressBonus,
};
pub use reward::{presets, RewardTerm};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
