//! # kitchen_env
//!
//! Multi-subtask kitchen manipulation environment. A point end-effector
//! under velocity control operates seven appliances (microwave, kettle,
//! light switch, slide cabinet, hinge cabinet, two burner knobs), each
//! modeled as a scalar joint with a handle site. Holding the end-effector
//! at a handle drives that joint toward its target; a selected subtask
//! pays a one-time completion bonus when the joint first enters its
//! target band, and the episode terminates once every selected subtask is
//! complete.
//!
//! ## Features
//!
//! - Vectorized instances with flat SoA state
//! - Configurable subtask selection (`tasks_to_complete`)
//! - Sparse first-completion rewards with per-appliance latching
//! - Deterministic per-instance reset streams
//! - [`goal_rl::GoalEnv`] adapter with joint-value goal vectors
//!
//! ## Example
//!
//! ```rust,ignore
//! use kitchen_env::{KitchenConfig, KitchenTask};
//!
//! let mut env = KitchenConfig::microwave(8).with_seed(42).build()?;
//! env.step_all(&actions);
//! let opened = env.last_successes()[0];
//! ```

// Core modules
pub mod config;
pub mod constants;
pub mod state;

// Scene dynamics
pub mod actuation;
pub mod observation;
pub mod rng;

// Environment and integration
pub mod adapter;
pub mod env;

// Comprehensive test suite
#[cfg(test)]
pub mod tests;

// Re-export main types
pub use config::{KitchenConfig, KitchenTask};
pub use constants::{
    ApplianceSpec, APPLIANCES, ARM_HOME, DEFAULT_HORIZON, HANDLE_RADIUS, NUM_APPLIANCES,
    WORKSPACE_MAX, WORKSPACE_MIN,
};
pub use env::KitchenEnv;
pub use observation::OBSERVATION_SIZE;
pub use rng::XorShiftRng;
pub use state::KitchenState;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
