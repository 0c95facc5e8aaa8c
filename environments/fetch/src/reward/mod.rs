//! Reward terms with compile-time composition.
//!
//! Individual reward and penalty terms implement [`RewardTerm`] and compose
//! through tuples, so a task's reward stack is a concrete type with no
//! vtable in the step loop:
//!
//! ```ignore
//! use fetch_env::reward::*;
//!
//! let reward = (
//!     DenseDistanceReward { weight: 1.0 },
//!     LiftBonus { weight: 0.1 },
//!     ActionEnergyPenalty { weight: 0.01 },
//! );
//! ```
//!
//! Each term also reports its own contribution through
//! [`RewardTerm::write_breakdown`], which drivers use to log shaping terms
//! separately from the total.
//!
//! # Built-in Terms
//!
//! - [`GoalDistanceReward`] - Sparse -1/0 on the goal distance threshold
//! - [`DenseDistanceReward`] - Negative Euclidean goal distance
//! - [`LiftBonus`] - Rewards object height above the table
//! - [`ActionEnergyPenalty`] - Penalizes squared action magnitude
//! - [`ProgressBonus`] - Rewards per-step reduction in goal distance

pub mod components;
pub mod presets;

pub use components::*;
pub use presets::*;

use crate::state::FetchState;

/// A reward term computed per environment from the post-step state.
///
/// Terms compose via tuple implementations; the tuple's reward is the sum
/// of its elements.
pub trait RewardTerm: Clone + Send + Sync {
    /// Short name used when logging per-term breakdowns.
    const NAME: &'static str;

    /// Reward contribution for environment `idx`.
    fn compute(&self, state: &FetchState, idx: usize) -> f32;

    /// Append `(name, value)` pairs for this term to `out`.
    ///
    /// Leaf terms push one entry; tuples recurse so the breakdown lists
    /// every component of the stack in order.
    fn write_breakdown(&self, state: &FetchState, idx: usize, out: &mut Vec<(&'static str, f32)>) {
        out.push((Self::NAME, self.compute(state, idx)));
    }
}

// ============================================================================
// Tuple Implementations
// ============================================================================

/// Empty stack, base case.
impl RewardTerm for () {
    const NAME: &'static str = "Empty";

    #[inline(always)]
    fn compute(&self, _state: &FetchState, _idx: usize) -> f32 {
        0.0
    }

    fn write_breakdown(&self, _state: &FetchState, _idx: usize, _out: &mut Vec<(&'static str, f32)>) {}
}

/// 2-term stack.
impl<A: RewardTerm, B: RewardTerm> RewardTerm for (A, B) {
    const NAME: &'static str = "Composed2";

    #[inline(always)]
    fn compute(&self, state: &FetchState, idx: usize) -> f32 {
        self.0.compute(state, idx) + self.1.compute(state, idx)
    }

    fn write_breakdown(&self, state: &FetchState, idx: usize, out: &mut Vec<(&'static str, f32)>) {
        self.0.write_breakdown(state, idx, out);
        self.1.write_breakdown(state, idx, out);
    }
}

/// 3-term stack.
impl<A: RewardTerm, B: RewardTerm, C: RewardTerm> RewardTerm for (A, B, C) {
    const NAME: &'static str = "Composed3";

    #[inline(always)]
    fn compute(&self, state: &FetchState, idx: usize) -> f32 {
        self.0.compute(state, idx) + self.1.compute(state, idx) + self.2.compute(state, idx)
    }

    fn write_breakdown(&self, state: &FetchState, idx: usize, out: &mut Vec<(&'static str, f32)>) {
        self.0.write_breakdown(state, idx, out);
        self.1.write_breakdown(state, idx, out);
        self.2.write_breakdown(state, idx, out);
    }
}

/// 4-term stack (covers the shaped preset).
impl<A: RewardTerm, B: RewardTerm, C: RewardTerm, D: RewardTerm> RewardTerm for (A, B, C, D) {
    const NAME: &'static str = "Composed4";

    #[inline(always)]
    fn compute(&self, state: &FetchState, idx: usize) -> f32 {
        self.0.compute(state, idx)
            + self.1.compute(state, idx)
            + self.2.compute(state, idx)
            + self.3.compute(state, idx)
    }

    fn write_breakdown(&self, state: &FetchState, idx: usize, out: &mut Vec<(&'static str, f32)>) {
        self.0.write_breakdown(state, idx, out);
        self.1.write_breakdown(state, idx, out);
        self.2.write_breakdown(state, idx, out);
        self.3.write_breakdown(state, idx, out);
    }
}

/// 5-term stack.
impl<A: RewardTerm, B: RewardTerm, C: RewardTerm, D: RewardTerm, E: RewardTerm> RewardTerm
    for (A, B, C, D, E)
{
    const NAME: &'static str = "Composed5";

    #[inline(always)]
    fn compute(&self, state: &FetchState, idx: usize) -> f32 {
        self.0.compute(state, idx)
            + self.1.compute(state, idx)
            + self.2.compute(state, idx)
            + self.3.compute(state, idx)
            + self.4.compute(state, idx)
    }

    fn write_breakdown(&self, state: &FetchState, idx: usize, out: &mut Vec<(&'static str, f32)>) {
        self.0.write_breakdown(state, idx, out);
        self.1.write_breakdown(state, idx, out);
        self.2.write_breakdown(state, idx, out);
        self.3.write_breakdown(state, idx, out);
        self.4.write_breakdown(state, idx, out);
    }
}

// ============================================================================
// Reward Computation Functions
// ============================================================================

/// Compute rewards for all environments into `output`.
pub fn compute_rewards_all<R: RewardTerm>(reward: &R, state: &FetchState, output: &mut [f32]) {
    for idx in 0..state.num_envs {
        output[idx] = reward.compute(state, idx);
    }
}

/// Per-term breakdown for one environment, in stack order.
pub fn reward_breakdown<R: RewardTerm>(
    reward: &R,
    state: &FetchState,
    idx: usize,
) -> Vec<(&'static str, f32)> {
    let mut out = Vec::new();
    reward.write_breakdown(state, idx, &mut out);
    out
}
