//! Built-in reward terms for the manipulation tasks.
//!
//! Each term is a zero-cost struct implementing [`RewardTerm`]. Distance
//! terms read the achieved/desired goal pair; shaping terms also read
//! non-goal state (object height, last action), which is why shaped rewards
//! cannot be recomputed during hindsight relabeling.

use super::RewardTerm;
use crate::constants::{DISTANCE_THRESHOLD, OBJECT_REST_HEIGHT};
use crate::state::FetchState;

// ============================================================================
// Goal Distance (Sparse)
// ============================================================================

/// Sparse goal reward: 0 when the achieved goal is within `threshold` of
/// the desired goal, -1 otherwise.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GoalDistanceReward {
    /// Success distance threshold (m).
    pub threshold: f32,
}

impl Default for GoalDistanceReward {
    fn default() -> Self {
        Self {
            threshold: DISTANCE_THRESHOLD,
        }
    }
}

impl RewardTerm for GoalDistanceReward {
    const NAME: &'static str = "GoalDistance";

    #[inline]
    fn compute(&self, state: &FetchState, idx: usize) -> f32 {
        if state.goal_distance(idx) < self.threshold {
            0.0
        } else {
            -1.0
        }
    }
}

// ============================================================================
// Dense Distance
// ============================================================================

/// Dense goal reward: negative Euclidean distance to the desired goal.
///
/// `reward = -weight * ||achieved - desired||`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DenseDistanceReward {
    /// Distance weight (typically 1.0).
    pub weight: f32,
}

impl RewardTerm for DenseDistanceReward {
    const NAME: &'static str = "DenseDistance";

    #[inline]
    fn compute(&self, state: &FetchState, idx: usize) -> f32 {
        if self.weight == 0.0 {
            return 0.0;
        }
        -self.weight * state.goal_distance(idx)
    }
}

// ============================================================================
// Lift Bonus
// ============================================================================

/// Rewards holding the object above its resting height on the table.
///
/// `reward = weight * max(0, object_z - rest_height)`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LiftBonus {
    /// Height weight (typically 0.1).
    pub weight: f32,
}

impl RewardTerm for LiftBonus {
    const NAME: &'static str = "LiftBonus";

    #[inline]
    fn compute(&self, state: &FetchState, idx: usize) -> f32 {
        if self.weight == 0.0 {
            return 0.0;
        }
        let height = state.object_pos[idx * 3 + 2] - OBJECT_REST_HEIGHT;
        self.weight * height.max(0.0)
    }
}

// ============================================================================
// Action Energy Penalty
// ============================================================================

/// Penalizes squared action magnitude, discouraging jerky control.
///
/// `reward = -weight * sum(a_i^2)`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActionEnergyPenalty {
    /// Energy weight (typically 0.01).
    pub weight: f32,
}

impl RewardTerm for ActionEnergyPenalty {
    const NAME: &'static str = "ActionEnergy";

    #[inline]
    fn compute(&self, state: &FetchState, idx: usize) -> f32 {
        if self.weight == 0.0 {
            return 0.0;
        }
        let base = idx * 4;
        let energy: f32 = state.last_action[base..base + 4].iter().map(|a| a * a).sum();
        -self.weight * energy
    }
}

// ============================================================================
// Progress Bonus
// ============================================================================

/// Rewards the per-step reduction in goal distance.
///
/// `reward = weight * (prev_distance - distance)`; negative when the agent
/// moves the achieved goal away from the target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressBonus {
    /// Progress weight (typically 0.1).
    pub weight: f32,
}

impl RewardTerm for ProgressBonus {
    const NAME: &'static str = "Progress";

    #[inline]
    fn compute(&self, state: &FetchState, idx: usize) -> f32 {
        if self.weight == 0.0 {
            return 0.0;
        }
        self.weight * (state.prev_goal_dist[idx] - state.goal_distance(idx))
    }
}
