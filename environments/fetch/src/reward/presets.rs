//! Preset reward stacks for the manipulation tasks.
//!
//! Three stacks cover the training drivers: the sparse stack is the default
//! (and the one hindsight relabeling is designed for), the dense stack gives
//! a smooth distance signal, and the shaped stack adds lift, energy and
//! progress terms for algorithms that struggle with pure distance rewards.

use super::components::{
    ActionEnergyPenalty, DenseDistanceReward, GoalDistanceReward, LiftBonus, ProgressBonus,
};

/// Sparse -1/0 reward on the success threshold. The default stack.
pub type SparseReward = GoalDistanceReward;

/// Dense negative-distance reward.
pub type DenseReward = DenseDistanceReward;

/// Dense reward with shaping terms:
/// - distance weight 1.0
/// - lift bonus 0.1
/// - action energy penalty 0.01
/// - progress bonus 0.1
pub type ShapedReward = (
    DenseDistanceReward,
    LiftBonus,
    ActionEnergyPenalty,
    ProgressBonus,
);

/// Sparse stack with the standard 5 cm threshold.
pub fn sparse() -> SparseReward {
    GoalDistanceReward::default()
}

/// Dense stack, weight 1.0.
pub fn dense() -> DenseReward {
    DenseDistanceReward { weight: 1.0 }
}

/// Shaped stack with the standard weights.
pub fn shaped() -> ShapedReward {
    (
        DenseDistanceReward { weight: 1.0 },
        LiftBonus { weight: 0.1 },
        ActionEnergyPenalty { weight: 0.01 },
        ProgressBonus { weight: 0.1 },
    )
}
