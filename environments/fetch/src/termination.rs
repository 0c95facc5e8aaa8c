//! Episode termination checks.
//!
//! The manipulation tasks never terminate early: reaching the goal keeps
//! the episode running (the object can be knocked away again), and only the
//! fixed horizon ends it via truncation. Success is therefore a separate
//! per-step flag, and evaluation reads it from the final step.

use crate::state::FetchState;

/// Write truncation flags: true once an environment's step count reaches
/// the horizon.
pub fn check_truncation_all(state: &FetchState, horizon: usize, out: &mut [bool]) {
    for idx in 0..state.num_envs {
        out[idx] = state.step_count[idx] as usize >= horizon;
    }
}

/// Write success flags: true while the achieved goal is within `threshold`
/// of the desired goal.
pub fn check_success_all(state: &FetchState, threshold: f32, out: &mut [bool]) {
    for idx in 0..state.num_envs {
        out[idx] = state.goal_distance(idx) < threshold;
    }
}
