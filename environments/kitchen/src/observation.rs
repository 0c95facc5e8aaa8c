//! Flattened observation and goal vector assembly.
//!
//! Layout (27 floats): end-effector position `[0..3)`, end-effector
//! velocity `[3..6)`, the seven joint values `[6..13)`, the seven joint
//! velocities `[13..20)`, then one target channel per appliance `[20..27)`.
//! The target channel carries the appliance's target value when its
//! subtask is selected and its current value otherwise, so unselected
//! appliances read as "already where they should be".

use crate::config::KitchenTask;
use crate::constants::{APPLIANCES, NUM_APPLIANCES};
use crate::state::KitchenState;

/// Flattened observation width.
pub const OBSERVATION_SIZE: usize = 3 + 3 + 3 * NUM_APPLIANCES;

/// Write the observation for instance `idx` into `out`.
pub fn write_observation(
    state: &KitchenState,
    selected: &[KitchenTask],
    idx: usize,
    out: &mut [f32],
) {
    debug_assert_eq!(out.len(), OBSERVATION_SIZE);

    let arm_base = idx * 3;
    out[0..3].copy_from_slice(&state.arm_pos[arm_base..arm_base + 3]);
    out[3..6].copy_from_slice(&state.arm_vel[arm_base..arm_base + 3]);

    let joint_base = idx * NUM_APPLIANCES;
    out[6..6 + NUM_APPLIANCES]
        .copy_from_slice(&state.joints[joint_base..joint_base + NUM_APPLIANCES]);
    out[13..13 + NUM_APPLIANCES]
        .copy_from_slice(&state.joint_vels[joint_base..joint_base + NUM_APPLIANCES]);

    for appliance in 0..NUM_APPLIANCES {
        let is_selected = selected.iter().any(|task| task.index() == appliance);
        out[20 + appliance] = if is_selected {
            APPLIANCES[appliance].target_value
        } else {
            state.joint(idx, appliance)
        };
    }
}

/// Write observations for every instance, stacked by index.
pub fn write_observations_all(state: &KitchenState, selected: &[KitchenTask], out: &mut [f32]) {
    debug_assert_eq!(out.len(), state.num_envs * OBSERVATION_SIZE);
    for idx in 0..state.num_envs {
        let base = idx * OBSERVATION_SIZE;
        write_observation(state, selected, idx, &mut out[base..base + OBSERVATION_SIZE]);
    }
}

/// Write the achieved goal (current values of the selected joints) for
/// every instance.
pub fn write_achieved_goals_all(state: &KitchenState, selected: &[KitchenTask], out: &mut [f32]) {
    let goal_size = selected.len();
    debug_assert_eq!(out.len(), state.num_envs * goal_size);
    for idx in 0..state.num_envs {
        for (slot, task) in selected.iter().enumerate() {
            out[idx * goal_size + slot] = state.joint(idx, task.index());
        }
    }
}

/// Write the desired goal (target values of the selected joints) for every
/// instance. Targets are static, so this is the same vector per instance.
pub fn write_desired_goals_all(state: &KitchenState, selected: &[KitchenTask], out: &mut [f32]) {
    let goal_size = selected.len();
    debug_assert_eq!(out.len(), state.num_envs * goal_size);
    for idx in 0..state.num_envs {
        for (slot, task) in selected.iter().enumerate() {
            out[idx * goal_size + slot] = task.spec().target_value;
        }
    }
}
