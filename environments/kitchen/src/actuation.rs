//! Arm velocity control and handle-driven appliance actuation.
//!
//! The arm is a point end-effector under direct velocity control, the same
//! first-order model the fetch tasks use. Appliances are operated by
//! holding the end-effector at their handle site: while held, the joint
//! moves toward its target value at a fixed fraction of its span per step
//! and stops there. Joints are passive otherwise and keep their position.

use crate::constants::*;
use crate::state::KitchenState;

/// Integrate one control step of arm motion from a 3-float action.
pub fn step_arm(state: &mut KitchenState, idx: usize, action: &[f32]) {
    let prev = state.arm(idx);
    let target = clamp_to_workspace([
        prev[0] + action[0].clamp(-1.0, 1.0) * ACTION_POS_SCALE,
        prev[1] + action[1].clamp(-1.0, 1.0) * ACTION_POS_SCALE,
        prev[2] + action[2].clamp(-1.0, 1.0) * ACTION_POS_SCALE,
    ]);

    state.set_arm_vel(
        idx,
        [
            (target[0] - prev[0]) / CONTROL_DT,
            (target[1] - prev[1]) / CONTROL_DT,
            (target[2] - prev[2]) / CONTROL_DT,
        ],
    );
    state.set_arm_pos(idx, target);
}

/// Advance every appliance joint of instance `idx` one step.
///
/// Only the appliance whose handle the end-effector currently holds moves;
/// handle sites are spaced so at most one can be held at a time.
pub fn actuate_appliances(state: &mut KitchenState, idx: usize) {
    for appliance in 0..NUM_APPLIANCES {
        let held = state.handle_distance(idx, appliance) < HANDLE_RADIUS;
        if !held {
            state.set_joint_vel(idx, appliance, 0.0);
            continue;
        }

        let value = state.joint(idx, appliance);
        let target = APPLIANCES[appliance].target_value;
        let gap = target - value;
        let rate = ACTUATION_FRACTION * joint_span(appliance);
        // Move toward the target without overshooting it.
        let delta = gap.clamp(-rate, rate);

        state.set_joint(idx, appliance, value + delta);
        state.set_joint_vel(idx, appliance, delta / CONTROL_DT);
    }
}
