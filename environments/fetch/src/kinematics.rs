//! First-order gripper control and object coupling rules.
//!
//! This is deliberately not a physics engine. The gripper is a point under
//! direct velocity control, and the object follows two coupling rules: a
//! grasp rule for pick-and-place (a closing gripper near the object holds
//! it) and a push rule for slide (contact transfers the gripper's horizontal
//! velocity, friction bleeds it off). Everything else is bookkeeping.

use crate::constants::*;
use crate::state::FetchState;

/// Integrate one control step of gripper motion from a 4-float action.
///
/// The first three components command Cartesian displacement, scaled by
/// [`ACTION_POS_SCALE`] and clamped to the workspace. The fourth opens or
/// closes the fingers unless `block_gripper` forces them shut (slide).
pub fn step_gripper(state: &mut FetchState, idx: usize, action: &[f32], block_gripper: bool) {
    let prev = state.gripper(idx);
    let target = clamp_to_workspace([
        prev[0] + action[0].clamp(-1.0, 1.0) * ACTION_POS_SCALE,
        prev[1] + action[1].clamp(-1.0, 1.0) * ACTION_POS_SCALE,
        prev[2] + action[2].clamp(-1.0, 1.0) * ACTION_POS_SCALE,
    ]);

    state.set_gripper_vel(
        idx,
        [
            (target[0] - prev[0]) / CONTROL_DT,
            (target[1] - prev[1]) / CONTROL_DT,
            (target[2] - prev[2]) / CONTROL_DT,
        ],
    );
    state.set_gripper_pos(idx, target);

    let prev_width = state.finger_width[idx];
    let width = if block_gripper {
        0.0
    } else {
        (prev_width + action[3].clamp(-1.0, 1.0) * ACTION_GRIP_SCALE).clamp(0.0, FINGER_MAX_WIDTH)
    };
    state.finger_width[idx] = width;
    state.finger_vel[idx] = (width - prev_width) / CONTROL_DT;
}

/// Pick-and-place grasp rule.
///
/// A grasp engages when the gripper center is within [`GRASP_RADIUS`] of the
/// object, the grip action is closing, and the fingers have narrowed to at
/// most [`GRASP_WIDTH`]. A held object tracks the gripper exactly. Opening
/// the fingers past [`GRASP_WIDTH`] releases it.
pub fn apply_grasp_rule(state: &mut FetchState, idx: usize) {
    let closing = state.last_action[idx * 4 + 3] < 0.0;
    let near = state.gripper_object_distance(idx) < GRASP_RADIUS;
    let width = state.finger_width[idx];

    if !state.grasped[idx] && near && closing && width <= GRASP_WIDTH {
        state.grasped[idx] = true;
    } else if state.grasped[idx] && width > GRASP_WIDTH {
        state.grasped[idx] = false;
    }

    if state.grasped[idx] {
        let gripper = state.gripper(idx);
        let vel = state.gripper_velocity(idx);
        state.set_object_pos(idx, gripper);
        state.set_object_vel(idx, vel);
    } else {
        apply_free_object(state, idx);
    }
}

/// Free object motion when nothing holds it: fall under gravity until the
/// table catches it, then glide out any horizontal velocity under friction.
pub fn apply_free_object(state: &mut FetchState, idx: usize) {
    let mut pos = state.object(idx);
    let mut vel = state.object_velocity(idx);

    if pos[2] > OBJECT_REST_HEIGHT {
        vel[2] -= G * CONTROL_DT;
    }

    pos[0] += vel[0] * CONTROL_DT;
    pos[1] += vel[1] * CONTROL_DT;
    pos[2] += vel[2] * CONTROL_DT;

    if pos[2] <= OBJECT_REST_HEIGHT {
        // Inelastic landing: vertical motion stops, friction takes over.
        pos[2] = OBJECT_REST_HEIGHT;
        vel[2] = 0.0;
        vel[0] *= SLIDE_FRICTION_DECAY;
        vel[1] *= SLIDE_FRICTION_DECAY;
        if (vel[0] * vel[0] + vel[1] * vel[1]).sqrt() < SLIDE_STOP_SPEED {
            vel[0] = 0.0;
            vel[1] = 0.0;
        }
    }

    state.set_object_pos(idx, clamp_to_table(pos));
    state.set_object_vel(idx, vel);
}

/// Slide push rule.
///
/// When the (blocked) gripper contacts the object while moving toward it,
/// the gripper's horizontal velocity transfers to the object. The object
/// then glides on the table, decaying by [`SLIDE_FRICTION_DECAY`] per step
/// and stopping below [`SLIDE_STOP_SPEED`].
pub fn apply_slide_push(state: &mut FetchState, idx: usize) {
    let gripper = state.gripper(idx);
    let gripper_vel = state.gripper_velocity(idx);
    let mut pos = state.object(idx);
    let mut vel = state.object_velocity(idx);

    if state.gripper_object_distance(idx) < PUSH_RADIUS {
        let toward = (pos[0] - gripper[0]) * gripper_vel[0] + (pos[1] - gripper[1]) * gripper_vel[1];
        if toward > 0.0 {
            vel[0] = gripper_vel[0];
            vel[1] = gripper_vel[1];
        }
    }

    pos[0] += vel[0] * CONTROL_DT;
    pos[1] += vel[1] * CONTROL_DT;
    pos[2] = OBJECT_REST_HEIGHT;

    vel[0] *= SLIDE_FRICTION_DECAY;
    vel[1] *= SLIDE_FRICTION_DECAY;
    vel[2] = 0.0;
    if (vel[0] * vel[0] + vel[1] * vel[1]).sqrt() < SLIDE_STOP_SPEED {
        vel[0] = 0.0;
        vel[1] = 0.0;
    }

    state.set_object_pos(idx, clamp_to_table(pos));
    state.set_object_vel(idx, vel);
}
