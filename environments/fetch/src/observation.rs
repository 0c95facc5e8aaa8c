//! Observation assembly.
//!
//! Observations are written into caller-provided flat buffers, one
//! fixed-size block per environment:
//!
//! | Offset | Entries | Content                          |
//! |--------|---------|----------------------------------|
//! | 0      | 3       | gripper position                 |
//! | 3      | 3       | gripper velocity                 |
//! | 6      | 1       | finger width                     |
//! | 7      | 1       | finger velocity                  |
//! | 8      | 3       | object position (object tasks)   |
//! | 11     | 3       | object position minus gripper    |
//! | 14     | 3       | object velocity                  |
//!
//! Reach stops at offset 8. Goals are separate channels and never appear in
//! the observation itself; the policy input is assembled as obs + desired
//! goal by the training stack.

use crate::state::FetchState;

/// Observation width for one environment: 8 for reach, 17 for object tasks.
#[inline]
pub fn observation_size(has_object: bool) -> usize {
    if has_object {
        17
    } else {
        8
    }
}

/// Write the observation of environment `idx` into `out`.
pub fn write_observation(state: &FetchState, idx: usize, has_object: bool, out: &mut [f32]) {
    let gripper = state.gripper(idx);
    let gripper_vel = state.gripper_velocity(idx);

    out[0] = gripper[0];
    out[1] = gripper[1];
    out[2] = gripper[2];
    out[3] = gripper_vel[0];
    out[4] = gripper_vel[1];
    out[5] = gripper_vel[2];
    out[6] = state.finger_width[idx];
    out[7] = state.finger_vel[idx];

    if has_object {
        let object = state.object(idx);
        let object_vel = state.object_velocity(idx);
        out[8] = object[0];
        out[9] = object[1];
        out[10] = object[2];
        out[11] = object[0] - gripper[0];
        out[12] = object[1] - gripper[1];
        out[13] = object[2] - gripper[2];
        out[14] = object_vel[0];
        out[15] = object_vel[1];
        out[16] = object_vel[2];
    }
}

/// Write observations for all environments as `[num_envs * obs_size]`.
pub fn write_observations_all(state: &FetchState, has_object: bool, out: &mut [f32]) {
    let obs_size = observation_size(has_object);
    for idx in 0..state.num_envs {
        let base = idx * obs_size;
        write_observation(state, idx, has_object, &mut out[base..base + obs_size]);
    }
}

/// Write achieved goals for all environments as `[num_envs * 3]`.
pub fn write_achieved_goals_all(state: &FetchState, out: &mut [f32]) {
    out.copy_from_slice(&state.achieved);
}

/// Write desired goals for all environments as `[num_envs * 3]`.
pub fn write_desired_goals_all(state: &FetchState, out: &mut [f32]) {
    out.copy_from_slice(&state.goal);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reach_layout() {
        let mut state = FetchState::new(2);
        state.set_gripper_pos(1, [0.1, 0.2, 0.5]);
        state.set_gripper_vel(1, [1.0, 0.0, 0.0]);
        state.finger_width[1] = 0.08;

        let mut out = vec![0.0; 2 * 8];
        write_observations_all(&state, false, &mut out);

        assert_eq!(out[8], 0.1);
        assert_eq!(out[9], 0.2);
        assert_eq!(out[10], 0.5);
        assert_eq!(out[11], 1.0);
        assert_eq!(out[14], 0.08);
    }

    #[test]
    fn test_object_relative_position() {
        let mut state = FetchState::new(1);
        state.set_gripper_pos(0, [0.1, 0.0, 0.5]);
        state.set_object_pos(0, [0.2, 0.1, 0.42]);

        let mut out = vec![0.0; 17];
        write_observations_all(&state, true, &mut out);

        assert!((out[11] - 0.1).abs() < 1e-6);
        assert!((out[12] - 0.1).abs() < 1e-6);
        assert!((out[13] - (-0.08)).abs() < 1e-6);
    }

    #[test]
    fn test_goal_writes() {
        let mut state = FetchState::new(2);
        state.set_goal(0, [0.1, 0.2, 0.3]);
        state.set_object_pos(1, [0.4, 0.5, 0.6]);
        state.refresh_achieved(1, true);

        let mut desired = vec![0.0; 6];
        let mut achieved = vec![0.0; 6];
        write_desired_goals_all(&state, &mut desired);
        write_achieved_goals_all(&state, &mut achieved);

        assert_eq!(&desired[0..3], &[0.1, 0.2, 0.3]);
        assert_eq!(&achieved[3..6], &[0.4, 0.5, 0.6]);
    }
}
