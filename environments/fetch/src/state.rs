//! Struct-of-Arrays state layout for the vectorized manipulation tasks.
//!
//! All per-environment quantities live in flat contiguous arrays, either one
//! scalar per environment or strided 3-vectors, so stepping and observation
//! writes never chase pointers. Reward components read this struct directly.

use crate::constants::{dist3, FINGER_MAX_WIDTH, GRIPPER_HOME};

/// SoA state storage for all parallel task instances.
///
/// 3-vector fields are stored flat as `[num_envs * 3]` with layout
/// `[env0_x, env0_y, env0_z, env1_x, ...]`. Reach leaves the object arrays
/// zeroed; they are never observed for that task.
pub struct FetchState {
    // ========================================================================
    // Gripper [num_envs * 3] / [num_envs]
    // ========================================================================
    /// Gripper center position (m).
    pub gripper_pos: Vec<f32>,
    /// Gripper velocity (m/s), displacement over the last control step.
    pub gripper_vel: Vec<f32>,
    /// Finger opening width (m).
    pub finger_width: Vec<f32>,
    /// Finger width rate of change (m/s).
    pub finger_vel: Vec<f32>,

    // ========================================================================
    // Object [num_envs * 3] / [num_envs]
    // ========================================================================
    /// Object center position (m).
    pub object_pos: Vec<f32>,
    /// Object velocity (m/s).
    pub object_vel: Vec<f32>,
    /// Whether the object is currently held by the gripper.
    pub grasped: Vec<bool>,

    // ========================================================================
    // Goals [num_envs * 3]
    // ========================================================================
    /// Desired goal position for the episode (m).
    pub goal: Vec<f32>,
    /// Achieved goal: the object position for object tasks, the gripper
    /// position for reach. Refreshed after every step and reset.
    pub achieved: Vec<f32>,

    // ========================================================================
    // Step Bookkeeping [num_envs] / [num_envs * 4]
    // ========================================================================
    /// Last applied action, kept for energy penalties.
    pub last_action: Vec<f32>,
    /// Goal distance snapshotted before the latest step, kept for progress
    /// bonuses. Holds the initial distance right after a reset.
    pub prev_goal_dist: Vec<f32>,
    /// Steps taken in the current episode.
    pub step_count: Vec<u32>,
    /// Reward accumulated in the current episode.
    pub episode_reward: Vec<f32>,

    /// Number of parallel environments.
    pub num_envs: usize,
}

impl FetchState {
    /// Create state storage for `num_envs` instances, all at the home pose.
    pub fn new(num_envs: usize) -> Self {
        let mut state = Self {
            gripper_pos: vec![0.0; num_envs * 3],
            gripper_vel: vec![0.0; num_envs * 3],
            finger_width: vec![FINGER_MAX_WIDTH; num_envs],
            finger_vel: vec![0.0; num_envs],
            object_pos: vec![0.0; num_envs * 3],
            object_vel: vec![0.0; num_envs * 3],
            grasped: vec![false; num_envs],
            goal: vec![0.0; num_envs * 3],
            achieved: vec![0.0; num_envs * 3],
            last_action: vec![0.0; num_envs * 4],
            prev_goal_dist: vec![0.0; num_envs],
            step_count: vec![0; num_envs],
            episode_reward: vec![0.0; num_envs],
            num_envs,
        };
        for idx in 0..num_envs {
            state.set_gripper_pos(idx, GRIPPER_HOME);
        }
        state
    }

    // ========================================================================
    // 3-Vector Accessors
    // ========================================================================

    #[inline]
    pub fn gripper(&self, idx: usize) -> [f32; 3] {
        read3(&self.gripper_pos, idx)
    }

    #[inline]
    pub fn set_gripper_pos(&mut self, idx: usize, pos: [f32; 3]) {
        write3(&mut self.gripper_pos, idx, pos);
    }

    #[inline]
    pub fn gripper_velocity(&self, idx: usize) -> [f32; 3] {
        read3(&self.gripper_vel, idx)
    }

    #[inline]
    pub fn set_gripper_vel(&mut self, idx: usize, vel: [f32; 3]) {
        write3(&mut self.gripper_vel, idx, vel);
    }

    #[inline]
    pub fn object(&self, idx: usize) -> [f32; 3] {
        read3(&self.object_pos, idx)
    }

    #[inline]
    pub fn set_object_pos(&mut self, idx: usize, pos: [f32; 3]) {
        write3(&mut self.object_pos, idx, pos);
    }

    #[inline]
    pub fn object_velocity(&self, idx: usize) -> [f32; 3] {
        read3(&self.object_vel, idx)
    }

    #[inline]
    pub fn set_object_vel(&mut self, idx: usize, vel: [f32; 3]) {
        write3(&mut self.object_vel, idx, vel);
    }

    #[inline]
    pub fn goal_of(&self, idx: usize) -> [f32; 3] {
        read3(&self.goal, idx)
    }

    #[inline]
    pub fn set_goal(&mut self, idx: usize, goal: [f32; 3]) {
        write3(&mut self.goal, idx, goal);
    }

    #[inline]
    pub fn achieved_of(&self, idx: usize) -> [f32; 3] {
        read3(&self.achieved, idx)
    }

    // ========================================================================
    // Derived Quantities
    // ========================================================================

    /// Copy the goal-relevant point into the achieved array.
    #[inline]
    pub fn refresh_achieved(&mut self, idx: usize, use_object: bool) {
        let point = if use_object {
            self.object(idx)
        } else {
            self.gripper(idx)
        };
        write3(&mut self.achieved, idx, point);
    }

    /// Distance from the achieved goal to the desired goal.
    #[inline]
    pub fn goal_distance(&self, idx: usize) -> f32 {
        let base = idx * 3;
        dist3(
            &self.achieved[base..base + 3],
            &self.goal[base..base + 3],
        )
    }

    /// Distance from the gripper center to the object center.
    #[inline]
    pub fn gripper_object_distance(&self, idx: usize) -> f32 {
        let base = idx * 3;
        dist3(
            &self.gripper_pos[base..base + 3],
            &self.object_pos[base..base + 3],
        )
    }

    /// The last action applied to environment `idx`.
    #[inline]
    pub fn action_of(&self, idx: usize) -> [f32; 4] {
        let base = idx * 4;
        [
            self.last_action[base],
            self.last_action[base + 1],
            self.last_action[base + 2],
            self.last_action[base + 3],
        ]
    }
}

#[inline(always)]
fn read3(buf: &[f32], idx: usize) -> [f32; 3] {
    let base = idx * 3;
    [buf[base], buf[base + 1], buf[base + 2]]
}

#[inline(always)]
fn write3(buf: &mut [f32], idx: usize, value: [f32; 3]) {
    let base = idx * 3;
    buf[base] = value[0];
    buf[base + 1] = value[1];
    buf[base + 2] = value[2];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::GRIPPER_HOME;

    #[test]
    fn test_new_state_at_home() {
        let state = FetchState::new(4);
        for idx in 0..4 {
            assert_eq!(state.gripper(idx), GRIPPER_HOME);
            assert_eq!(state.finger_width[idx], FINGER_MAX_WIDTH);
            assert_eq!(state.step_count[idx], 0);
            assert!(!state.grasped[idx]);
        }
    }

    #[test]
    fn test_strided_accessors_are_independent() {
        let mut state = FetchState::new(3);
        state.set_object_pos(1, [0.1, 0.2, 0.3]);

        assert_eq!(state.object(0), [0.0, 0.0, 0.0]);
        assert_eq!(state.object(1), [0.1, 0.2, 0.3]);
        assert_eq!(state.object(2), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_refresh_achieved_selects_source() {
        let mut state = FetchState::new(1);
        state.set_object_pos(0, [0.1, 0.0, 0.42]);

        state.refresh_achieved(0, true);
        assert_eq!(state.achieved_of(0), [0.1, 0.0, 0.42]);

        state.refresh_achieved(0, false);
        assert_eq!(state.achieved_of(0), GRIPPER_HOME);
    }

    #[test]
    fn test_goal_distance() {
        let mut state = FetchState::new(1);
        state.set_object_pos(0, [0.0, 0.0, 0.0]);
        state.refresh_achieved(0, true);
        state.set_goal(0, [0.0, 3.0, 4.0]);
        assert!((state.goal_distance(0) - 5.0).abs() < 1e-6);
    }
}
