//! Flat state storage for all kitchen instances.

use crate::constants::{dist3, APPLIANCES, ARM_HOME, NUM_APPLIANCES};

/// SoA state for `num_envs` parallel kitchen instances.
///
/// Arm fields are strided by 3, joint fields by [`NUM_APPLIANCES`].
#[derive(Clone, Debug)]
pub struct KitchenState {
    /// End-effector positions, `[num_envs * 3]`.
    pub arm_pos: Vec<f32>,
    /// End-effector velocities, `[num_envs * 3]`.
    pub arm_vel: Vec<f32>,
    /// Appliance joint values, `[num_envs * NUM_APPLIANCES]`.
    pub joints: Vec<f32>,
    /// Appliance joint velocities, `[num_envs * NUM_APPLIANCES]`.
    pub joint_vels: Vec<f32>,
    /// Completion latch per appliance, `[num_envs * NUM_APPLIANCES]`.
    pub completed: Vec<bool>,
    /// Steps taken since the last reset, `[num_envs]`.
    pub step_count: Vec<u32>,
    /// Accumulated reward of the running episode, `[num_envs]`.
    pub episode_reward: Vec<f32>,

    pub num_envs: usize,
}

impl KitchenState {
    /// Allocate state with every arm at home and every joint at its
    /// initial table value.
    pub fn new(num_envs: usize) -> Self {
        let mut arm_pos = vec![0.0; num_envs * 3];
        let mut joints = vec![0.0; num_envs * NUM_APPLIANCES];
        for idx in 0..num_envs {
            arm_pos[idx * 3..idx * 3 + 3].copy_from_slice(&ARM_HOME);
            for (appliance, spec) in APPLIANCES.iter().enumerate() {
                joints[idx * NUM_APPLIANCES + appliance] = spec.initial_value;
            }
        }

        Self {
            arm_pos,
            arm_vel: vec![0.0; num_envs * 3],
            joints,
            joint_vels: vec![0.0; num_envs * NUM_APPLIANCES],
            completed: vec![false; num_envs * NUM_APPLIANCES],
            step_count: vec![0; num_envs],
            episode_reward: vec![0.0; num_envs],
            num_envs,
        }
    }

    pub fn arm(&self, idx: usize) -> [f32; 3] {
        let base = idx * 3;
        [
            self.arm_pos[base],
            self.arm_pos[base + 1],
            self.arm_pos[base + 2],
        ]
    }

    pub fn set_arm_pos(&mut self, idx: usize, pos: [f32; 3]) {
        self.arm_pos[idx * 3..idx * 3 + 3].copy_from_slice(&pos);
    }

    pub fn arm_velocity(&self, idx: usize) -> [f32; 3] {
        let base = idx * 3;
        [
            self.arm_vel[base],
            self.arm_vel[base + 1],
            self.arm_vel[base + 2],
        ]
    }

    pub fn set_arm_vel(&mut self, idx: usize, vel: [f32; 3]) {
        self.arm_vel[idx * 3..idx * 3 + 3].copy_from_slice(&vel);
    }

    pub fn joint(&self, idx: usize, appliance: usize) -> f32 {
        self.joints[idx * NUM_APPLIANCES + appliance]
    }

    pub fn set_joint(&mut self, idx: usize, appliance: usize, value: f32) {
        self.joints[idx * NUM_APPLIANCES + appliance] = value;
    }

    pub fn joint_vel(&self, idx: usize, appliance: usize) -> f32 {
        self.joint_vels[idx * NUM_APPLIANCES + appliance]
    }

    pub fn set_joint_vel(&mut self, idx: usize, appliance: usize, value: f32) {
        self.joint_vels[idx * NUM_APPLIANCES + appliance] = value;
    }

    pub fn is_completed(&self, idx: usize, appliance: usize) -> bool {
        self.completed[idx * NUM_APPLIANCES + appliance]
    }

    pub fn set_completed(&mut self, idx: usize, appliance: usize, value: bool) {
        self.completed[idx * NUM_APPLIANCES + appliance] = value;
    }

    /// Distance from the end-effector to an appliance handle site.
    pub fn handle_distance(&self, idx: usize, appliance: usize) -> f32 {
        let base = idx * 3;
        dist3(
            &self.arm_pos[base..base + 3],
            &APPLIANCES[appliance].handle,
        )
    }
}
