//! Vectorized kitchen environment.

use crate::actuation::{actuate_appliances, step_arm};
use crate::config::KitchenConfig;
use crate::constants::*;
use crate::observation::{
    write_achieved_goals_all, write_desired_goals_all, write_observations_all, OBSERVATION_SIZE,
};
use crate::rng::XorShiftRng;
use crate::state::KitchenState;

/// Seed stride between per-instance RNG streams.
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Multi-subtask kitchen environment simulating `n_envs` parallel
/// instances.
///
/// Unlike the fetch tasks, episodes here genuinely terminate: once every
/// selected subtask is complete the terminal flag raises and stays up
/// until the caller resets that instance. Construction resets every
/// instance.
pub struct KitchenEnv {
    config: KitchenConfig,

    /// State storage (SoA layout).
    state: KitchenState,

    /// Per-instance reset RNG streams.
    rngs: Vec<XorShiftRng>,

    // Cached step buffers
    obs_buffer: Vec<f32>,
    reward_buffer: Vec<f32>,
    terminal_buffer: Vec<bool>,
    truncation_buffer: Vec<bool>,
    success_buffer: Vec<bool>,
}

impl KitchenEnv {
    /// Create and reset an environment from its configuration.
    pub fn from_config(config: KitchenConfig) -> Result<Self, String> {
        config.validate()?;

        let n_envs = config.n_envs;
        let rngs = (0..n_envs)
            .map(|idx| {
                XorShiftRng::new(config.seed.wrapping_add((idx as u64).wrapping_mul(SEED_STRIDE)))
            })
            .collect();

        let mut env = Self {
            state: KitchenState::new(n_envs),
            rngs,
            obs_buffer: vec![0.0; n_envs * OBSERVATION_SIZE],
            reward_buffer: vec![0.0; n_envs],
            terminal_buffer: vec![false; n_envs],
            truncation_buffer: vec![false; n_envs],
            success_buffer: vec![false; n_envs],
            config,
        };
        env.reset_all_envs();
        Ok(env)
    }

    /// The environment configuration.
    pub fn config(&self) -> &KitchenConfig {
        &self.config
    }

    /// Read access to the state arrays.
    pub fn state(&self) -> &KitchenState {
        &self.state
    }

    /// Mutable access to the state arrays, for tests and scripted setups.
    pub fn state_mut(&mut self) -> &mut KitchenState {
        &mut self.state
    }

    /// Rewards from the most recent step.
    pub fn last_rewards(&self) -> &[f32] {
        &self.reward_buffer
    }

    /// Terminal flags from the most recent step.
    pub fn last_terminals(&self) -> &[bool] {
        &self.terminal_buffer
    }

    /// Truncation flags from the most recent step.
    pub fn last_truncations(&self) -> &[bool] {
        &self.truncation_buffer
    }

    /// Success flags from the most recent step.
    pub fn last_successes(&self) -> &[bool] {
        &self.success_buffer
    }

    /// Number of selected subtasks instance `idx` has completed so far.
    pub fn completed_count(&self, idx: usize) -> usize {
        self.config
            .tasks_to_complete
            .iter()
            .filter(|task| self.state.is_completed(idx, task.index()))
            .count()
    }

    /// Copy current observations into `out`.
    pub fn copy_observations(&self, out: &mut [f32]) {
        out.copy_from_slice(&self.obs_buffer);
    }

    /// Copy current achieved goals into `out`.
    pub fn copy_achieved_goals(&self, out: &mut [f32]) {
        write_achieved_goals_all(&self.state, &self.config.tasks_to_complete, out);
    }

    /// Copy current desired goals into `out`.
    pub fn copy_desired_goals(&self, out: &mut [f32]) {
        write_desired_goals_all(&self.state, &self.config.tasks_to_complete, out);
    }

    // ========================================================================
    // Stepping
    // ========================================================================

    /// Advance every instance one control step and refresh all buffers.
    pub fn step_all(&mut self, actions: &[f32]) {
        assert!(!actions.is_empty(), "actions must not be empty");
        assert_eq!(
            actions.len(),
            self.config.n_envs * 3,
            "expected {} action floats, got {}",
            self.config.n_envs * 3,
            actions.len()
        );

        for idx in 0..self.config.n_envs {
            let action = &actions[idx * 3..idx * 3 + 3];
            step_arm(&mut self.state, idx, action);
            actuate_appliances(&mut self.state, idx);
            self.state.step_count[idx] += 1;

            // First-completion bonus per selected subtask, latched so an
            // already-open door earns nothing on later steps.
            let mut reward = 0.0;
            let mut all_complete = true;
            for task in &self.config.tasks_to_complete {
                let appliance = task.index();
                if !self.state.is_completed(idx, appliance)
                    && within_band(appliance, self.state.joint(idx, appliance))
                {
                    self.state.set_completed(idx, appliance, true);
                    reward += COMPLETION_BONUS;
                }
                all_complete &= self.state.is_completed(idx, appliance);
            }

            self.reward_buffer[idx] = reward;
            self.state.episode_reward[idx] += reward;
            self.terminal_buffer[idx] = all_complete;
            self.success_buffer[idx] = all_complete;
            self.truncation_buffer[idx] =
                self.state.step_count[idx] as usize >= self.config.horizon;
        }

        self.refresh_observations();
    }

    // ========================================================================
    // Resets
    // ========================================================================

    /// Reset the instances at `indices` with jittered start states.
    pub fn reset_env_indices(&mut self, indices: &[usize]) {
        for &idx in indices {
            self.reset_single(idx);
        }
        self.refresh_observations();
    }

    /// Reset every instance.
    pub fn reset_all_envs(&mut self) {
        for idx in 0..self.config.n_envs {
            self.reset_single(idx);
        }
        self.refresh_observations();
    }

    fn reset_single(&mut self, idx: usize) {
        let rng = &mut self.rngs[idx];

        let arm = clamp_to_workspace([
            ARM_HOME[0] + rng.range(-ARM_RESET_JITTER, ARM_RESET_JITTER),
            ARM_HOME[1] + rng.range(-ARM_RESET_JITTER, ARM_RESET_JITTER),
            ARM_HOME[2] + rng.range(-ARM_RESET_JITTER, ARM_RESET_JITTER),
        ]);
        self.state.set_arm_pos(idx, arm);
        self.state.set_arm_vel(idx, [0.0; 3]);

        for (appliance, spec) in APPLIANCES.iter().enumerate() {
            let jitter = JOINT_RESET_JITTER * joint_span(appliance);
            let value = (spec.initial_value + rng.range(-jitter, jitter))
                .clamp(spec.joint_min, spec.joint_max);
            self.state.set_joint(idx, appliance, value);
            self.state.set_joint_vel(idx, appliance, 0.0);
            self.state.set_completed(idx, appliance, false);
        }

        self.state.step_count[idx] = 0;
        self.state.episode_reward[idx] = 0.0;
        self.terminal_buffer[idx] = false;
        self.truncation_buffer[idx] = false;
        self.success_buffer[idx] = false;
        self.reward_buffer[idx] = 0.0;
    }

    fn refresh_observations(&mut self) {
        write_observations_all(
            &self.state,
            &self.config.tasks_to_complete,
            &mut self.obs_buffer,
        );
    }
}
