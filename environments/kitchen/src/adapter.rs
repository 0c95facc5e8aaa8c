//! [`GoalEnv`] implementation so the training stack can drive the kitchen.

use std::sync::Arc;

use goal_rl::{GoalEnv, GoalRewardFn, GoalStepResult};

use crate::env::KitchenEnv;
use crate::observation::OBSERVATION_SIZE;

/// Per-slot completion bands of the selected subtasks.
fn goal_bands(env: &KitchenEnv) -> Vec<f32> {
    env.config()
        .tasks_to_complete
        .iter()
        .map(|task| task.band())
        .collect()
}

fn completion_count(achieved: &[f32], desired: &[f32], bands: &[f32]) -> f32 {
    achieved
        .iter()
        .zip(desired)
        .zip(bands)
        .filter(|((a, d), band)| (**a - **d).abs() <= **band)
        .count() as f32
}

impl GoalEnv for KitchenEnv {
    fn num_envs(&self) -> usize {
        self.config().n_envs
    }

    fn obs_size(&self) -> usize {
        OBSERVATION_SIZE
    }

    fn goal_size(&self) -> usize {
        self.config().goal_size()
    }

    fn action_dim(&self) -> usize {
        3
    }

    fn action_bounds(&self) -> (f32, f32) {
        (-1.0, 1.0)
    }

    fn max_episode_steps(&self) -> usize {
        self.config().horizon
    }

    fn write_observations(&self, out: &mut [f32]) {
        self.copy_observations(out);
    }

    fn write_achieved_goals(&self, out: &mut [f32]) {
        self.copy_achieved_goals(out);
    }

    fn write_desired_goals(&self, out: &mut [f32]) {
        self.copy_desired_goals(out);
    }

    fn step(&mut self, actions: &[f32]) -> GoalStepResult {
        self.step_all(actions);
        GoalStepResult {
            rewards: self.last_rewards().to_vec(),
            terminals: self.last_terminals().to_vec(),
            truncations: self.last_truncations().to_vec(),
            successes: self.last_successes().to_vec(),
        }
    }

    fn reset_envs(&mut self, indices: &[usize]) {
        self.reset_env_indices(indices);
    }

    fn reset_all(&mut self) {
        self.reset_all_envs();
    }

    /// Stateless analog of the step reward: the number of goal components
    /// currently inside their completion band. The step reward itself pays
    /// each completion only once, which a pure goal function cannot
    /// express, so relabeled rewards count held completions instead.
    fn compute_reward(&self, achieved: &[f32], desired: &[f32]) -> f32 {
        completion_count(achieved, desired, &goal_bands(self))
    }

    fn is_success(&self, achieved: &[f32], desired: &[f32]) -> bool {
        let bands = goal_bands(self);
        achieved
            .iter()
            .zip(desired)
            .zip(&bands)
            .all(|((a, d), band)| (*a - *d).abs() <= *band)
    }

    fn reward_handle(&self) -> GoalRewardFn {
        let bands = goal_bands(self);
        Arc::new(move |achieved, desired| completion_count(achieved, desired, &bands))
    }
}
