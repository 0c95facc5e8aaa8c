//! Adapter implementing the goal_rl training interface.
//!
//! [`FetchEnv`] satisfies [`goal_rl::GoalEnv`] directly, so any task config
//! can be handed to the off-policy trainer and the evaluation drivers. The
//! detached reward handle captures only the reward variant and threshold,
//! which is what makes hindsight relabeling recomputation exact for the
//! goal part of the reward.

use std::sync::Arc;

use goal_rl::{GoalEnv, GoalRewardFn, GoalStepResult};

use crate::constants::dist3;
use crate::env::FetchEnv;
use crate::reward::RewardTerm;

impl<R: RewardTerm + 'static> GoalEnv for FetchEnv<R> {
    fn num_envs(&self) -> usize {
        self.config().n_envs
    }

    fn obs_size(&self) -> usize {
        self.config().obs_size()
    }

    fn goal_size(&self) -> usize {
        3
    }

    fn action_dim(&self) -> usize {
        4
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
            // The tasks never terminate early; episodes only truncate.
            terminals: vec![false; self.config().n_envs],
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

    fn compute_reward(&self, achieved: &[f32], desired: &[f32]) -> f32 {
        self.config()
            .variant
            .reward(achieved, desired, self.config().distance_threshold)
    }

    fn is_success(&self, achieved: &[f32], desired: &[f32]) -> bool {
        dist3(achieved, desired) < self.config().distance_threshold
    }

    fn reward_handle(&self) -> GoalRewardFn {
        let variant = self.config().variant;
        let threshold = self.config().distance_threshold;
        Arc::new(move |achieved, desired| variant.reward(achieved, desired, threshold))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetchConfig;

    #[test]
    fn test_trait_shape_reporting() {
        let reach = FetchConfig::reach(2).build().unwrap();
        assert_eq!(reach.num_envs(), 2);
        assert_eq!(reach.obs_size(), 8);
        assert_eq!(reach.goal_size(), 3);
        assert_eq!(reach.action_dim(), 4);
        assert_eq!(reach.action_bounds(), (-1.0, 1.0));
        assert_eq!(reach.max_episode_steps(), 50);

        let slide = FetchConfig::slide(1).build().unwrap();
        assert_eq!(slide.obs_size(), 17);
    }

    #[test]
    fn test_step_reward_matches_compute_reward() {
        let mut env = FetchConfig::pick_and_place(3).with_seed(21).build().unwrap();
        let result = env.step(&[0.3; 12]);

        let n = env.num_envs();
        let mut achieved = vec![0.0; n * 3];
        let mut desired = vec![0.0; n * 3];
        env.write_achieved_goals(&mut achieved);
        env.write_desired_goals(&mut desired);

        for idx in 0..n {
            let base = idx * 3;
            let expected =
                env.compute_reward(&achieved[base..base + 3], &desired[base..base + 3]);
            assert!((result.rewards[idx] - expected).abs() < 1e-6);
            assert!(!result.terminals[idx]);
        }
    }

    #[test]
    fn test_reward_handle_agrees() {
        let env = FetchConfig::slide(1).build().unwrap();
        let handle = env.reward_handle();

        let achieved = [0.0, 0.0, 0.42];
        let near = [0.03, 0.0, 0.42];
        let far = [0.4, 0.0, 0.42];

        assert_eq!(handle(&achieved, &near), env.compute_reward(&achieved, &near));
        assert_eq!(handle(&achieved, &far), env.compute_reward(&achieved, &far));
        assert_eq!(handle(&achieved, &far), -1.0);
    }

    #[test]
    fn test_truncates_at_horizon() {
        let mut env = FetchConfig::reach(2).with_horizon(3).build().unwrap();

        let mut result = env.step(&[0.0; 8]);
        assert!(!result.done(0));
        env.step(&[0.0; 8]);
        result = env.step(&[0.0; 8]);

        assert!(result.truncations.iter().all(|&t| t));
        assert!(result.terminals.iter().all(|&t| !t));
    }

    #[test]
    fn test_success_flag_does_not_terminate() {
        let mut env = FetchConfig::reach(1).with_seed(4).build().unwrap();

        // Drive the gripper onto the goal.
        for _ in 0..30 {
            let mut obs = vec![0.0; env.obs_size()];
            let mut desired = vec![0.0; 3];
            env.write_observations(&mut obs);
            env.write_desired_goals(&mut desired);
            let action = [
                ((desired[0] - obs[0]) * 20.0).clamp(-1.0, 1.0),
                ((desired[1] - obs[1]) * 20.0).clamp(-1.0, 1.0),
                ((desired[2] - obs[2]) * 20.0).clamp(-1.0, 1.0),
                0.0,
            ];
            let result = env.step(&action);
            if result.successes[0] {
                assert!(!result.terminals[0]);
                return;
            }
        }
        panic!("greedy reach policy should hit the goal within 30 steps");
    }
}
