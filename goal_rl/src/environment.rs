//! Goal-conditioned vectorized environment interface.
//!
//! Every task trained by this crate exposes three views of its state:
//! the raw observation, the *achieved* goal (where the controlled quantity
//! currently is) and the *desired* goal (where it should end up). The
//! separation is what makes hindsight relabeling possible: a stored episode
//! can be replayed against a different desired goal, with rewards recomputed
//! from the achieved goals that were actually visited.
//!
//! Environments are vectorized: one instance simulates `num_envs` independent
//! copies of the task and reads/writes flat `[n_envs * size]` buffers, so the
//! collection loop never allocates per step.

use std::sync::Arc;

/// Pure goal-distance reward function, detached from any environment instance.
///
/// Used by the replay buffer to recompute rewards for relabeled goals.
/// The closure must be cheap and must not capture mutable environment state.
pub type GoalRewardFn = Arc<dyn Fn(&[f32], &[f32]) -> f32 + Send + Sync>;

/// Result from stepping vectorized goal environments.
#[derive(Debug, Clone)]
pub struct GoalStepResult {
    /// Rewards received [n_envs].
    pub rewards: Vec<f32>,
    /// Terminal flags (episode ended in an absorbing state) [n_envs].
    pub terminals: Vec<bool>,
    /// Truncation flags (episode hit an external step limit) [n_envs].
    pub truncations: Vec<bool>,
    /// Success flags (desired goal currently satisfied) [n_envs].
    ///
    /// Success does not imply termination: a manipulation episode keeps
    /// running after the object first reaches the target, and only the
    /// flag at the final step counts for evaluation.
    pub successes: Vec<bool>,
}

impl GoalStepResult {
    /// Create a result with all flags cleared for `n_envs` environments.
    pub fn new(n_envs: usize) -> Self {
        Self {
            rewards: vec![0.0; n_envs],
            terminals: vec![false; n_envs],
            truncations: vec![false; n_envs],
            successes: vec![false; n_envs],
        }
    }

    /// Get done flags (terminal OR truncated).
    pub fn dones(&self) -> Vec<bool> {
        self.terminals
            .iter()
            .zip(self.truncations.iter())
            .map(|(&t, &tr)| t || tr)
            .collect()
    }

    /// Whether environment `idx` finished this step.
    #[inline]
    pub fn done(&self, idx: usize) -> bool {
        self.terminals[idx] || self.truncations[idx]
    }
}

/// Vectorized goal-conditioned environment.
///
/// Implementations simulate `num_envs` independent task instances. Actions
/// are flat `[n_envs * action_dim]` buffers with every component in
/// `[action_low, action_high]`; observation and goal reads fill
/// caller-provided flat buffers.
///
/// Environments do not auto-reset. After a step reports done for an index,
/// the caller reads the final observation first and then calls
/// [`reset_envs`](GoalEnv::reset_envs) for that index.
pub trait GoalEnv: Send {
    /// Number of parallel environment instances.
    fn num_envs(&self) -> usize;

    /// Size of a single observation vector (goal excluded).
    fn obs_size(&self) -> usize;

    /// Size of a single goal vector (achieved and desired share it).
    fn goal_size(&self) -> usize;

    /// Dimension of the continuous action vector.
    fn action_dim(&self) -> usize;

    /// Inclusive `(low, high)` bounds shared by all action components.
    fn action_bounds(&self) -> (f32, f32);

    /// Episode step limit after which episodes are truncated.
    fn max_episode_steps(&self) -> usize;

    /// Write current observations into `out` as `[n_envs * obs_size]`.
    fn write_observations(&self, out: &mut [f32]);

    /// Write current achieved goals into `out` as `[n_envs * goal_size]`.
    fn write_achieved_goals(&self, out: &mut [f32]);

    /// Write current desired goals into `out` as `[n_envs * goal_size]`.
    fn write_desired_goals(&self, out: &mut [f32]);

    /// Advance all environments one step with `actions` as
    /// `[n_envs * action_dim]`.
    fn step(&mut self, actions: &[f32]) -> GoalStepResult;

    /// Reset the environments at `indices`, sampling fresh start states
    /// and desired goals.
    fn reset_envs(&mut self, indices: &[usize]);

    /// Reset every environment.
    fn reset_all(&mut self);

    /// Compute the goal-conditioned reward for one achieved/desired pair.
    ///
    /// Must agree with the rewards emitted by [`step`](GoalEnv::step) when
    /// called with the post-step achieved goal and the episode's desired
    /// goal, up to any shaping terms that depend on non-goal state.
    fn compute_reward(&self, achieved: &[f32], desired: &[f32]) -> f32;

    /// Whether the achieved goal satisfies the desired goal.
    fn is_success(&self, achieved: &[f32], desired: &[f32]) -> bool;

    /// Detached copy of [`compute_reward`](GoalEnv::compute_reward) for use
    /// by the replay buffer during relabeling.
    fn reward_handle(&self) -> GoalRewardFn;
}

// ============================================================================
// Time Limit Wrapper
// ============================================================================

/// Wrapper enforcing (or replacing) an episode step limit.
///
/// Counts steps per environment instance and raises the truncation flag once
/// the limit is reached, independently of whatever limit the inner
/// environment applies. Counters clear when an index is reset.
pub struct TimeLimitWrapper<E: GoalEnv> {
    inner: E,
    max_steps: usize,
    steps: Vec<u32>,
}

impl<E: GoalEnv> TimeLimitWrapper<E> {
    /// Wrap `inner` with a step limit of `max_steps`.
    pub fn new(inner: E, max_steps: usize) -> Self {
        let n = inner.num_envs();
        Self {
            inner,
            max_steps,
            steps: vec![0; n],
        }
    }

    /// Access the wrapped environment.
    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// Steps elapsed in the current episode of environment `idx`.
    pub fn elapsed_steps(&self, idx: usize) -> u32 {
        self.steps[idx]
    }
}

impl<E: GoalEnv> GoalEnv for TimeLimitWrapper<E> {
    fn num_envs(&self) -> usize {
        self.inner.num_envs()
    }

    fn obs_size(&self) -> usize {
        self.inner.obs_size()
    }

    fn goal_size(&self) -> usize {
        self.inner.goal_size()
    }

    fn action_dim(&self) -> usize {
        self.inner.action_dim()
    }

    fn action_bounds(&self) -> (f32, f32) {
        self.inner.action_bounds()
    }

    fn max_episode_steps(&self) -> usize {
        self.max_steps
    }

    fn write_observations(&self, out: &mut [f32]) {
        self.inner.write_observations(out);
    }

    fn write_achieved_goals(&self, out: &mut [f32]) {
        self.inner.write_achieved_goals(out);
    }

    fn write_desired_goals(&self, out: &mut [f32]) {
        self.inner.write_desired_goals(out);
    }

    fn step(&mut self, actions: &[f32]) -> GoalStepResult {
        let mut result = self.inner.step(actions);
        for i in 0..self.steps.len() {
            self.steps[i] += 1;
            if self.steps[i] as usize >= self.max_steps && !result.terminals[i] {
                result.truncations[i] = true;
            }
        }
        result
    }

    fn reset_envs(&mut self, indices: &[usize]) {
        for &i in indices {
            self.steps[i] = 0;
        }
        self.inner.reset_envs(indices);
    }

    fn reset_all(&mut self) {
        self.steps.fill(0);
        self.inner.reset_all();
    }

    fn compute_reward(&self, achieved: &[f32], desired: &[f32]) -> f32 {
        self.inner.compute_reward(achieved, desired)
    }

    fn is_success(&self, achieved: &[f32], desired: &[f32]) -> bool {
        self.inner.is_success(achieved, desired)
    }

    fn reward_handle(&self) -> GoalRewardFn {
        self.inner.reward_handle()
    }
}

// ============================================================================
// Reward Scaling Wrapper
// ============================================================================

/// Wrapper multiplying every reward by a constant factor.
///
/// Useful when an algorithm is sensitive to reward magnitude, e.g. scaling
/// sparse -1/0 rewards down before feeding them to a critic with a small
/// learning rate. The scale is also applied to `compute_reward` and the
/// detached reward handle so relabeled rewards stay consistent.
pub struct RewardScalingWrapper<E: GoalEnv> {
    inner: E,
    scale: f32,
}

impl<E: GoalEnv> RewardScalingWrapper<E> {
    /// Wrap `inner`, multiplying rewards by `scale`.
    pub fn new(inner: E, scale: f32) -> Self {
        Self { inner, scale }
    }

    /// The configured reward scale.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Access the wrapped environment.
    pub fn inner(&self) -> &E {
        &self.inner
    }
}

impl<E: GoalEnv> GoalEnv for RewardScalingWrapper<E> {
    fn num_envs(&self) -> usize {
        self.inner.num_envs()
    }

    fn obs_size(&self) -> usize {
        self.inner.obs_size()
    }

    fn goal_size(&self) -> usize {
        self.inner.goal_size()
    }

    fn action_dim(&self) -> usize {
        self.inner.action_dim()
    }

    fn action_bounds(&self) -> (f32, f32) {
        self.inner.action_bounds()
    }

    fn max_episode_steps(&self) -> usize {
        self.inner.max_episode_steps()
    }

    fn write_observations(&self, out: &mut [f32]) {
        self.inner.write_observations(out);
    }

    fn write_achieved_goals(&self, out: &mut [f32]) {
        self.inner.write_achieved_goals(out);
    }

    fn write_desired_goals(&self, out: &mut [f32]) {
        self.inner.write_desired_goals(out);
    }

    fn step(&mut self, actions: &[f32]) -> GoalStepResult {
        let mut result = self.inner.step(actions);
        for r in result.rewards.iter_mut() {
            *r *= self.scale;
        }
        result
    }

    fn reset_envs(&mut self, indices: &[usize]) {
        self.inner.reset_envs(indices);
    }

    fn reset_all(&mut self) {
        self.inner.reset_all();
    }

    fn compute_reward(&self, achieved: &[f32], desired: &[f32]) -> f32 {
        self.inner.compute_reward(achieved, desired) * self.scale
    }

    fn is_success(&self, achieved: &[f32], desired: &[f32]) -> bool {
        self.inner.is_success(achieved, desired)
    }

    fn reward_handle(&self) -> GoalRewardFn {
        let inner_fn = self.inner.reward_handle();
        let scale = self.scale;
        Arc::new(move |achieved, desired| inner_fn(achieved, desired) * scale)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
pub(crate) mod test_env {
    use super::*;

    /// Minimal 1D point task for wrapper and runner tests.
    ///
    /// The agent moves a point on a line by its (single) action component,
    /// the achieved goal is the point position and the desired goal is a
    /// fixed target. Sparse -1/0 reward within a 0.1 threshold.
    pub struct PointEnv {
        pub positions: Vec<f32>,
        pub goals: Vec<f32>,
        pub steps: Vec<u32>,
        pub horizon: usize,
    }

    impl PointEnv {
        pub fn new(n_envs: usize, horizon: usize) -> Self {
            Self {
                positions: vec![0.0; n_envs],
                goals: vec![1.0; n_envs],
                steps: vec![0; n_envs],
                horizon,
            }
        }
    }

    impl GoalEnv for PointEnv {
        fn num_envs(&self) -> usize {
            self.positions.len()
        }

        fn obs_size(&self) -> usize {
            2
        }

        fn goal_size(&self) -> usize {
            1
        }

        fn action_dim(&self) -> usize {
            1
        }

        fn action_bounds(&self) -> (f32, f32) {
            (-1.0, 1.0)
        }

        fn max_episode_steps(&self) -> usize {
            self.horizon
        }

        fn write_observations(&self, out: &mut [f32]) {
            for (i, &p) in self.positions.iter().enumerate() {
                out[i * 2] = p;
                out[i * 2 + 1] = self.steps[i] as f32 / self.horizon as f32;
            }
        }

        fn write_achieved_goals(&self, out: &mut [f32]) {
            out.copy_from_slice(&self.positions);
        }

        fn write_desired_goals(&self, out: &mut [f32]) {
            out.copy_from_slice(&self.goals);
        }

        fn step(&mut self, actions: &[f32]) -> GoalStepResult {
            let n = self.positions.len();
            let mut result = GoalStepResult::new(n);
            for i in 0..n {
                self.positions[i] += actions[i].clamp(-1.0, 1.0) * 0.2;
                self.steps[i] += 1;
                let dist = (self.positions[i] - self.goals[i]).abs();
                result.successes[i] = dist < 0.1;
                result.rewards[i] = if dist < 0.1 { 0.0 } else { -1.0 };
                result.truncations[i] = self.steps[i] as usize >= self.horizon;
            }
            result
        }

        fn reset_envs(&mut self, indices: &[usize]) {
            for &i in indices {
                self.positions[i] = 0.0;
                self.steps[i] = 0;
            }
        }

        fn reset_all(&mut self) {
            let all: Vec<usize> = (0..self.positions.len()).collect();
            self.reset_envs(&all);
        }

        fn compute_reward(&self, achieved: &[f32], desired: &[f32]) -> f32 {
            if (achieved[0] - desired[0]).abs() < 0.1 {
                0.0
            } else {
                -1.0
            }
        }

        fn is_success(&self, achieved: &[f32], desired: &[f32]) -> bool {
            (achieved[0] - desired[0]).abs() < 0.1
        }

        fn reward_handle(&self) -> GoalRewardFn {
            Arc::new(|achieved, desired| {
                if (achieved[0] - desired[0]).abs() < 0.1 {
                    0.0
                } else {
                    -1.0
                }
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_env::PointEnv;
    use super::*;

    #[test]
    fn test_step_result_dones() {
        let mut result = GoalStepResult::new(3);
        result.terminals[0] = true;
        result.truncations[2] = true;

        assert_eq!(result.dones(), vec![true, false, true]);
        assert!(result.done(0));
        assert!(!result.done(1));
        assert!(result.done(2));
    }

    #[test]
    fn test_point_env_reaches_goal() {
        let mut env = PointEnv::new(1, 50);
        let mut result = GoalStepResult::new(1);

        // Goal at 1.0, step size 0.2: five steps at full action reach it.
        for _ in 0..5 {
            result = env.step(&[1.0]);
        }

        assert!(result.successes[0]);
        assert_eq!(result.rewards[0], 0.0);
    }

    #[test]
    fn test_time_limit_truncates() {
        let env = PointEnv::new(2, 1000);
        let mut wrapped = TimeLimitWrapper::new(env, 3);

        let mut result = wrapped.step(&[0.0, 0.0]);
        assert_eq!(result.dones(), vec![false, false]);

        wrapped.step(&[0.0, 0.0]);
        result = wrapped.step(&[0.0, 0.0]);
        assert_eq!(result.truncations, vec![true, true]);
        assert_eq!(result.terminals, vec![false, false]);
    }

    #[test]
    fn test_time_limit_counter_resets() {
        let env = PointEnv::new(2, 1000);
        let mut wrapped = TimeLimitWrapper::new(env, 3);

        wrapped.step(&[0.0, 0.0]);
        wrapped.step(&[0.0, 0.0]);
        wrapped.reset_envs(&[0]);

        assert_eq!(wrapped.elapsed_steps(0), 0);
        assert_eq!(wrapped.elapsed_steps(1), 2);

        // Env 1 truncates one step later, env 0 has two steps left.
        let result = wrapped.step(&[0.0, 0.0]);
        assert_eq!(result.truncations, vec![false, true]);
    }

    #[test]
    fn test_time_limit_overrides_inner_horizon() {
        // The wrapper's limit is what callers see, not the inner horizon.
        let env = PointEnv::new(1, 1000);
        let wrapped = TimeLimitWrapper::new(env, 5);
        assert_eq!(wrapped.max_episode_steps(), 5);
    }

    #[test]
    fn test_reward_scaling_step_and_handle_agree() {
        let env = PointEnv::new(1, 50);
        let mut scaled = RewardScalingWrapper::new(env, 0.1);

        let result = scaled.step(&[0.0]);
        assert!((result.rewards[0] - (-0.1)).abs() < 1e-6);

        assert!((scaled.compute_reward(&[0.0], &[1.0]) - (-0.1)).abs() < 1e-6);

        let handle = scaled.reward_handle();
        assert!((handle(&[0.0], &[1.0]) - (-0.1)).abs() < 1e-6);
        assert!((handle(&[1.0], &[1.0]) - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_reward_scaling_preserves_success() {
        let env = PointEnv::new(1, 50);
        let scaled = RewardScalingWrapper::new(env, 0.01);

        assert!(scaled.is_success(&[1.05], &[1.0]));
        assert!(!scaled.is_success(&[0.5], &[1.0]));
    }
}
