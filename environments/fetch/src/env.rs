//! Vectorized manipulation environment.
//!
//! [`FetchEnv`] owns the SoA state, one RNG stream per instance and the
//! cached step buffers. It is generic over the reward stack `R` so the
//! reward composition is resolved at compile time, defaulting to the sparse
//! stack that hindsight relabeling expects.

use crate::config::{FetchConfig, FetchTask, RenderMode};
use crate::constants::*;
use crate::kinematics::{apply_grasp_rule, apply_slide_push, step_gripper};
use crate::noise::{apply_observation_noise, XorShiftRng};
use crate::observation::{
    write_achieved_goals_all, write_desired_goals_all, write_observations_all,
};
use crate::reward::{compute_rewards_all, presets, reward_breakdown, RewardTerm};
use crate::state::FetchState;
use crate::termination::{check_success_all, check_truncation_all};
use crate::trace::TrajectoryTrace;

/// Seed stride between per-instance RNG streams.
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Tabletop manipulation environment simulating `n_envs` parallel task
/// instances.
///
/// Construction resets every instance, so observations and goals are valid
/// immediately. Instances never auto-reset: after a step reports truncation
/// for an index the caller reads the final state and then resets that index.
pub struct FetchEnv<R: RewardTerm = presets::SparseReward> {
    config: FetchConfig<R>,

    /// State storage (SoA layout).
    state: FetchState,

    /// Per-instance reset RNG streams.
    rngs: Vec<XorShiftRng>,
    /// Separate stream for observation noise.
    noise_rng: XorShiftRng,

    // Cached step buffers
    obs_buffer: Vec<f32>,
    reward_buffer: Vec<f32>,
    truncation_buffer: Vec<bool>,
    success_buffer: Vec<bool>,

    /// Trajectory capture for environment 0 in `RenderMode::Trace`.
    trace: Option<TrajectoryTrace>,
}

impl<R: RewardTerm> FetchEnv<R> {
    /// Create and reset an environment from its configuration.
    pub fn from_config(config: FetchConfig<R>) -> Result<Self, String> {
        config.validate()?;

        let n_envs = config.n_envs;
        let obs_size = config.obs_size();
        let rngs = (0..n_envs)
            .map(|idx| {
                XorShiftRng::new(config.seed.wrapping_add((idx as u64).wrapping_mul(SEED_STRIDE)))
            })
            .collect();
        let noise_rng = XorShiftRng::new(config.seed.wrapping_mul(SEED_STRIDE) ^ 0x5EED);
        let trace = match config.render_mode {
            RenderMode::Headless => None,
            RenderMode::Trace => Some(TrajectoryTrace::new(config.trace_capacity)),
        };

        let mut env = Self {
            state: FetchState::new(n_envs),
            rngs,
            noise_rng,
            obs_buffer: vec![0.0; n_envs * obs_size],
            reward_buffer: vec![0.0; n_envs],
            truncation_buffer: vec![false; n_envs],
            success_buffer: vec![false; n_envs],
            trace,
            config,
        };
        env.reset_all_envs();
        Ok(env)
    }

    /// The environment configuration.
    pub fn config(&self) -> &FetchConfig<R> {
        &self.config
    }

    /// Read access to the state arrays.
    pub fn state(&self) -> &FetchState {
        &self.state
    }

    /// Mutable access to the state arrays, for tests and scripted setups.
    pub fn state_mut(&mut self) -> &mut FetchState {
        &mut self.state
    }

    /// The captured trajectory, when running in `RenderMode::Trace`.
    pub fn trace(&self) -> Option<&TrajectoryTrace> {
        self.trace.as_ref()
    }

    /// Per-term reward breakdown for instance `idx` at the current state.
    pub fn reward_breakdown_of(&self, idx: usize) -> Vec<(&'static str, f32)> {
        reward_breakdown(&self.config.reward, &self.state, idx)
    }

    /// Rewards from the most recent step.
    pub fn last_rewards(&self) -> &[f32] {
        &self.reward_buffer
    }

    /// Truncation flags from the most recent step.
    pub fn last_truncations(&self) -> &[bool] {
        &self.truncation_buffer
    }

    /// Success flags from the most recent step.
    pub fn last_successes(&self) -> &[bool] {
        &self.success_buffer
    }

    /// Copy current (possibly noised) observations into `out`.
    pub fn copy_observations(&self, out: &mut [f32]) {
        out.copy_from_slice(&self.obs_buffer);
    }

    /// Copy current achieved goals into `out`. Goals are never noised.
    pub fn copy_achieved_goals(&self, out: &mut [f32]) {
        write_achieved_goals_all(&self.state, out);
    }

    /// Copy current desired goals into `out`.
    pub fn copy_desired_goals(&self, out: &mut [f32]) {
        write_desired_goals_all(&self.state, out);
    }

    // ========================================================================
    // Stepping
    // ========================================================================

    /// Advance every instance one control step and refresh all buffers.
    pub fn step_all(&mut self, actions: &[f32]) {
        assert!(!actions.is_empty(), "actions must not be empty");
        assert_eq!(
            actions.len(),
            self.config.n_envs * 4,
            "expected {} action floats, got {}",
            self.config.n_envs * 4,
            actions.len()
        );

        let task = self.config.task;
        let has_object = task.has_object();

        for idx in 0..self.config.n_envs {
            let base = idx * 4;
            let action = &actions[base..base + 4];
            self.state.last_action[base..base + 4].copy_from_slice(action);

            // Snapshot the pre-step distance; progress terms compare
            // against it, and it stays valid until the next step so reward
            // breakdowns reproduce the step reward exactly.
            self.state.prev_goal_dist[idx] = self.state.goal_distance(idx);

            step_gripper(&mut self.state, idx, action, task.blocks_gripper());
            match task {
                FetchTask::PickAndPlace => apply_grasp_rule(&mut self.state, idx),
                FetchTask::Slide => apply_slide_push(&mut self.state, idx),
                FetchTask::Reach => {}
            }

            self.state.step_count[idx] += 1;
            self.state.refresh_achieved(idx, has_object);
        }

        compute_rewards_all(&self.config.reward, &self.state, &mut self.reward_buffer);
        for idx in 0..self.config.n_envs {
            self.state.episode_reward[idx] += self.reward_buffer[idx];
        }

        check_truncation_all(&self.state, self.config.horizon, &mut self.truncation_buffer);
        check_success_all(
            &self.state,
            self.config.distance_threshold,
            &mut self.success_buffer,
        );

        if let Some(trace) = self.trace.as_mut() {
            let object = has_object.then(|| self.state.object(0));
            trace.record(self.state.gripper(0), object);
        }

        self.refresh_observations();
    }

    // ========================================================================
    // Resets
    // ========================================================================

    /// Reset the instances at `indices` with fresh start states and goals.
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
        let task = self.config.task;
        let has_object = task.has_object();

        self.state.set_gripper_pos(idx, GRIPPER_HOME);
        self.state.set_gripper_vel(idx, [0.0; 3]);
        self.state.finger_width[idx] = if task.blocks_gripper() {
            0.0
        } else {
            FINGER_MAX_WIDTH
        };
        self.state.finger_vel[idx] = 0.0;
        self.state.grasped[idx] = false;
        self.state.step_count[idx] = 0;
        self.state.episode_reward[idx] = 0.0;
        self.state.last_action[idx * 4..idx * 4 + 4].fill(0.0);
        self.state.set_object_vel(idx, [0.0; 3]);

        if has_object {
            let spawn_range = match task {
                FetchTask::Slide => SLIDE_SPAWN_RANGE,
                _ => OBJECT_SPAWN_RANGE,
            };
            let rng = &mut self.rngs[idx];
            let mut xy = [GRIPPER_HOME[0], GRIPPER_HOME[1]];
            // Keep the object clear of the gripper's home column so the
            // first observation is not already a contact state.
            for _ in 0..20 {
                xy = [
                    GRIPPER_HOME[0] + rng.range(-spawn_range, spawn_range),
                    GRIPPER_HOME[1] + rng.range(-spawn_range, spawn_range),
                ];
                let dx = xy[0] - GRIPPER_HOME[0];
                let dy = xy[1] - GRIPPER_HOME[1];
                if (dx * dx + dy * dy).sqrt() >= OBJECT_GRIPPER_CLEARANCE {
                    break;
                }
            }
            self.state
                .set_object_pos(idx, [xy[0], xy[1], OBJECT_REST_HEIGHT]);
        } else {
            self.state.set_object_pos(idx, [0.0; 3]);
        }

        self.state.refresh_achieved(idx, has_object);
        let initial_achieved = self.state.achieved_of(idx);

        let mut goal = self.sample_goal(idx);
        for _ in 0..20 {
            if dist3(&goal, &initial_achieved) >= self.config.min_goal_distance {
                break;
            }
            goal = self.sample_goal(idx);
        }
        if dist3(&goal, &initial_achieved) < self.config.min_goal_distance {
            // Degenerate sampling ranges can defeat the loop; push the goal
            // out along x so the episode never starts solved.
            goal[0] = initial_achieved[0] + self.config.min_goal_distance;
        }
        self.state.set_goal(idx, goal);
        self.state.prev_goal_dist[idx] = self.state.goal_distance(idx);

        if idx == 0 {
            if let Some(trace) = self.trace.as_mut() {
                trace.restart(goal);
            }
        }
    }

    fn sample_goal(&mut self, idx: usize) -> [f32; 3] {
        let rng = &mut self.rngs[idx];
        match self.config.task {
            FetchTask::Reach => [
                GRIPPER_HOME[0] + rng.range(-GOAL_RANGE, GOAL_RANGE),
                GRIPPER_HOME[1] + rng.range(-GOAL_RANGE, GOAL_RANGE),
                (GRIPPER_HOME[2] + rng.range(-GOAL_RANGE, GOAL_RANGE))
                    .clamp(WORKSPACE_MIN[2], WORKSPACE_MAX[2]),
            ],
            FetchTask::PickAndPlace => {
                let mut z = OBJECT_REST_HEIGHT;
                if rng.next_bool(AIR_GOAL_PROB) {
                    z += rng.range(0.0, AIR_GOAL_MAX_HEIGHT);
                }
                [
                    GRIPPER_HOME[0] + rng.range(-GOAL_RANGE, GOAL_RANGE),
                    GRIPPER_HOME[1] + rng.range(-GOAL_RANGE, GOAL_RANGE),
                    z,
                ]
            }
            FetchTask::Slide => {
                let x = GRIPPER_HOME[0]
                    + SLIDE_GOAL_OFFSET
                    + rng.range(-SLIDE_GOAL_RANGE, SLIDE_GOAL_RANGE);
                let y = (GRIPPER_HOME[1] + rng.range(-SLIDE_GOAL_RANGE, SLIDE_GOAL_RANGE))
                    .clamp(TABLE_MIN[1], TABLE_MAX[1]);
                // Slide goals sit past the workspace so only a push solves
                // the task.
                [
                    x.max(WORKSPACE_MAX[0] + self.config.distance_threshold),
                    y,
                    OBJECT_REST_HEIGHT,
                ]
            }
        }
    }

    fn refresh_observations(&mut self) {
        let has_object = self.config.task.has_object();
        write_observations_all(&self.state, has_object, &mut self.obs_buffer);

        if self.config.noise.is_enabled() {
            let obs_size = self.config.obs_size();
            for idx in 0..self.config.n_envs {
                let base = idx * obs_size;
                apply_observation_noise(
                    &mut self.obs_buffer[base..base + obs_size],
                    has_object,
                    &self.config.noise,
                    &mut self.noise_rng,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RewardVariant;

    #[test]
    fn test_creation_resets_all() {
        let env = FetchConfig::pick_and_place(8).with_seed(1).build().unwrap();
        for idx in 0..8 {
            assert_eq!(env.state().step_count[idx], 0);
            // Goals are sampled, never the zero default.
            assert!(env.state().goal_of(idx) != [0.0; 3]);
            assert!(env.state().goal_distance(idx) >= MIN_GOAL_DISTANCE);
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(FetchConfig::reach(0).build().is_err());
    }

    #[test]
    fn test_step_moves_gripper() {
        let mut env = FetchConfig::reach(1).with_seed(2).build().unwrap();
        let before = env.state().gripper(0);
        env.step_all(&[1.0, 0.0, 0.0, 0.0]);
        let after = env.state().gripper(0);

        assert!((after[0] - before[0] - ACTION_POS_SCALE).abs() < 1e-6);
        assert_eq!(env.state().step_count[0], 1);
    }

    #[test]
    #[should_panic(expected = "actions must not be empty")]
    fn test_empty_actions_rejected() {
        let mut env = FetchConfig::reach(1).build().unwrap();
        env.step_all(&[]);
    }

    #[test]
    fn test_seeded_resets_reproducible() {
        let env_a = FetchConfig::slide(4).with_seed(77).build().unwrap();
        let env_b = FetchConfig::slide(4).with_seed(77).build().unwrap();
        for idx in 0..4 {
            assert_eq!(env_a.state().goal_of(idx), env_b.state().goal_of(idx));
            assert_eq!(env_a.state().object(idx), env_b.state().object(idx));
        }
    }

    #[test]
    fn test_selective_reset_leaves_others() {
        let mut env = FetchConfig::pick_and_place(3).with_seed(5).build().unwrap();
        env.step_all(&[0.2; 12]);

        let untouched_goal = env.state().goal_of(2);
        env.reset_env_indices(&[0]);

        assert_eq!(env.state().step_count[0], 0);
        assert_eq!(env.state().step_count[2], 1);
        assert_eq!(env.state().goal_of(2), untouched_goal);
    }

    #[test]
    fn test_trace_capture() {
        let mut env = FetchConfig::pick_and_place(2)
            .with_seed(3)
            .with_render_mode(RenderMode::Trace)
            .build()
            .unwrap();

        env.step_all(&[0.5; 8]);
        env.step_all(&[0.5; 8]);

        let trace = env.trace().expect("trace enabled");
        assert_eq!(trace.len(), 2);
        assert_eq!(trace.object_path().len(), 2);
        assert_eq!(trace.goal(), env.state().goal_of(0));
    }

    #[test]
    fn test_headless_has_no_trace() {
        let env = FetchConfig::reach(1).build().unwrap();
        assert!(env.trace().is_none());
    }

    #[test]
    fn test_reward_breakdown_matches_variant() {
        let mut env = FetchConfig::pick_and_place(1)
            .with_seed(11)
            .with_shaped_reward()
            .build()
            .unwrap();
        assert_eq!(env.config().variant, RewardVariant::Dense);

        env.step_all(&[0.1, 0.0, 0.0, 0.0]);
        let breakdown = env.reward_breakdown_of(0);
        assert_eq!(breakdown.len(), 4);
        let total: f32 = breakdown.iter().map(|(_, v)| v).sum();
        assert!((total - env.last_rewards()[0]).abs() < 1e-5);
    }
}
