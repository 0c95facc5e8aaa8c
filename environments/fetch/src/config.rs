//! Configuration types and builders for the manipulation tasks.
//!
//! A [`FetchConfig`] names the task, the number of parallel instances and
//! the reward stack, with builder methods for everything else. The reward
//! stack is a compile-time tuple, so switching stacks changes the config's
//! type parameter; `with_dense_reward` / `with_shaped_reward` handle the
//! common cases.

use crate::constants::{dist3, DEFAULT_HORIZON, DISTANCE_THRESHOLD, MIN_GOAL_DISTANCE};
use crate::env::FetchEnv;
use crate::noise::NoiseConfig;
use crate::reward::{presets, RewardTerm};
use crate::trace::DEFAULT_TRACE_CAPACITY;

// ============================================================================
// Task Selection
// ============================================================================

/// The three tabletop tasks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchTask {
    /// Move the gripper itself to a goal point.
    Reach,
    /// Grasp the object and carry it to a goal, possibly in the air.
    PickAndPlace,
    /// Push the object across the table to a goal beyond arm reach. The
    /// gripper is blocked closed for this task.
    Slide,
}

impl FetchTask {
    /// Whether the task has a manipulable object.
    pub fn has_object(&self) -> bool {
        !matches!(self, FetchTask::Reach)
    }

    /// Whether the fingers are forced shut and the grip action ignored.
    pub fn blocks_gripper(&self) -> bool {
        matches!(self, FetchTask::Slide)
    }

    /// Task name for logs and file paths.
    pub fn name(&self) -> &'static str {
        match self {
            FetchTask::Reach => "reach",
            FetchTask::PickAndPlace => "pick_and_place",
            FetchTask::Slide => "slide",
        }
    }
}

// ============================================================================
// Goal Reward Variant
// ============================================================================

/// Goal-conditioned reward used for relabeling and `compute_reward`.
///
/// This is the pure function of (achieved, desired) that hindsight
/// relabeling recomputes. Shaping terms in the step reward sit on top of it
/// and are not part of this variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RewardVariant {
    /// -1 outside the success threshold, 0 inside. The default.
    #[default]
    Sparse,
    /// Negative Euclidean goal distance.
    Dense,
}

impl RewardVariant {
    /// Evaluate the variant on an achieved/desired goal pair.
    #[inline]
    pub fn reward(&self, achieved: &[f32], desired: &[f32], threshold: f32) -> f32 {
        let dist = dist3(achieved, desired);
        match self {
            RewardVariant::Sparse => {
                if dist < threshold {
                    0.0
                } else {
                    -1.0
                }
            }
            RewardVariant::Dense => -dist,
        }
    }
}

// ============================================================================
// Render Mode
// ============================================================================

/// How the environment exposes its motion for inspection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// No capture at all. The default.
    #[default]
    Headless,
    /// Record environment 0's gripper/object/goal per step into a bounded
    /// trajectory trace for plotting.
    Trace,
}

// ============================================================================
// Environment Configuration
// ============================================================================

/// Full configuration for a [`FetchEnv`].
///
/// # Example
/// ```ignore
/// use fetch_env::{FetchConfig, FetchTask};
///
/// let env = FetchConfig::new(FetchTask::PickAndPlace, 8)
///     .with_seed(7)
///     .with_dense_reward()
///     .build()
///     .unwrap();
/// ```
#[derive(Clone, Debug)]
pub struct FetchConfig<R: RewardTerm = presets::SparseReward> {
    /// Which task to simulate.
    pub task: FetchTask,
    /// Number of parallel environment instances.
    pub n_envs: usize,
    /// Step reward stack.
    pub reward: R,
    /// Goal-only reward used by `compute_reward` and relabeling.
    pub variant: RewardVariant,
    /// Success distance threshold (m).
    pub distance_threshold: f32,
    /// Episode length in control steps; episodes truncate here.
    pub horizon: usize,
    /// Base RNG seed; each instance derives its own stream from it.
    pub seed: u64,
    /// Minimum distance between initial achieved goal and sampled goal (m).
    pub min_goal_distance: f32,
    /// Observation noise settings.
    pub noise: NoiseConfig,
    /// Whether to capture a trajectory trace.
    pub render_mode: RenderMode,
    /// Steps retained by the trajectory trace.
    pub trace_capacity: usize,
}

impl FetchConfig<presets::SparseReward> {
    /// Config for `task` with `n_envs` instances and the sparse default
    /// reward.
    pub fn new(task: FetchTask, n_envs: usize) -> Self {
        Self {
            task,
            n_envs,
            reward: presets::sparse(),
            variant: RewardVariant::Sparse,
            distance_threshold: DISTANCE_THRESHOLD,
            horizon: DEFAULT_HORIZON,
            seed: 0,
            min_goal_distance: MIN_GOAL_DISTANCE,
            noise: NoiseConfig::disabled(),
            render_mode: RenderMode::Headless,
            trace_capacity: DEFAULT_TRACE_CAPACITY,
        }
    }

    /// Shorthand for a reach config.
    pub fn reach(n_envs: usize) -> Self {
        Self::new(FetchTask::Reach, n_envs)
    }

    /// Shorthand for a pick-and-place config.
    pub fn pick_and_place(n_envs: usize) -> Self {
        Self::new(FetchTask::PickAndPlace, n_envs)
    }

    /// Shorthand for a slide config.
    pub fn slide(n_envs: usize) -> Self {
        Self::new(FetchTask::Slide, n_envs)
    }
}

impl<R: RewardTerm> FetchConfig<R> {
    /// Set the base RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the episode horizon in control steps.
    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    /// Set the success distance threshold.
    pub fn with_distance_threshold(mut self, threshold: f32) -> Self {
        self.distance_threshold = threshold;
        self
    }

    /// Set the minimum initial goal distance.
    pub fn with_min_goal_distance(mut self, distance: f32) -> Self {
        self.min_goal_distance = distance;
        self
    }

    /// Set observation noise.
    pub fn with_noise(mut self, noise: NoiseConfig) -> Self {
        self.noise = noise;
        self
    }

    /// Set the render mode.
    pub fn with_render_mode(mut self, mode: RenderMode) -> Self {
        self.render_mode = mode;
        self
    }

    /// Set the trajectory trace capacity.
    pub fn with_trace_capacity(mut self, capacity: usize) -> Self {
        self.trace_capacity = capacity;
        self
    }

    /// Switch to the dense negative-distance reward.
    pub fn with_dense_reward(self) -> FetchConfig<presets::DenseReward> {
        self.with_reward(presets::dense(), RewardVariant::Dense)
    }

    /// Switch to the shaped reward stack. The goal-only variant becomes
    /// dense, matching the stack's distance term.
    pub fn with_shaped_reward(self) -> FetchConfig<presets::ShapedReward> {
        self.with_reward(presets::shaped(), RewardVariant::Dense)
    }

    /// Replace the reward stack with an arbitrary composition, together
    /// with the goal-only variant relabeling should use for it.
    pub fn with_reward<R2: RewardTerm>(
        self,
        reward: R2,
        variant: RewardVariant,
    ) -> FetchConfig<R2> {
        FetchConfig {
            task: self.task,
            n_envs: self.n_envs,
            reward,
            variant,
            distance_threshold: self.distance_threshold,
            horizon: self.horizon,
            seed: self.seed,
            min_goal_distance: self.min_goal_distance,
            noise: self.noise,
            render_mode: self.render_mode,
            trace_capacity: self.trace_capacity,
        }
    }

    /// Observation width for this task.
    pub fn obs_size(&self) -> usize {
        crate::observation::observation_size(self.task.has_object())
    }

    /// Check the configuration for contradictions.
    pub fn validate(&self) -> Result<(), String> {
        if self.n_envs == 0 {
            return Err("n_envs must be at least 1".to_string());
        }
        if self.horizon == 0 {
            return Err("horizon must be at least 1".to_string());
        }
        if self.distance_threshold <= 0.0 {
            return Err("distance_threshold must be positive".to_string());
        }
        if self.min_goal_distance < 0.0 {
            return Err("min_goal_distance must not be negative".to_string());
        }
        Ok(())
    }

    /// Build the environment.
    pub fn build(self) -> Result<FetchEnv<R>, String> {
        FetchEnv::from_config(self)
    }
}
