//! Policy evaluation over a fixed episode count.
//!
//! Runs a (usually vectorized) environment to completion `n_episodes` times
//! with greedy actions and aggregates success rate and reward statistics.
//! [`evaluate_random`] provides a uniform-random baseline for calibrating
//! how much of a trained policy's success rate is the task being easy.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use serde::Serialize;
use std::fmt;

use crate::algorithms::GoalActor;
use crate::core::{EpisodeOutcome, EpisodeTracker, FinishedEpisode, RunningScalarStats};
use crate::environment::GoalEnv;

/// Settings for an evaluation run.
#[derive(Debug, Clone)]
pub struct EvaluationConfig {
    /// Episodes to complete before reporting.
    pub n_episodes: usize,
    /// Greedy actions when true, policy samples otherwise.
    pub deterministic: bool,
    /// Seed for the random baseline and stochastic evaluation.
    pub seed: u64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            n_episodes: 50,
            deterministic: true,
            seed: 0,
        }
    }
}

impl EvaluationConfig {
    pub fn new(n_episodes: usize) -> Self {
        Self {
            n_episodes: n_episodes.max(1),
            ..Default::default()
        }
    }

    pub fn with_deterministic(mut self, deterministic: bool) -> Self {
        self.deterministic = deterministic;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Aggregated results of an evaluation run.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub n_episodes: usize,
    pub successes: usize,
    pub success_rate: f32,
    pub mean_reward: f32,
    pub std_reward: f32,
    pub min_reward: f32,
    pub max_reward: f32,
    pub mean_length: f32,
    pub episode_rewards: Vec<f32>,
    pub episode_lengths: Vec<u32>,
    pub episode_successes: Vec<bool>,
}

impl EvaluationReport {
    fn from_episodes(episodes: &[FinishedEpisode]) -> Self {
        let mut rewards = RunningScalarStats::new();
        let mut lengths = RunningScalarStats::new();
        let mut successes = 0usize;

        for episode in episodes {
            rewards.update(episode.total_reward as f64);
            lengths.update(episode.length as f64);
            if episode.success {
                successes += 1;
            }
        }

        let n = episodes.len();
        Self {
            n_episodes: n,
            successes,
            success_rate: if n == 0 {
                0.0
            } else {
                successes as f32 / n as f32
            },
            mean_reward: rewards.mean() as f32,
            std_reward: rewards.std() as f32,
            min_reward: rewards.min() as f32,
            max_reward: rewards.max() as f32,
            mean_length: lengths.mean() as f32,
            episode_rewards: episodes.iter().map(|e| e.total_reward).collect(),
            episode_lengths: episodes.iter().map(|e| e.length).collect(),
            episode_successes: episodes.iter().map(|e| e.success).collect(),
        }
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Episodes:     {}", self.n_episodes)?;
        writeln!(
            f,
            "Success rate: {:.1}% ({}/{})",
            self.success_rate * 100.0,
            self.successes,
            self.n_episodes
        )?;
        writeln!(
            f,
            "Reward:       {:.2} +/- {:.2} (min {:.2}, max {:.2})",
            self.mean_reward, self.std_reward, self.min_reward, self.max_reward
        )?;
        write!(f, "Mean length:  {:.1} steps", self.mean_length)
    }
}

/// Evaluate a policy for a fixed number of episodes.
///
/// Episodes end on the environment's own terminal or truncation flags;
/// success is the final step's success flag. The environment is reset before
/// the first step, so leftover state from training rollouts does not leak in.
pub fn evaluate<B, M, E>(
    actor: &M,
    env: &mut E,
    config: &EvaluationConfig,
    device: &B::Device,
) -> EvaluationReport
where
    B: Backend,
    M: GoalActor<B>,
    E: GoalEnv,
{
    let input_size = env.obs_size() + env.goal_size();
    assert_eq!(
        actor.input_size(),
        input_size,
        "actor input size {} does not match obs+goal size {}",
        actor.input_size(),
        input_size
    );
    assert_eq!(
        actor.action_dim(),
        env.action_dim(),
        "actor action dim does not match environment"
    );

    fastrand::seed(config.seed);
    let deterministic = config.deterministic;

    run_episodes(env, config.n_episodes, |input_buffer, n_envs| {
        let input = Tensor::<B, 1>::from_floats(input_buffer, device)
            .reshape([n_envs, input_size]);
        let output = actor.forward(input);
        let action_tensor = if deterministic {
            output.deterministic_actions()
        } else {
            output.sample().0
        };
        action_tensor
            .into_data()
            .to_vec::<f32>()
            .expect("Failed to copy actions to host")
    })
}

/// Evaluate uniform-random actions as a baseline.
pub fn evaluate_random<E: GoalEnv>(env: &mut E, config: &EvaluationConfig) -> EvaluationReport {
    fastrand::seed(config.seed);
    let action_dim = env.action_dim();
    let (low, high) = env.action_bounds();

    run_episodes(env, config.n_episodes, |_input_buffer, n_envs| {
        (0..n_envs * action_dim)
            .map(|_| low + fastrand::f32() * (high - low))
            .collect()
    })
}

/// Drive the environment until `n_episodes` episodes finish, asking
/// `select_actions` for a flat action vector each step.
fn run_episodes<E, F>(env: &mut E, n_episodes: usize, mut select_actions: F) -> EvaluationReport
where
    E: GoalEnv,
    F: FnMut(&[f32], usize) -> Vec<f32>,
{
    let n_envs = env.num_envs();
    let obs_size = env.obs_size();
    let goal_size = env.goal_size();
    let input_size = obs_size + goal_size;

    let mut obs_buffer = vec![0.0f32; n_envs * obs_size];
    let mut desired_buffer = vec![0.0f32; n_envs * goal_size];
    let mut input_buffer = vec![0.0f32; n_envs * input_size];

    env.reset_all();
    let mut tracker = EpisodeTracker::new(n_envs);
    let mut episodes: Vec<FinishedEpisode> = Vec::with_capacity(n_episodes);

    while episodes.len() < n_episodes {
        env.write_observations(&mut obs_buffer);
        env.write_desired_goals(&mut desired_buffer);
        for i in 0..n_envs {
            let base = i * input_size;
            input_buffer[base..base + obs_size]
                .copy_from_slice(&obs_buffer[i * obs_size..(i + 1) * obs_size]);
            input_buffer[base + obs_size..base + input_size]
                .copy_from_slice(&desired_buffer[i * goal_size..(i + 1) * goal_size]);
        }

        let actions = select_actions(&input_buffer, n_envs);
        let result = env.step(&actions);

        let mut done_indices = Vec::new();
        for i in 0..n_envs {
            tracker.add_step(i, result.rewards[i]);
            if result.done(i) {
                let outcome = EpisodeOutcome::from_flags(result.terminals[i], result.truncations[i]);
                episodes.push(tracker.finish(i, result.successes[i], outcome));
                done_indices.push(i);
            }
        }
        if !done_indices.is_empty() {
            env.reset_envs(&done_indices);
        }
    }

    episodes.truncate(n_episodes);
    EvaluationReport::from_episodes(&episodes)
}
