//! Training loop configuration and statistics.

use crate::checkpoint::CheckpointConfig;
use crate::replay::HerConfig;

/// Configuration for [`OffPolicyTrainer`](super::OffPolicyTrainer).
///
/// Algorithm hyperparameters (learning rates, discount, entropy settings)
/// live in the per-algorithm configs; this struct covers everything around
/// them: rollout collection, replay, learner pacing, and termination.
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    // ========================================================================
    // Rollout collection
    // ========================================================================
    /// Number of collector threads.
    pub n_actors: usize,
    /// Parallel environments per collector.
    pub n_envs_per_actor: usize,
    /// Environment steps taken with uniform random actions before the policy
    /// is consulted.
    pub warmup_env_steps: usize,
    /// Base RNG seed; collectors derive per-thread seeds from it.
    pub seed: u64,

    // ========================================================================
    // Replay
    // ========================================================================
    /// Hindsight replay buffer settings.
    pub buffer: HerConfig,

    // ========================================================================
    // Learner pacing
    // ========================================================================
    /// Gradient steps per environment step the learner aims for.
    pub utd_ratio: f32,
    /// Sleep when the learner is ahead of its update-to-data target.
    pub sleep_when_ahead_ms: u64,
    /// Global-norm gradient clipping for both optimizers.
    pub max_grad_norm: Option<f32>,
    /// Gradient steps between weight publications; collectors poll at the
    /// same cadence in environment steps.
    pub model_update_freq: usize,

    // ========================================================================
    // Termination
    // ========================================================================
    /// Hard stop after this many environment steps.
    pub max_env_steps: usize,
    /// Stop early once the windowed success rate reaches this value.
    pub target_success_rate: Option<f32>,
    /// Episodes in the rolling success/return window.
    pub success_window: usize,

    // ========================================================================
    // Logging and checkpoints
    // ========================================================================
    /// Seconds between stats callbacks.
    pub log_interval_secs: f32,
    /// Periodic policy snapshots; `None` disables checkpointing.
    pub checkpoint: Option<CheckpointConfig>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            n_actors: 2,
            n_envs_per_actor: 4,
            warmup_env_steps: 1_000,
            seed: 0,
            buffer: HerConfig::default(),
            utd_ratio: 1.0,
            sleep_when_ahead_ms: 2,
            max_grad_norm: None,
            model_update_freq: 50,
            max_env_steps: 1_000_000,
            target_success_rate: None,
            success_window: 100,
            log_interval_secs: 5.0,
            checkpoint: None,
        }
    }
}

impl TrainerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Small settings for smoke runs and tests: one collector, tiny buffer,
    /// short horizon.
    pub fn quick() -> Self {
        Self {
            n_actors: 1,
            n_envs_per_actor: 2,
            warmup_env_steps: 64,
            buffer: HerConfig::default()
                .with_capacity(10_000)
                .with_min_size(128)
                .with_batch_size(32),
            model_update_freq: 10,
            max_env_steps: 2_000,
            success_window: 20,
            log_interval_secs: 1.0,
            ..Self::default()
        }
    }

    /// Total parallel environments across all collectors.
    pub fn total_envs(&self) -> usize {
        self.n_actors * self.n_envs_per_actor
    }

    pub fn with_n_actors(mut self, n: usize) -> Self {
        self.n_actors = n.max(1);
        self
    }

    pub fn with_n_envs_per_actor(mut self, n: usize) -> Self {
        self.n_envs_per_actor = n.max(1);
        self
    }

    pub fn with_warmup_env_steps(mut self, steps: usize) -> Self {
        self.warmup_env_steps = steps;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_buffer(mut self, buffer: HerConfig) -> Self {
        self.buffer = buffer;
        self
    }

    pub fn with_utd_ratio(mut self, ratio: f32) -> Self {
        self.utd_ratio = ratio;
        self
    }

    pub fn with_sleep_when_ahead_ms(mut self, ms: u64) -> Self {
        self.sleep_when_ahead_ms = ms;
        self
    }

    pub fn with_max_grad_norm(mut self, norm: f32) -> Self {
        self.max_grad_norm = Some(norm);
        self
    }

    pub fn with_model_update_freq(mut self, freq: usize) -> Self {
        self.model_update_freq = freq.max(1);
        self
    }

    pub fn with_max_env_steps(mut self, steps: usize) -> Self {
        self.max_env_steps = steps;
        self
    }

    pub fn with_target_success_rate(mut self, rate: f32) -> Self {
        self.target_success_rate = Some(rate);
        self
    }

    pub fn with_success_window(mut self, window: usize) -> Self {
        self.success_window = window.max(1);
        self
    }

    pub fn with_log_interval_secs(mut self, secs: f32) -> Self {
        self.log_interval_secs = secs;
        self
    }

    pub fn with_checkpoint(mut self, checkpoint: CheckpointConfig) -> Self {
        self.checkpoint = Some(checkpoint);
        self
    }
}

/// Live training statistics handed to the stats callback.
#[derive(Debug, Clone, Default)]
pub struct TrainerStats {
    pub env_steps: usize,
    pub train_steps: usize,
    pub episodes: usize,
    /// Mean undiscounted return over the rolling window.
    pub mean_return: f32,
    /// Fraction of successful episodes over the rolling window.
    pub success_rate: f32,
    /// Mean episode length over the rolling window.
    pub mean_episode_length: f32,
    pub critic_loss: f32,
    pub actor_loss: f32,
    pub alpha_loss: f32,
    pub alpha: f32,
    pub mean_q: f32,
    /// Replay buffer fill level in `[0, 1]`.
    pub buffer_utilization: f32,
    /// Environment steps per second since training started.
    pub sps: f32,
    pub elapsed_secs: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_envs() {
        let config = TrainerConfig::new().with_n_actors(3).with_n_envs_per_actor(4);
        assert_eq!(config.total_envs(), 12);
    }

    #[test]
    fn test_quick_preset_is_small() {
        let config = TrainerConfig::quick();
        assert_eq!(config.n_actors, 1);
        assert!(config.max_env_steps <= 10_000);
        assert!(config.buffer.min_size <= 256);
    }

    #[test]
    fn test_builders_clamp_zero() {
        let config = TrainerConfig::new()
            .with_n_actors(0)
            .with_model_update_freq(0)
            .with_success_window(0);
        assert_eq!(config.n_actors, 1);
        assert_eq!(config.model_update_freq, 1);
        assert_eq!(config.success_window, 1);
    }
}
