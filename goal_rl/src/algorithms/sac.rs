//! Soft Actor-Critic with automatic entropy tuning.
//!
//! Maximum-entropy objective: the critic bootstraps through
//! `min(Q1', Q2') - α log π`, the actor minimizes `α log π - min(Q1, Q2)`
//! over its own reparameterized samples, and the temperature α is adapted so
//! the policy's entropy tracks a target (`-action_dim` by default).
//!
//! α is trained by plain gradient descent on `log α`; with the loss
//! `L(α) = -log α · (log π + H_target)` the gradient is a scalar, so a full
//! optimizer would be overkill.

use burn::optim::{GradientsParams, Optimizer};
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::Tensor;

use super::actor::{GoalActor, GoalActorTraining};
use super::critic::{bootstrap_targets, GoalCriticTraining};
use super::update::{to_scalar, Exploration, LossInfo, Optimizers, UpdateModels, UpdateRule};
use crate::core::{TargetNetworkConfig, TargetNetworkManager};
use crate::replay::GoalBatch;

/// Default entropy target for a continuous action space.
pub fn target_entropy_continuous(action_dim: usize) -> f32 {
    -(action_dim as f32)
}

// ============================================================================
// Entropy temperature
// ============================================================================

/// Adaptive entropy temperature.
///
/// Tracks `log α` so the temperature stays positive, and steps it by hand:
/// `∂L/∂log α = -(E[log π] + H_target)`.
#[derive(Debug, Clone)]
pub struct EntropyTuner {
    log_alpha: f32,
    target_entropy: f32,
    auto_tune: bool,
}

impl EntropyTuner {
    pub fn new(initial_alpha: f32, target_entropy: f32, auto_tune: bool) -> Self {
        Self {
            log_alpha: initial_alpha.max(1e-8).ln(),
            target_entropy,
            auto_tune,
        }
    }

    /// Current temperature.
    pub fn alpha(&self) -> f32 {
        self.log_alpha.exp()
    }

    pub fn target_entropy(&self) -> f32 {
        self.target_entropy
    }

    /// One descent step on `log α` given the batch-mean policy log prob.
    ///
    /// Returns the temperature loss, or 0.0 when tuning is disabled.
    pub fn adapt(&mut self, mean_log_prob: f32, lr: f64) -> f32 {
        if !self.auto_tune {
            return 0.0;
        }

        let grad = -(mean_log_prob + self.target_entropy);
        self.log_alpha -= lr as f32 * grad;
        self.alpha() * grad
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// SAC hyperparameters.
#[derive(Debug, Clone)]
pub struct SacConfig {
    /// Discount factor.
    pub gamma: f32,
    /// Polyak coefficient for target critic updates.
    pub tau: f32,
    /// Actor learning rate.
    pub actor_lr: f64,
    /// Critic learning rate.
    pub critic_lr: f64,
    /// Temperature learning rate.
    pub alpha_lr: f64,
    /// Starting temperature.
    pub initial_alpha: f32,
    /// Adapt α during training.
    pub auto_entropy_tuning: bool,
    /// Entropy target; `None` falls back to `-action_dim`.
    pub target_entropy: Option<f32>,
    /// Gradient steps between policy/temperature updates.
    pub policy_update_freq: usize,
}

impl SacConfig {
    pub fn new() -> Self {
        Self {
            gamma: 0.99,
            tau: 0.005,
            actor_lr: 3e-4,
            critic_lr: 3e-4,
            alpha_lr: 3e-4,
            initial_alpha: 1.0,
            auto_entropy_tuning: true,
            target_entropy: None,
            policy_update_freq: 1,
        }
    }

    pub fn with_gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_tau(mut self, tau: f32) -> Self {
        self.tau = tau;
        self
    }

    pub fn with_actor_lr(mut self, lr: f64) -> Self {
        self.actor_lr = lr;
        self
    }

    pub fn with_critic_lr(mut self, lr: f64) -> Self {
        self.critic_lr = lr;
        self
    }

    pub fn with_alpha_lr(mut self, lr: f64) -> Self {
        self.alpha_lr = lr;
        self
    }

    pub fn with_initial_alpha(mut self, alpha: f32) -> Self {
        self.initial_alpha = alpha;
        self
    }

    pub fn with_auto_entropy_tuning(mut self, enabled: bool) -> Self {
        self.auto_entropy_tuning = enabled;
        self
    }

    pub fn with_target_entropy(mut self, target: f32) -> Self {
        self.target_entropy = Some(target);
        self
    }

    pub fn with_policy_update_freq(mut self, freq: usize) -> Self {
        self.policy_update_freq = freq.max(1);
        self
    }
}

impl Default for SacConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Update rule
// ============================================================================

/// SAC update rule. Requires a stochastic actor; the target actor slot is
/// passed through untouched since SAC bootstraps with the online policy.
pub struct SacRule {
    config: SacConfig,
    entropy: EntropyTuner,
    critic_targets: TargetNetworkManager,
    train_steps: usize,
}

impl SacRule {
    pub fn new(config: SacConfig, action_dim: usize) -> Self {
        let target_entropy = config
            .target_entropy
            .unwrap_or_else(|| target_entropy_continuous(action_dim));
        let entropy = EntropyTuner::new(
            config.initial_alpha,
            target_entropy,
            config.auto_entropy_tuning,
        );
        let schedule = TargetNetworkConfig::soft(config.tau);

        Self {
            entropy,
            critic_targets: TargetNetworkManager::new(schedule),
            train_steps: 0,
            config,
        }
    }

    pub fn config(&self) -> &SacConfig {
        &self.config
    }

    pub fn alpha(&self) -> f32 {
        self.entropy.alpha()
    }
}

impl<B, A, C> UpdateRule<B, A, C> for SacRule
where
    B: AutodiffBackend,
    A: GoalActorTraining<B>,
    A::InnerModule: GoalActor<B::InnerBackend>,
    C: GoalCriticTraining<B>,
{
    fn train_step<OA, OC>(
        &mut self,
        models: UpdateModels<A, C>,
        batch: &GoalBatch,
        optimizers: &mut Optimizers<OA, OC>,
        device: &B::Device,
    ) -> (UpdateModels<A, C>, LossInfo)
    where
        OA: Optimizer<A, B>,
        OC: Optimizer<C, B>,
    {
        let UpdateModels {
            mut actor,
            critic,
            target_actor,
            target_critic,
        } = models;

        self.train_steps += 1;
        let alpha = self.entropy.alpha();

        let inputs = batch.inputs_tensor::<B>(device);
        let next_inputs = batch.next_inputs_tensor::<B>(device);
        let actions = batch.actions_tensor::<B>(device);
        let rewards = batch.rewards_tensor::<B>(device);
        let terminals = batch.terminals_tensor::<B>(device);

        // Soft bootstrap: v(s') = min Q'(s', a') - α log π(a'|s'),
        // with a' sampled fresh from the online policy.
        let next_output = actor.forward(next_inputs.clone());
        let (next_actions, next_log_probs) = next_output.sample();
        let min_q_next = target_critic.forward(next_inputs, next_actions).min_q_values();
        let v_next = min_q_next - next_log_probs.mul_scalar(alpha);
        let targets = bootstrap_targets(rewards, terminals, v_next, self.config.gamma);

        let output = critic.forward(inputs.clone(), actions);
        let q1 = output.q1_values();
        let mean_q = to_scalar(q1.clone().mean());

        let critic_loss = match output.q2 {
            Some(q2) => {
                let q2: Tensor<B, 1> = q2.squeeze_dim(1);
                (q1 - targets.clone()).powf_scalar(2.0).mean()
                    + (q2 - targets).powf_scalar(2.0).mean()
            }
            None => (q1 - targets).powf_scalar(2.0).mean(),
        };
        let critic_loss_value = to_scalar(critic_loss.clone());

        let grads = critic_loss.backward();
        let grads = GradientsParams::from_grads(grads, &critic);
        let critic = optimizers.critic.step(self.config.critic_lr, critic, grads);

        // Delayed policy and temperature updates.
        let mut actor_loss_value = 0.0;
        let mut alpha_loss_value = 0.0;
        if self.train_steps % self.config.policy_update_freq == 0 {
            let new_output = actor.forward(inputs.clone());
            let (new_actions, new_log_probs) = new_output.sample();
            let min_q = critic.forward(inputs, new_actions).min_q_values();
            let actor_loss = (new_log_probs.clone().mul_scalar(alpha) - min_q).mean();
            actor_loss_value = to_scalar(actor_loss.clone());

            let grads = actor_loss.backward();
            let grads = GradientsParams::from_grads(grads, &actor);
            actor = optimizers.actor.step(self.config.actor_lr, actor, grads);

            let mean_log_prob = to_scalar(new_log_probs.mean());
            alpha_loss_value = self.entropy.adapt(mean_log_prob, self.config.alpha_lr);
        }

        let target_critic = self.critic_targets.maybe_update(&critic, target_critic, device);

        (
            UpdateModels {
                actor,
                critic,
                target_actor,
                target_critic,
            },
            LossInfo {
                critic_loss: critic_loss_value,
                actor_loss: actor_loss_value,
                alpha_loss: alpha_loss_value,
                alpha: self.entropy.alpha(),
                mean_q,
            },
        )
    }

    fn exploration(&self) -> Exploration {
        Exploration::PolicySample
    }

    fn name(&self) -> &'static str {
        "SAC"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::mlp::{MlpActor, MlpActorConfig, MlpCritic, MlpCriticConfig};
    use burn::backend::{Autodiff, NdArray};
    use burn::optim::AdamConfig;

    type B = Autodiff<NdArray<f32>>;

    #[test]
    fn test_entropy_tuner_moves_alpha_toward_target() {
        let mut tuner = EntropyTuner::new(1.0, -2.0, true);

        // Policy entropy above target (log prob very negative): α should shrink.
        let before = tuner.alpha();
        tuner.adapt(-10.0, 0.1);
        assert!(tuner.alpha() < before);

        // Policy entropy below target: α should grow.
        let mut tuner = EntropyTuner::new(1.0, -2.0, true);
        let before = tuner.alpha();
        tuner.adapt(5.0, 0.1);
        assert!(tuner.alpha() > before);
    }

    #[test]
    fn test_entropy_tuner_disabled_is_frozen() {
        let mut tuner = EntropyTuner::new(0.5, -2.0, false);
        let loss = tuner.adapt(-10.0, 0.1);
        assert_eq!(loss, 0.0);
        assert!((tuner.alpha() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_default_target_entropy() {
        let rule = SacRule::new(SacConfig::new(), 4);
        assert_eq!(rule.entropy.target_entropy(), -4.0);

        let rule = SacRule::new(SacConfig::new().with_target_entropy(-1.5), 4);
        assert_eq!(rule.entropy.target_entropy(), -1.5);
    }

    #[test]
    fn test_train_step_updates_alpha() {
        let device = Default::default();
        let actor = MlpActorConfig::new(4, 2)
            .with_hidden_sizes((16, 16))
            .stochastic()
            .init::<B>(&device);
        let critic = MlpCriticConfig::new(4, 2)
            .with_hidden_sizes((16, 16))
            .twin()
            .init::<B>(&device);

        let models = UpdateModels {
            target_actor: actor.clone(),
            target_critic: critic.clone(),
            actor,
            critic,
        };
        let mut optimizers = Optimizers {
            actor: AdamConfig::new().init(),
            critic: AdamConfig::new().init(),
        };

        let mut batch = GoalBatch::with_capacity(8, 4, 2);
        for i in 0..8 {
            let obs = vec![0.1 * i as f32, 0.2];
            let goal = vec![0.5, -0.5];
            let next_obs = vec![0.1 * (i + 1) as f32, 0.2];
            batch.push(&obs, &next_obs, &goal, &[0.0, 0.0], -1.0, false);
        }

        let mut rule = SacRule::new(SacConfig::new(), 2);
        let alpha_before = rule.alpha();

        let (_, info) = rule.train_step(models, &batch, &mut optimizers, &device);

        assert!(info.critic_loss.is_finite());
        assert!(info.actor_loss.is_finite());
        assert!(info.mean_q.is_finite());
        assert!(info.alpha > 0.0);
        // With auto tuning on and a non-degenerate batch, α moves.
        assert!((info.alpha - alpha_before).abs() > 0.0);
    }

    #[test]
    fn test_exploration_samples_policy() {
        let rule = SacRule::new(SacConfig::new(), 2);
        assert_eq!(
            UpdateRule::<B, MlpActor<B>, MlpCritic<B>>::exploration(&rule),
            Exploration::PolicySample
        );
    }
}
