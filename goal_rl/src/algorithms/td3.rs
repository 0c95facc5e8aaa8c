//! Twin Delayed Deep Deterministic Policy Gradient.
//!
//! DDPG plus the three TD3 fixes: clipped double-Q targets, target policy
//! smoothing, and delayed policy/target updates. Requires a twin critic.

use burn::optim::{GradientsParams, Optimizer};
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::{Distribution, Tensor};

use super::actor::{GoalActor, GoalActorTraining};
use super::critic::{bootstrap_targets, GoalCriticTraining};
use super::update::{to_scalar, Exploration, LossInfo, Optimizers, UpdateModels, UpdateRule};
use crate::core::{TargetNetworkConfig, TargetNetworkManager};
use crate::replay::GoalBatch;

/// TD3 hyperparameters.
#[derive(Debug, Clone)]
pub struct Td3Config {
    /// Discount factor.
    pub gamma: f32,
    /// Polyak coefficient for target updates.
    pub tau: f32,
    /// Actor learning rate.
    pub actor_lr: f64,
    /// Critic learning rate.
    pub critic_lr: f64,
    /// Gradient steps between policy and target updates.
    pub policy_delay: usize,
    /// Std of the smoothing noise added to target policy actions.
    pub target_noise: f32,
    /// Clamp for the smoothing noise.
    pub noise_clip: f32,
    /// Std of the Gaussian exploration noise added during rollouts.
    pub exploration_sigma: f32,
}

impl Td3Config {
    pub fn new() -> Self {
        Self {
            gamma: 0.99,
            tau: 0.005,
            actor_lr: 1e-3,
            critic_lr: 1e-3,
            policy_delay: 2,
            target_noise: 0.2,
            noise_clip: 0.5,
            exploration_sigma: 0.1,
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

    pub fn with_policy_delay(mut self, delay: usize) -> Self {
        self.policy_delay = delay.max(1);
        self
    }

    pub fn with_target_noise(mut self, noise: f32) -> Self {
        self.target_noise = noise;
        self
    }

    pub fn with_noise_clip(mut self, clip: f32) -> Self {
        self.noise_clip = clip;
        self
    }

    pub fn with_exploration_sigma(mut self, sigma: f32) -> Self {
        self.exploration_sigma = sigma;
        self
    }
}

impl Default for Td3Config {
    fn default() -> Self {
        Self::new()
    }
}

/// TD3 update rule.
pub struct Td3Rule {
    config: Td3Config,
    actor_targets: TargetNetworkManager,
    critic_targets: TargetNetworkManager,
    train_steps: usize,
}

impl Td3Rule {
    pub fn new(config: Td3Config) -> Self {
        // Targets move on the same delayed cadence as the policy.
        let schedule =
            TargetNetworkConfig::soft(config.tau).with_update_freq(config.policy_delay);
        Self {
            actor_targets: TargetNetworkManager::new(schedule.clone()),
            critic_targets: TargetNetworkManager::new(schedule),
            train_steps: 0,
            config,
        }
    }

    pub fn config(&self) -> &Td3Config {
        &self.config
    }
}

impl<B, A, C> UpdateRule<B, A, C> for Td3Rule
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

        let inputs = batch.inputs_tensor::<B>(device);
        let next_inputs = batch.next_inputs_tensor::<B>(device);
        let actions = batch.actions_tensor::<B>(device);
        let rewards = batch.rewards_tensor::<B>(device);
        let terminals = batch.terminals_tensor::<B>(device);

        // Smoothed target actions: π'(s') plus clamped Gaussian noise,
        // re-clamped to the action bounds.
        let next_output = target_actor.forward(next_inputs.clone());
        let (low, high) = next_output.bounds;
        let next_actions = next_output.deterministic_actions();
        let noise: Tensor<B, 2> = Tensor::random(
            next_actions.dims(),
            Distribution::Normal(0.0, self.config.target_noise as f64),
            device,
        )
        .clamp(-self.config.noise_clip, self.config.noise_clip);
        let next_actions = (next_actions + noise).clamp(low, high);

        // Clipped double-Q bootstrap.
        let next_q = target_critic.forward(next_inputs, next_actions).min_q_values();
        let targets = bootstrap_targets(rewards, terminals, next_q, self.config.gamma);

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

        // Delayed policy update, always through the first head.
        let mut actor_loss_value = 0.0;
        if self.train_steps % self.config.policy_delay == 0 {
            let new_actions = actor.forward(inputs.clone()).deterministic_actions();
            let actor_loss = critic.forward(inputs, new_actions).q1_values().mean().neg();
            actor_loss_value = to_scalar(actor_loss.clone());

            let grads = actor_loss.backward();
            let grads = GradientsParams::from_grads(grads, &actor);
            actor = optimizers.actor.step(self.config.actor_lr, actor, grads);
        }

        // Managers tick every step and fire on the delayed cadence.
        let target_actor = self.actor_targets.maybe_update(&actor, target_actor, device);
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
                mean_q,
                ..Default::default()
            },
        )
    }

    fn exploration(&self) -> Exploration {
        Exploration::GaussianNoise {
            sigma: self.config.exploration_sigma,
        }
    }

    fn name(&self) -> &'static str {
        "TD3"
    }
}
