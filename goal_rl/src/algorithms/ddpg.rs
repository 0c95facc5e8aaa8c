//! Deep Deterministic Policy Gradient.
//!
//! The simplest of the three update rules: a deterministic actor trained to
//! ascend a single Q head, with soft target updates every gradient step and
//! Gaussian action noise for exploration.

use burn::optim::{GradientsParams, Optimizer};
use burn::tensor::backend::AutodiffBackend;

use super::actor::{GoalActor, GoalActorTraining};
use super::critic::{bootstrap_targets, GoalCriticTraining};
use super::update::{to_scalar, Exploration, LossInfo, Optimizers, UpdateModels, UpdateRule};
use crate::core::{TargetNetworkConfig, TargetNetworkManager};
use crate::replay::GoalBatch;

/// DDPG hyperparameters.
#[derive(Debug, Clone)]
pub struct DdpgConfig {
    /// Discount factor.
    pub gamma: f32,
    /// Polyak coefficient for target updates.
    pub tau: f32,
    /// Actor learning rate.
    pub actor_lr: f64,
    /// Critic learning rate.
    pub critic_lr: f64,
    /// Std of the Gaussian exploration noise added during rollouts.
    pub exploration_sigma: f32,
}

impl DdpgConfig {
    pub fn new() -> Self {
        Self {
            gamma: 0.99,
            tau: 0.005,
            actor_lr: 1e-3,
            critic_lr: 1e-3,
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

    pub fn with_exploration_sigma(mut self, sigma: f32) -> Self {
        self.exploration_sigma = sigma;
        self
    }
}

impl Default for DdpgConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// DDPG update rule. Works with a single-head critic; with a twin critic it
/// simply ignores the second head.
pub struct DdpgRule {
    config: DdpgConfig,
    actor_targets: TargetNetworkManager,
    critic_targets: TargetNetworkManager,
}

impl DdpgRule {
    pub fn new(config: DdpgConfig) -> Self {
        let schedule = TargetNetworkConfig::soft(config.tau);
        Self {
            actor_targets: TargetNetworkManager::new(schedule.clone()),
            critic_targets: TargetNetworkManager::new(schedule),
            config,
        }
    }

    pub fn config(&self) -> &DdpgConfig {
        &self.config
    }
}

impl<B, A, C> UpdateRule<B, A, C> for DdpgRule
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
            actor,
            critic,
            target_actor,
            target_critic,
        } = models;

        let inputs = batch.inputs_tensor::<B>(device);
        let next_inputs = batch.next_inputs_tensor::<B>(device);
        let actions = batch.actions_tensor::<B>(device);
        let rewards = batch.rewards_tensor::<B>(device);
        let terminals = batch.terminals_tensor::<B>(device);

        // Critic: one-step TD against the target networks.
        let next_actions = target_actor.forward(next_inputs.clone()).deterministic_actions();
        let next_q = target_critic.forward(next_inputs, next_actions).q1_values();
        let targets = bootstrap_targets(rewards, terminals, next_q, self.config.gamma);

        let q = critic.forward(inputs.clone(), actions).q1_values();
        let mean_q = to_scalar(q.clone().mean());
        let critic_loss = (q - targets).powf_scalar(2.0).mean();
        let critic_loss_value = to_scalar(critic_loss.clone());

        let grads = critic_loss.backward();
        let grads = GradientsParams::from_grads(grads, &critic);
        let critic = optimizers.critic.step(self.config.critic_lr, critic, grads);

        // Actor: ascend Q(s, π(s)) through the freshly updated critic.
        let new_actions = actor.forward(inputs.clone()).deterministic_actions();
        let actor_loss = critic.forward(inputs, new_actions).q1_values().mean().neg();
        let actor_loss_value = to_scalar(actor_loss.clone());

        let grads = actor_loss.backward();
        let grads = GradientsParams::from_grads(grads, &actor);
        let actor = optimizers.actor.step(self.config.actor_lr, actor, grads);

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
        "DDPG"
    }
}
