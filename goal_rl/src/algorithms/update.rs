//! The seam between the training loop and the individual algorithms.
//!
//! The learner thread owns four networks (actor, critic, and their targets)
//! plus the optimizers, and hands them to an [`UpdateRule`] once per gradient
//! step. DDPG, TD3, and SAC are each one implementation of this trait; the
//! rollout and replay machinery never needs to know which is running.

use burn::optim::Optimizer;
use burn::tensor::backend::{AutodiffBackend, Backend};
use burn::tensor::{ElementConversion, Tensor};

use super::actor::{GoalActor, GoalActorTraining};
use super::critic::GoalCriticTraining;
use crate::replay::GoalBatch;

/// Pull a single-element tensor down to an `f32` diagnostic.
pub(crate) fn to_scalar<B: Backend>(value: Tensor<B, 1>) -> f32 {
    value.into_scalar().elem::<f32>()
}

/// The four networks threaded through a gradient step.
///
/// Owned by value so optimizer steps can consume and rebuild the online
/// networks; target networks ride along untouched except when the rule's
/// schedule updates them. Algorithms without a target actor (SAC) pass it
/// through unchanged.
pub struct UpdateModels<A, C> {
    pub actor: A,
    pub critic: C,
    pub target_actor: A,
    pub target_critic: C,
}

/// Actor and critic optimizer pair.
pub struct Optimizers<OA, OC> {
    pub actor: OA,
    pub critic: OC,
}

/// Scalar diagnostics from one gradient step.
#[derive(Debug, Clone, Copy, Default)]
pub struct LossInfo {
    pub critic_loss: f32,
    /// Zero on steps where the policy update was skipped (delayed updates).
    pub actor_loss: f32,
    /// Entropy temperature loss; zero for algorithms without one.
    pub alpha_loss: f32,
    /// Current entropy temperature; zero for DDPG and TD3.
    pub alpha: f32,
    /// Mean Q estimate over the batch (first head).
    pub mean_q: f32,
}

/// How rollout workers should perturb the policy when collecting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Exploration {
    /// Greedy action plus clamped Gaussian noise (DDPG, TD3).
    GaussianNoise { sigma: f32 },
    /// Sample from the policy's own distribution (SAC).
    PolicySample,
}

/// One off-policy algorithm: how to turn a replay batch into gradient steps.
///
/// Rules are stateful: they count their own gradient steps for delayed
/// policy updates and own their target-network schedules.
pub trait UpdateRule<B, A, C>: Send + 'static
where
    B: AutodiffBackend,
    A: GoalActorTraining<B>,
    A::InnerModule: GoalActor<B::InnerBackend>,
    C: GoalCriticTraining<B>,
{
    /// Run one gradient step and return the updated networks.
    fn train_step<OA, OC>(
        &mut self,
        models: UpdateModels<A, C>,
        batch: &GoalBatch,
        optimizers: &mut Optimizers<OA, OC>,
        device: &B::Device,
    ) -> (UpdateModels<A, C>, LossInfo)
    where
        OA: Optimizer<A, B>,
        OC: Optimizer<C, B>;

    /// Exploration scheme rollout workers should apply for this algorithm.
    fn exploration(&self) -> Exploration;

    /// Short algorithm name for logs.
    fn name(&self) -> &'static str;
}
