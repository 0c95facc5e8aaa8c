//! Actor abstraction shared by the off-policy algorithms.
//!
//! An actor maps a flattened `observation ‖ desired_goal` input to an action
//! distribution. Deterministic policies (DDPG, TD3) expose only a mean;
//! stochastic policies (SAC) add a log-std head. Both are consumed through
//! [`GoalActorOutput`], so update rules and rollout loops never branch on the
//! concrete policy type.

use burn::module::{AutodiffModule, Module};
use burn::tensor::backend::{AutodiffBackend, Backend};
use burn::tensor::{activation::tanh, Tensor};

use super::continuous_policy::{sample_squashed_gaussian, scale_action};

/// Raw policy head outputs plus the action bounds they scale to.
#[derive(Debug, Clone)]
pub struct GoalActorOutput<B: Backend> {
    /// Pre-squash action mean, `[batch, action_dim]`.
    pub mean: Tensor<B, 2>,
    /// Pre-squash log standard deviation, `None` for deterministic policies.
    pub log_std: Option<Tensor<B, 2>>,
    /// Environment action range `(low, high)` shared across dimensions.
    pub bounds: (f32, f32),
}

impl<B: Backend> GoalActorOutput<B> {
    /// Greedy action: squashed mean scaled into the environment range.
    pub fn deterministic_actions(&self) -> Tensor<B, 2> {
        scale_action(tanh(self.mean.clone()), self.bounds.0, self.bounds.1)
    }

    /// Reparameterized sample scaled into the environment range.
    ///
    /// Returns `(actions, log_probs)`. Log probabilities are those of the
    /// squashed action before bound scaling; with the unit bounds used
    /// throughout this workspace the two coincide. Deterministic policies
    /// return the greedy action with zero log probability.
    pub fn sample(&self) -> (Tensor<B, 2>, Tensor<B, 1>) {
        match &self.log_std {
            Some(log_std) => {
                let (squashed, log_probs) =
                    sample_squashed_gaussian(self.mean.clone(), log_std.clone());
                let actions = scale_action(squashed, self.bounds.0, self.bounds.1);
                (actions, log_probs)
            }
            None => {
                let actions = self.deterministic_actions();
                let batch_size = actions.dims()[0];
                let log_probs = Tensor::zeros([batch_size], &actions.device());
                (actions, log_probs)
            }
        }
    }

    /// Number of parallel inputs this output was produced for.
    pub fn batch_size(&self) -> usize {
        self.mean.dims()[0]
    }
}

/// A goal-conditioned policy network.
///
/// Inputs are always the flattened concatenation `observation ‖ desired_goal`
/// of size [`GoalActor::input_size`].
pub trait GoalActor<B: Backend>: Module<B> {
    /// Compute the action distribution for a batch of inputs.
    fn forward(&self, input: Tensor<B, 2>) -> GoalActorOutput<B>;

    /// Expected flattened input width (`obs_size + goal_size`).
    fn input_size(&self) -> usize;

    /// Action dimensionality.
    fn action_dim(&self) -> usize;

    /// Whether the policy has a log-std head.
    fn is_stochastic(&self) -> bool;
}

/// Trainable actor whose inference copy (`.valid()`) is itself a [`GoalActor`].
///
/// Rollout workers run the inner-backend copy while the learner trains the
/// autodiff one; this bound keeps both sides usable through the same trait.
pub trait GoalActorTraining<B: AutodiffBackend>: GoalActor<B> + AutodiffModule<B>
where
    Self::InnerModule: GoalActor<B::InnerBackend>,
{
}

impl<B, M> GoalActorTraining<B> for M
where
    B: AutodiffBackend,
    M: GoalActor<B> + AutodiffModule<B>,
    M::InnerModule: GoalActor<B::InnerBackend>,
{
}
