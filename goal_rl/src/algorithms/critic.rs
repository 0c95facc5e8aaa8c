//! Critic abstraction for goal-conditioned Q learning.
//!
//! Critics score `(observation ‖ desired_goal, action)` pairs. TD3 and SAC
//! use twin heads and take the minimum when forming bootstrap targets to
//! counteract overestimation; DDPG uses a single head. [`GoalCriticOutput`]
//! folds both shapes into one type.

use burn::module::{AutodiffModule, Module};
use burn::tensor::backend::{AutodiffBackend, Backend};
use burn::tensor::Tensor;

/// Q estimates from one critic forward pass, `[batch, 1]` each.
#[derive(Debug, Clone)]
pub struct GoalCriticOutput<B: Backend> {
    pub q1: Tensor<B, 2>,
    pub q2: Option<Tensor<B, 2>>,
}

impl<B: Backend> GoalCriticOutput<B> {
    /// Element-wise minimum over heads; `q1` when the critic is single-headed.
    pub fn min_q(&self) -> Tensor<B, 2> {
        match &self.q2 {
            Some(q2) => self.q1.clone().min_pair(q2.clone()),
            None => self.q1.clone(),
        }
    }

    /// First head flattened to `[batch]`.
    pub fn q1_values(&self) -> Tensor<B, 1> {
        self.q1.clone().squeeze_dim(1)
    }

    /// Minimum over heads flattened to `[batch]`.
    pub fn min_q_values(&self) -> Tensor<B, 1> {
        self.min_q().squeeze_dim(1)
    }
}

/// A goal-conditioned action-value network.
pub trait GoalCritic<B: Backend>: Module<B> {
    /// Score a batch of `(input, action)` pairs.
    ///
    /// `input` is the flattened `observation ‖ desired_goal`, `[batch,
    /// input_size]`; `actions` is `[batch, action_dim]`.
    fn forward(&self, input: Tensor<B, 2>, actions: Tensor<B, 2>) -> GoalCriticOutput<B>;

    /// Expected flattened input width (`obs_size + goal_size`).
    fn input_size(&self) -> usize;

    /// Action dimensionality.
    fn action_dim(&self) -> usize;

    /// Whether the critic carries a second head.
    fn is_twin(&self) -> bool;
}

/// Trainable critic. Critics only ever run on the learner, so no inner-module
/// bound is required here.
pub trait GoalCriticTraining<B: AutodiffBackend>: GoalCritic<B> + AutodiffModule<B> {}

impl<B, M> GoalCriticTraining<B> for M
where
    B: AutodiffBackend,
    M: GoalCritic<B> + AutodiffModule<B>,
{
}

/// One-step TD targets: `y = r + γ (1 - terminal) v_next`.
///
/// `terminals` is 1.0 only for true environment terminations; horizon
/// truncations keep bootstrapping through `v_next`.
pub fn bootstrap_targets<B: Backend>(
    rewards: Tensor<B, 1>,
    terminals: Tensor<B, 1>,
    next_values: Tensor<B, 1>,
    gamma: f32,
) -> Tensor<B, 1> {
    let not_done = terminals.mul_scalar(-1.0).add_scalar(1.0);
    rewards + not_done * next_values.mul_scalar(gamma)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type B = NdArray<f32>;

    #[test]
    fn test_min_q_twin_heads() {
        let device = Default::default();
        let output = GoalCriticOutput::<B> {
            q1: Tensor::from_floats([[1.0], [5.0]], &device),
            q2: Some(Tensor::from_floats([[2.0], [3.0]], &device)),
        };

        let min_q = output.min_q_values().into_data();
        assert_eq!(min_q.as_slice::<f32>().unwrap(), &[1.0, 3.0]);
    }

    #[test]
    fn test_min_q_single_head_passthrough() {
        let device = Default::default();
        let output = GoalCriticOutput::<B> {
            q1: Tensor::from_floats([[4.0], [-2.0]], &device),
            q2: None,
        };

        let min_q = output.min_q_values().into_data();
        assert_eq!(min_q.as_slice::<f32>().unwrap(), &[4.0, -2.0]);
    }

    #[test]
    fn test_bootstrap_targets_mask_terminals() {
        let device = Default::default();
        let rewards: Tensor<B, 1> = Tensor::from_floats([-1.0, -1.0, 0.0], &device);
        let terminals: Tensor<B, 1> = Tensor::from_floats([0.0, 1.0, 0.0], &device);
        let next_values: Tensor<B, 1> = Tensor::from_floats([10.0, 10.0, -5.0], &device);

        let targets = bootstrap_targets(rewards, terminals, next_values, 0.9);
        let data = targets.into_data();
        let slice = data.as_slice::<f32>().unwrap();

        assert!((slice[0] - 8.0).abs() < 1e-5);
        assert!((slice[1] + 1.0).abs() < 1e-5);
        assert!((slice[2] + 4.5).abs() < 1e-5);
    }
}
