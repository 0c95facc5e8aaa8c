//! Goal-conditioned transitions, episodes, and training batches.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// One environment step with both goal views attached.
///
/// `achieved_goal` is what the step actually accomplished; `desired_goal` is
/// what the episode was asked to accomplish. Hindsight relabeling swaps the
/// desired goal after the fact, which is why both are stored even though the
/// reward was computed against the desired one.
#[derive(Debug, Clone)]
pub struct GoalTransition {
    pub observation: Vec<f32>,
    pub achieved_goal: Vec<f32>,
    pub desired_goal: Vec<f32>,
    pub action: Vec<f32>,
    pub reward: f32,
    pub next_observation: Vec<f32>,
    pub next_achieved_goal: Vec<f32>,
    /// True environment termination (not horizon truncation).
    pub terminal: bool,
    /// Horizon truncation.
    pub truncated: bool,
}

impl GoalTransition {
    pub fn obs_size(&self) -> usize {
        self.observation.len()
    }

    pub fn goal_size(&self) -> usize {
        self.desired_goal.len()
    }

    pub fn action_dim(&self) -> usize {
        self.action.len()
    }
}

/// An ordered run of transitions from reset to termination or truncation.
///
/// Episodes are the unit of storage in hindsight replay: relabeling needs to
/// look forward within the episode a transition came from.
#[derive(Debug, Clone, Default)]
pub struct GoalEpisode {
    transitions: Vec<GoalTransition>,
}

impl GoalEpisode {
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            transitions: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, transition: GoalTransition) {
        self.transitions.push(transition);
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn transitions(&self) -> &[GoalTransition] {
        &self.transitions
    }

    /// The goal actually reached at the end of the episode.
    pub fn final_achieved_goal(&self) -> Option<&[f32]> {
        self.transitions
            .last()
            .map(|t| t.next_achieved_goal.as_slice())
    }

    /// Sum of stored rewards.
    pub fn total_reward(&self) -> f32 {
        self.transitions.iter().map(|t| t.reward).sum()
    }
}

/// A flattened batch ready for tensor conversion.
///
/// Inputs are the concatenation `observation ‖ desired_goal`; after hindsight
/// relabeling the stored goal may differ from the one the transition was
/// collected under, with the reward recomputed to match.
#[derive(Debug, Clone)]
pub struct GoalBatch {
    pub inputs: Vec<f32>,
    pub next_inputs: Vec<f32>,
    pub actions: Vec<f32>,
    pub rewards: Vec<f32>,
    /// 1.0 for true terminations, 0.0 otherwise.
    pub terminals: Vec<f32>,
    input_size: usize,
    action_dim: usize,
}

impl GoalBatch {
    pub fn with_capacity(capacity: usize, input_size: usize, action_dim: usize) -> Self {
        Self {
            inputs: Vec::with_capacity(capacity * input_size),
            next_inputs: Vec::with_capacity(capacity * input_size),
            actions: Vec::with_capacity(capacity * action_dim),
            rewards: Vec::with_capacity(capacity),
            terminals: Vec::with_capacity(capacity),
            input_size,
            action_dim,
        }
    }

    /// Append one (possibly relabeled) transition.
    pub fn push(
        &mut self,
        observation: &[f32],
        next_observation: &[f32],
        goal: &[f32],
        action: &[f32],
        reward: f32,
        terminal: bool,
    ) {
        debug_assert_eq!(observation.len() + goal.len(), self.input_size);
        debug_assert_eq!(action.len(), self.action_dim);

        self.inputs.extend_from_slice(observation);
        self.inputs.extend_from_slice(goal);
        self.next_inputs.extend_from_slice(next_observation);
        self.next_inputs.extend_from_slice(goal);
        self.actions.extend_from_slice(action);
        self.rewards.push(reward);
        self.terminals.push(if terminal { 1.0 } else { 0.0 });
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn action_dim(&self) -> usize {
        self.action_dim
    }

    pub fn inputs_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 2> {
        Tensor::<B, 1>::from_floats(self.inputs.as_slice(), device)
            .reshape([self.len(), self.input_size])
    }

    pub fn next_inputs_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 2> {
        Tensor::<B, 1>::from_floats(self.next_inputs.as_slice(), device)
            .reshape([self.len(), self.input_size])
    }

    pub fn actions_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 2> {
        Tensor::<B, 1>::from_floats(self.actions.as_slice(), device)
            .reshape([self.len(), self.action_dim])
    }

    pub fn rewards_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 1> {
        Tensor::from_floats(self.rewards.as_slice(), device)
    }

    pub fn terminals_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 1> {
        Tensor::from_floats(self.terminals.as_slice(), device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type B = NdArray<f32>;

    fn transition(step: usize) -> GoalTransition {
        GoalTransition {
            observation: vec![step as f32, 0.0],
            achieved_goal: vec![step as f32],
            desired_goal: vec![10.0],
            action: vec![0.5],
            reward: -1.0,
            next_observation: vec![step as f32 + 1.0, 0.0],
            next_achieved_goal: vec![step as f32 + 1.0],
            terminal: false,
            truncated: false,
        }
    }

    #[test]
    fn test_episode_final_achieved_goal() {
        let mut episode = GoalEpisode::new();
        assert!(episode.final_achieved_goal().is_none());

        for step in 0..5 {
            episode.push(transition(step));
        }

        assert_eq!(episode.len(), 5);
        assert_eq!(episode.final_achieved_goal(), Some(&[5.0][..]));
        assert_eq!(episode.total_reward(), -5.0);
    }

    #[test]
    fn test_batch_layout() {
        let mut batch = GoalBatch::with_capacity(2, 3, 1);
        batch.push(&[1.0, 2.0], &[3.0, 4.0], &[9.0], &[0.5], -1.0, false);
        batch.push(&[5.0, 6.0], &[7.0, 8.0], &[9.0], &[-0.5], 0.0, true);

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.inputs, vec![1.0, 2.0, 9.0, 5.0, 6.0, 9.0]);
        assert_eq!(batch.next_inputs, vec![3.0, 4.0, 9.0, 7.0, 8.0, 9.0]);
        assert_eq!(batch.terminals, vec![0.0, 1.0]);
    }

    #[test]
    fn test_batch_tensor_shapes() {
        let device = Default::default();
        let mut batch = GoalBatch::with_capacity(4, 3, 2);
        for _ in 0..4 {
            batch.push(&[0.0, 0.0], &[0.0, 0.0], &[1.0], &[0.1, 0.2], -1.0, false);
        }

        assert_eq!(batch.inputs_tensor::<B>(&device).dims(), [4, 3]);
        assert_eq!(batch.next_inputs_tensor::<B>(&device).dims(), [4, 3]);
        assert_eq!(batch.actions_tensor::<B>(&device).dims(), [4, 2]);
        assert_eq!(batch.rewards_tensor::<B>(&device).dims(), [4]);
        assert_eq!(batch.terminals_tensor::<B>(&device).dims(), [4]);
    }
}
