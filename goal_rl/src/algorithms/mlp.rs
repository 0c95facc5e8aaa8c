//! Feed-forward actor and critic networks.
//!
//! Two ReLU hidden layers with orthogonal initialization, a near-zero-gain
//! policy head, and a unit-gain value head. The actor optionally carries a
//! log-std head; the critic optionally carries a twin Q network. These cover
//! every configuration the algorithms in this crate need:
//!
//! - DDPG: deterministic actor + single-head critic
//! - TD3:  deterministic actor + twin critic
//! - SAC:  stochastic actor + twin critic

use burn::module::Module;
use burn::tensor::activation::relu;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use super::actor::{GoalActor, GoalActorOutput};
use super::continuous_policy::clamp_log_std;
use super::critic::{GoalCritic, GoalCriticOutput};
use crate::nn::{gains, OrthogonalLinear, OrthogonalLinearConfig};

// ============================================================================
// Actor
// ============================================================================

/// Configuration for [`MlpActor`].
#[derive(Debug, Clone)]
pub struct MlpActorConfig {
    /// Flattened input width (`obs_size + goal_size`).
    pub input_size: usize,
    /// Action dimensionality.
    pub action_dim: usize,
    /// Widths of the two hidden layers.
    pub hidden_sizes: (usize, usize),
    /// Add a log-std head (required for SAC).
    pub stochastic: bool,
    /// Environment action range `(low, high)`.
    pub bounds: (f32, f32),
}

impl MlpActorConfig {
    pub fn new(input_size: usize, action_dim: usize) -> Self {
        Self {
            input_size,
            action_dim,
            hidden_sizes: (256, 256),
            stochastic: false,
            bounds: (-1.0, 1.0),
        }
    }

    pub fn with_hidden_sizes(mut self, hidden_sizes: (usize, usize)) -> Self {
        self.hidden_sizes = hidden_sizes;
        self
    }

    pub fn stochastic(mut self) -> Self {
        self.stochastic = true;
        self
    }

    pub fn with_bounds(mut self, bounds: (f32, f32)) -> Self {
        self.bounds = bounds;
        self
    }

    /// Initialize the actor on the given device.
    pub fn init<B: Backend>(&self, device: &B::Device) -> MlpActor<B> {
        let (h0, h1) = self.hidden_sizes;

        MlpActor {
            hidden_0: OrthogonalLinearConfig::new(self.input_size, h0)
                .with_gain(gains::RELU)
                .init(device),
            hidden_1: OrthogonalLinearConfig::new(h0, h1)
                .with_gain(gains::RELU)
                .init(device),
            mean_head: OrthogonalLinearConfig::new(h1, self.action_dim)
                .with_gain(gains::POLICY_HEAD)
                .init(device),
            log_std_head: self.stochastic.then(|| {
                OrthogonalLinearConfig::new(h1, self.action_dim)
                    .with_gain(gains::POLICY_HEAD)
                    .init(device)
            }),
            input_size: self.input_size,
            action_dim: self.action_dim,
            bound_low: self.bounds.0,
            bound_high: self.bounds.1,
        }
    }
}

/// Two-layer MLP policy over `observation ‖ desired_goal` inputs.
#[derive(Module, Debug)]
pub struct MlpActor<B: Backend> {
    hidden_0: OrthogonalLinear<B>,
    hidden_1: OrthogonalLinear<B>,
    mean_head: OrthogonalLinear<B>,
    log_std_head: Option<OrthogonalLinear<B>>,
    input_size: usize,
    action_dim: usize,
    bound_low: f32,
    bound_high: f32,
}

impl<B: Backend> GoalActor<B> for MlpActor<B> {
    fn forward(&self, input: Tensor<B, 2>) -> GoalActorOutput<B> {
        let x = relu(self.hidden_0.forward(input));
        let x = relu(self.hidden_1.forward(x));

        let mean = self.mean_head.forward(x.clone());
        let log_std = self
            .log_std_head
            .as_ref()
            .map(|head| clamp_log_std(head.forward(x)));

        GoalActorOutput {
            mean,
            log_std,
            bounds: (self.bound_low, self.bound_high),
        }
    }

    fn input_size(&self) -> usize {
        self.input_size
    }

    fn action_dim(&self) -> usize {
        self.action_dim
    }

    fn is_stochastic(&self) -> bool {
        self.log_std_head.is_some()
    }
}

// ============================================================================
// Critic
// ============================================================================

/// Configuration for [`MlpCritic`].
#[derive(Debug, Clone)]
pub struct MlpCriticConfig {
    /// Flattened input width (`obs_size + goal_size`).
    pub input_size: usize,
    /// Action dimensionality.
    pub action_dim: usize,
    /// Widths of the two hidden layers.
    pub hidden_sizes: (usize, usize),
    /// Build a second Q head (TD3, SAC).
    pub twin: bool,
}

impl MlpCriticConfig {
    pub fn new(input_size: usize, action_dim: usize) -> Self {
        Self {
            input_size,
            action_dim,
            hidden_sizes: (256, 256),
            twin: false,
        }
    }

    pub fn with_hidden_sizes(mut self, hidden_sizes: (usize, usize)) -> Self {
        self.hidden_sizes = hidden_sizes;
        self
    }

    pub fn twin(mut self) -> Self {
        self.twin = true;
        self
    }

    /// Initialize the critic on the given device.
    pub fn init<B: Backend>(&self, device: &B::Device) -> MlpCritic<B> {
        let (h0, h1) = self.hidden_sizes;
        let full_input = self.input_size + self.action_dim;

        let make_head = || QHead {
            hidden_0: OrthogonalLinearConfig::new(full_input, h0)
                .with_gain(gains::RELU)
                .init(device),
            hidden_1: OrthogonalLinearConfig::new(h0, h1)
                .with_gain(gains::RELU)
                .init(device),
            output: OrthogonalLinearConfig::new(h1, 1)
                .with_gain(gains::VALUE_HEAD)
                .init(device),
        };

        MlpCritic {
            q1: make_head(),
            q2: self.twin.then(make_head),
            input_size: self.input_size,
            action_dim: self.action_dim,
        }
    }
}

/// One independent Q network over `concat(input, action)`.
#[derive(Module, Debug)]
struct QHead<B: Backend> {
    hidden_0: OrthogonalLinear<B>,
    hidden_1: OrthogonalLinear<B>,
    output: OrthogonalLinear<B>,
}

impl<B: Backend> QHead<B> {
    fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = relu(self.hidden_0.forward(x));
        let x = relu(self.hidden_1.forward(x));
        self.output.forward(x)
    }
}

/// Goal-conditioned Q network, optionally twinned.
#[derive(Module, Debug)]
pub struct MlpCritic<B: Backend> {
    q1: QHead<B>,
    q2: Option<QHead<B>>,
    input_size: usize,
    action_dim: usize,
}

impl<B: Backend> GoalCritic<B> for MlpCritic<B> {
    fn forward(&self, input: Tensor<B, 2>, actions: Tensor<B, 2>) -> GoalCriticOutput<B> {
        let x = Tensor::cat(vec![input, actions], 1);

        GoalCriticOutput {
            q1: self.q1.forward(x.clone()),
            q2: self.q2.as_ref().map(|head| head.forward(x)),
        }
    }

    fn input_size(&self) -> usize {
        self.input_size
    }

    fn action_dim(&self) -> usize {
        self.action_dim
    }

    fn is_twin(&self) -> bool {
        self.q2.is_some()
    }
}
