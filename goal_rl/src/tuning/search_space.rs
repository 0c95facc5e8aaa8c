//! Hyperparameter sampling ranges.

use serde::{Deserialize, Serialize};

/// Network width presets searched over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetArch {
    Small,
    Medium,
    Big,
}

impl NetArch {
    pub const ALL: [NetArch; 3] = [NetArch::Small, NetArch::Medium, NetArch::Big];

    /// Hidden layer widths for [`crate::algorithms::MlpActorConfig`] /
    /// [`crate::algorithms::MlpCriticConfig`].
    pub fn hidden_sizes(self) -> (usize, usize) {
        match self {
            NetArch::Small => (64, 64),
            NetArch::Medium => (128, 128),
            NetArch::Big => (256, 256),
        }
    }
}

/// One sampled configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrialParams {
    pub learning_rate: f64,
    pub net_arch: NetArch,
}

/// Ranges from which [`TrialParams`] are drawn.
#[derive(Debug, Clone)]
pub struct SearchSpace {
    /// Lower bound of the log-uniform learning-rate range.
    pub lr_low: f64,
    /// Upper bound of the log-uniform learning-rate range.
    pub lr_high: f64,
    /// Candidate network widths (uniform choice).
    pub architectures: Vec<NetArch>,
}

impl Default for SearchSpace {
    fn default() -> Self {
        Self {
            lr_low: 1e-5,
            lr_high: 1e-3,
            architectures: NetArch::ALL.to_vec(),
        }
    }
}

impl SearchSpace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_learning_rate_range(mut self, low: f64, high: f64) -> Self {
        assert!(low > 0.0 && high >= low, "invalid learning-rate range");
        self.lr_low = low;
        self.lr_high = high;
        self
    }

    pub fn with_architectures(mut self, architectures: &[NetArch]) -> Self {
        assert!(!architectures.is_empty(), "need at least one architecture");
        self.architectures = architectures.to_vec();
        self
    }

    /// Draw one configuration: log-uniform learning rate, uniform
    /// architecture choice.
    pub fn sample(&self, rng: &mut fastrand::Rng) -> TrialParams {
        let log_low = self.lr_low.ln();
        let log_high = self.lr_high.ln();
        let learning_rate = (log_low + rng.f64() * (log_high - log_low)).exp();
        let net_arch = self.architectures[rng.usize(..self.architectures.len())];

        TrialParams {
            learning_rate,
            net_arch,
        }
    }
}
