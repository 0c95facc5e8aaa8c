//! Network building blocks shared by actors and critics.

pub mod orthogonal;

pub use orthogonal::{generate_orthogonal_weights, OrthogonalLinear, OrthogonalLinearConfig};

/// Initialization gains for orthogonal layers.
///
/// Hidden layers feeding ReLU use `RELU`; policy mean/log-std heads use a
/// small `POLICY_HEAD` gain so initial actions stay near zero; Q-value heads
/// use unit gain.
pub mod gains {
    /// sqrt(2), the variance-preserving gain for ReLU activations.
    pub const RELU: f64 = std::f64::consts::SQRT_2;
    /// Small gain for policy output heads.
    pub const POLICY_HEAD: f64 = 0.01;
    /// Unit gain for value output heads.
    pub const VALUE_HEAD: f64 = 1.0;
}
