//! Distribution math for continuous manipulation policies.
//!
//! Policies here output a diagonal Gaussian over pre-squash actions; `tanh`
//! bounds samples to (-1, 1) before scaling to the environment's action
//! range. Squashing changes the density, so log probabilities carry the
//! change-of-variables correction:
//!
//! ```text
//! log π(a|s) = log N(u; μ, σ) - Σ log(1 - tanh²(u)),   a = tanh(u)
//! ```
//!
//! All sampling is reparameterized (`u = μ + σ·ε`), so gradients flow from
//! losses through sampled actions back into the policy parameters.

use burn::tensor::backend::Backend;
use burn::tensor::{activation::tanh, Distribution, Tensor};

/// Lower clamp for predicted log standard deviations.
pub const LOG_STD_MIN: f32 = -20.0;
/// Upper clamp for predicted log standard deviations.
pub const LOG_STD_MAX: f32 = 2.0;

const EPSILON: f32 = 1e-6;

/// Clamp raw log-std head outputs into the stable range.
pub fn clamp_log_std<B: Backend>(log_std: Tensor<B, 2>) -> Tensor<B, 2> {
    log_std.clamp(LOG_STD_MIN, LOG_STD_MAX)
}

/// Reparameterized sample from a diagonal Gaussian, no squashing.
///
/// Returns `(samples, log_probs)` with samples `[batch, action_dim]` and
/// log probabilities `[batch]` summed over action dimensions.
pub fn sample_gaussian<B: Backend>(
    mean: Tensor<B, 2>,
    log_std: Tensor<B, 2>,
) -> (Tensor<B, 2>, Tensor<B, 1>) {
    let device = mean.device();
    let [batch_size, action_dim] = mean.dims();

    let log_std = clamp_log_std(log_std);
    let std = log_std.clone().exp();

    let noise: Tensor<B, 2> = Tensor::random(
        [batch_size, action_dim],
        Distribution::Normal(0.0, 1.0),
        &device,
    );

    let samples = mean + std * noise.clone();

    // log N(x; μ, σ) = -0.5 ε² - log σ - 0.5 log 2π, with ε the unit noise.
    let log_2pi = (2.0 * std::f32::consts::PI).ln();
    let log_prob_per_dim: Tensor<B, 2> =
        -(noise.powf_scalar(2.0).mul_scalar(0.5)) - log_std - 0.5 * log_2pi;
    let log_probs: Tensor<B, 1> = log_prob_per_dim.sum_dim(1).squeeze();

    (samples, log_probs)
}

/// Reparameterized sample squashed through `tanh`.
///
/// Returns `(squashed, log_probs)` with squashed samples in (-1, 1) and log
/// probabilities corrected for the squashing.
pub fn sample_squashed_gaussian<B: Backend>(
    mean: Tensor<B, 2>,
    log_std: Tensor<B, 2>,
) -> (Tensor<B, 2>, Tensor<B, 1>) {
    let (pre_squash, gaussian_log_probs) = sample_gaussian(mean, log_std);
    let squashed = tanh(pre_squash.clone());
    let log_probs = gaussian_log_probs - squash_correction(pre_squash);
    (squashed, log_probs)
}

/// Log probability of an already-squashed action under the policy.
///
/// Inverts the squashing (`u = atanh(a)`) and applies the same correction
/// used at sampling time. Inputs are clamped away from ±1 first.
pub fn log_prob_squashed_gaussian<B: Backend>(
    squashed_action: Tensor<B, 2>,
    mean: Tensor<B, 2>,
    log_std: Tensor<B, 2>,
) -> Tensor<B, 1> {
    let log_std = clamp_log_std(log_std);

    let clamped = squashed_action.clamp(-1.0 + EPSILON, 1.0 - EPSILON);
    let pre_squash = atanh(clamped);

    let std = log_std.clone().exp();
    let normalized = (pre_squash.clone() - mean) / std;
    let log_2pi = (2.0 * std::f32::consts::PI).ln();
    let per_dim: Tensor<B, 2> =
        -(normalized.powf_scalar(2.0).mul_scalar(0.5)) - log_std - 0.5 * log_2pi;
    let gaussian_log_probs: Tensor<B, 1> = per_dim.sum_dim(1).squeeze();

    gaussian_log_probs - squash_correction(pre_squash)
}

/// Analytical entropy of the (unsquashed) diagonal Gaussian, `[batch]`.
pub fn entropy_gaussian<B: Backend>(log_std: Tensor<B, 2>) -> Tensor<B, 1> {
    let action_dim = log_std.dims()[1] as f32;
    let log_2pi = (2.0 * std::f32::consts::PI).ln();
    let constant = 0.5 * action_dim * (1.0 + log_2pi);

    let sum_log_std: Tensor<B, 1> = log_std.sum_dim(1).squeeze();
    sum_log_std.add_scalar(constant)
}

/// Map squashed actions from (-1, 1) to `[low, high]`.
///
/// Bounds are shared across action dimensions; manipulation tasks in this
/// workspace all use symmetric unit bounds, making this the identity there.
pub fn scale_action<B: Backend>(squashed: Tensor<B, 2>, low: f32, high: f32) -> Tensor<B, 2> {
    let scale = (high - low) / 2.0;
    let offset = (high + low) / 2.0;
    squashed.mul_scalar(scale).add_scalar(offset)
}

/// Map environment-range actions back to (-1, 1).
pub fn unscale_action<B: Backend>(action: Tensor<B, 2>, low: f32, high: f32) -> Tensor<B, 2> {
    let scale = (high - low) / 2.0;
    let offset = (high + low) / 2.0;
    action.sub_scalar(offset).div_scalar(scale)
}

/// Σ log(1 - tanh²(u)) over action dimensions, `[batch]`.
fn squash_correction<B: Backend>(pre_squash: Tensor<B, 2>) -> Tensor<B, 1> {
    let squashed = tanh(pre_squash);
    let one_minus_sq = (-squashed.clone() * squashed + 1.0).clamp(EPSILON, 1.0);
    let per_dim: Tensor<B, 2> = one_minus_sq.log();
    per_dim.sum_dim(1).squeeze()
}

/// atanh(x) = 0.5 log((1 + x) / (1 - x)), clamped away from ±1.
fn atanh<B: Backend>(x: Tensor<B, 2>) -> Tensor<B, 2> {
    let x = x.clamp(-1.0 + EPSILON, 1.0 - EPSILON);
    let one_plus = x.clone() + 1.0;
    let one_minus = -x + 1.0;
    (one_plus / one_minus).clamp(EPSILON, f32::MAX).log() * 0.5
}
