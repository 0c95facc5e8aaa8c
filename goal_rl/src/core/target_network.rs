//! Target network maintenance for bootstrapped value learning.
//!
//! TD targets computed from the network being optimized chase their own
//! updates. All three algorithms in this crate therefore keep slowly-moving
//! copies of their value networks (and, for deterministic policies, of the
//! actor) and bootstrap from those:
//!
//! ```text
//! θ_target ← τ * θ_online + (1 - τ) * θ_target
//! ```
//!
//! Parameters are matched by module traversal order, so updates work between
//! independently constructed models of the same architecture.

use burn::module::{Module, ModuleMapper, Param};
use burn::prelude::*;
use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};

// ============================================================================
// Soft update via ModuleMapper
// ============================================================================

/// One parameter tensor flattened to 1D.
///
/// Flattening sidesteps const-generic dimension mismatches when collecting
/// tensors of different ranks into a single Vec.
struct FlatParam<B: Backend> {
    tensor: Tensor<B, 1>,
}

/// Collects every float parameter of a module in traversal order.
struct ParamCollector<B: Backend> {
    params: Vec<FlatParam<B>>,
}

impl<B: Backend> ParamCollector<B> {
    fn new() -> Self {
        Self { params: Vec::new() }
    }
}

impl<B: Backend> ModuleMapper<B> for ParamCollector<B> {
    fn map_float<const D: usize>(&mut self, param: Param<Tensor<B, D>>) -> Param<Tensor<B, D>> {
        let val = param.val();
        let total: usize = val.dims().iter().product();
        self.params.push(FlatParam {
            tensor: val.reshape([total]),
        });
        param
    }
}

/// Writes interpolated parameters back into the target module.
///
/// Consumes the collected online parameters by traversal index; the target
/// keeps its own `ParamId`s so optimizer state stays attached to the online
/// copy only.
struct PolyakMapper<B: Backend> {
    online: Vec<FlatParam<B>>,
    tau: f32,
    index: RefCell<usize>,
}

impl<B: Backend> ModuleMapper<B> for PolyakMapper<B> {
    fn map_float<const D: usize>(&mut self, param: Param<Tensor<B, D>>) -> Param<Tensor<B, D>> {
        let target_val = param.val();
        let shape = target_val.dims();
        let total: usize = shape.iter().product();

        let idx = *self.index.borrow();
        *self.index.borrow_mut() = idx + 1;

        match self.online.get(idx) {
            Some(online) => {
                let target_flat = target_val.reshape([total]);
                let mixed = online.tensor.clone().mul_scalar(self.tau)
                    + target_flat.mul_scalar(1.0 - self.tau);
                Param::initialized(param.id.clone(), mixed.reshape(shape))
            }
            // Architecture mismatch: leave the parameter untouched rather
            // than panic inside a mapper.
            None => param,
        }
    }
}

/// Polyak-average `online` into `target` and return the updated target.
///
/// `tau = 1` degenerates to a hard copy, `tau = 0` to a no-op; both short
/// circuit without touching tensors.
pub fn soft_update<B, M>(online: &M, target: M, tau: f32, _device: &B::Device) -> M
where
    B: Backend,
    M: Module<B>,
{
    if (tau - 1.0).abs() < 1e-6 {
        return online.clone();
    }
    if tau.abs() < 1e-6 {
        return target;
    }

    let mut collector = ParamCollector::new();
    let _ = online.clone().map(&mut collector);

    let mut mapper = PolyakMapper {
        online: collector.params,
        tau,
        index: RefCell::new(0),
    };
    target.map(&mut mapper)
}

/// Replace target weights with a clone of the online model.
pub fn hard_copy<B, M>(online: &M, _device: &B::Device) -> M
where
    B: Backend,
    M: Module<B> + Clone,
{
    online.clone()
}

// ============================================================================
// Configuration and manager
// ============================================================================

/// How and how often target networks follow their online counterparts.
#[derive(Debug, Clone)]
pub struct TargetNetworkConfig {
    /// Polyak coefficient; typical values 0.005 to 0.01.
    pub tau: f32,
    /// Update every N training steps.
    pub update_freq: usize,
    /// Hard copy instead of Polyak averaging.
    pub hard_update: bool,
}

impl Default for TargetNetworkConfig {
    fn default() -> Self {
        Self {
            tau: 0.005,
            update_freq: 1,
            hard_update: false,
        }
    }
}

impl TargetNetworkConfig {
    /// Soft updates every step with coefficient `tau`.
    pub fn soft(tau: f32) -> Self {
        Self {
            tau,
            update_freq: 1,
            hard_update: false,
        }
    }

    /// Hard copies every `update_freq` steps.
    pub fn hard(update_freq: usize) -> Self {
        Self {
            tau: 1.0,
            update_freq,
            hard_update: true,
        }
    }

    pub fn with_tau(mut self, tau: f32) -> Self {
        self.tau = tau;
        self
    }

    pub fn with_update_freq(mut self, freq: usize) -> Self {
        self.update_freq = freq;
        self
    }
}

/// Schedules target updates against an internal step counter.
///
/// The counter is atomic so `maybe_update` takes `&self`, letting update
/// rules hold the manager by shared reference inside their train step.
#[derive(Debug)]
pub struct TargetNetworkManager {
    config: TargetNetworkConfig,
    step_counter: AtomicUsize,
}

impl Clone for TargetNetworkManager {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            step_counter: AtomicUsize::new(self.step_counter.load(Ordering::Relaxed)),
        }
    }
}

impl TargetNetworkManager {
    pub fn new(config: TargetNetworkConfig) -> Self {
        Self {
            config,
            step_counter: AtomicUsize::new(0),
        }
    }

    /// Manager performing soft updates every step.
    pub fn soft(tau: f32) -> Self {
        Self::new(TargetNetworkConfig::soft(tau))
    }

    /// Manager performing hard copies every `update_freq` steps.
    pub fn hard(update_freq: usize) -> Self {
        Self::new(TargetNetworkConfig::hard(update_freq))
    }

    /// Advance the counter and update the target if this step is due.
    ///
    /// Returns the (possibly unchanged) target model.
    pub fn maybe_update<B, M>(&self, online: &M, target: M, device: &B::Device) -> M
    where
        B: Backend,
        M: Module<B>,
    {
        let step = self.step_counter.fetch_add(1, Ordering::Relaxed) + 1;

        if step % self.config.update_freq != 0 {
            return target;
        }

        if self.config.hard_update {
            hard_copy(online, device)
        } else {
            soft_update(online, target, self.config.tau, device)
        }
    }

    /// Number of `maybe_update` calls so far.
    pub fn steps(&self) -> usize {
        self.step_counter.load(Ordering::Relaxed)
    }

    pub fn config(&self) -> &TargetNetworkConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::nn::{Linear, LinearConfig};

    type B = NdArray<f32>;

    fn linear(d_in: usize, d_out: usize) -> Linear<B> {
        let device = Default::default();
        LinearConfig::new(d_in, d_out).init(&device)
    }

    fn weights(model: &Linear<B>) -> Vec<f32> {
        model
            .weight
            .val()
            .into_data()
            .as_slice::<f32>()
            .unwrap()
            .to_vec()
    }

    #[test]
    fn test_soft_update_interpolates() {
        let device = Default::default();
        let online = linear(4, 4);
        let target = linear(4, 4);

        let online_w = weights(&online);
        let target_w = weights(&target);

        let tau = 0.25;
        let updated = soft_update::<B, _>(&online, target, tau, &device);
        let updated_w = weights(&updated);

        for i in 0..online_w.len() {
            let expected = tau * online_w[i] + (1.0 - tau) * target_w[i];
            assert!(
                (updated_w[i] - expected).abs() < 1e-5,
                "mismatch at {i}: expected {expected}, got {}",
                updated_w[i]
            );
        }
    }

    #[test]
    fn test_soft_update_tau_edges() {
        let device = Default::default();
        let online = linear(3, 2);

        let target = linear(3, 2);
        let target_w = weights(&target);
        let unchanged = soft_update::<B, _>(&online, target, 0.0, &device);
        assert_eq!(weights(&unchanged), target_w);

        let target = linear(3, 2);
        let copied = soft_update::<B, _>(&online, target, 1.0, &device);
        assert_eq!(weights(&copied), weights(&online));
    }

    #[test]
    fn test_soft_update_includes_bias() {
        let device = Default::default();
        let online = linear(4, 4);
        let target = linear(4, 4);

        let online_b: Vec<f32> = online
            .bias
            .as_ref()
            .unwrap()
            .val()
            .into_data()
            .as_slice::<f32>()
            .unwrap()
            .to_vec();
        let target_b: Vec<f32> = target
            .bias
            .as_ref()
            .unwrap()
            .val()
            .into_data()
            .as_slice::<f32>()
            .unwrap()
            .to_vec();

        let tau = 0.5;
        let updated = soft_update::<B, _>(&online, target, tau, &device);
        let updated_b: Vec<f32> = updated
            .bias
            .as_ref()
            .unwrap()
            .val()
            .into_data()
            .as_slice::<f32>()
            .unwrap()
            .to_vec();

        for i in 0..online_b.len() {
            let expected = tau * online_b[i] + (1.0 - tau) * target_b[i];
            assert!((updated_b[i] - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn test_manager_counter_and_schedule() {
        let device = Default::default();
        let online = linear(2, 2);
        let manager = TargetNetworkManager::hard(3);

        assert_eq!(manager.steps(), 0);

        // Steps 1 and 2: target untouched.
        let t1 = linear(2, 2);
        let t1_w = weights(&t1);
        let t1 = manager.maybe_update::<B, _>(&online, t1, &device);
        assert_eq!(weights(&t1), t1_w);
        assert_eq!(manager.steps(), 1);

        let t2 = linear(2, 2);
        let t2_w = weights(&t2);
        let t2 = manager.maybe_update::<B, _>(&online, t2, &device);
        assert_eq!(weights(&t2), t2_w);

        // Step 3: hard copy fires.
        let t3 = linear(2, 2);
        let t3 = manager.maybe_update::<B, _>(&online, t3, &device);
        assert_eq!(weights(&t3), weights(&online));
        assert_eq!(manager.steps(), 3);
    }

    #[test]
    fn test_manager_soft_default() {
        let manager = TargetNetworkManager::soft(0.005);
        assert!(!manager.config().hard_update);
        assert_eq!(manager.config().update_freq, 1);
        assert!((manager.config().tau - 0.005).abs() < 1e-9);
    }
}
