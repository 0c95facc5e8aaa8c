//! Deterministic RNG and optional observation noise.
//!
//! Every environment instance owns a [`XorShiftRng`] stream derived from the
//! configured seed, so resets are reproducible regardless of how many
//! parallel instances run or in which order they finish. Observation noise
//! is disabled by default; enabling it perturbs position- and velocity-like
//! entries of the observation with Gaussian noise while leaving the
//! achieved/desired goal channels exact.

// ============================================================================
// XorShift RNG
// ============================================================================

/// Minimal xorshift64 generator.
///
/// Fast, deterministic and good enough for reset sampling and sensor noise.
/// Not cryptographically secure.
#[derive(Clone, Debug)]
pub struct XorShiftRng {
    state: u64,
}

impl XorShiftRng {
    /// Create a new RNG from a seed. A zero seed is remapped because
    /// xorshift has a fixed point at zero.
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 0xDEADBEEF } else { seed },
        }
    }

    /// Next raw 64-bit value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform f32 in [0, 1).
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        // Use the upper bits; the low bits of xorshift are weaker.
        (self.next_u64() >> 40) as u32 as f32 * (1.0 / (1u32 << 24) as f32)
    }

    /// Uniform f32 in [low, high).
    #[inline]
    pub fn range(&mut self, low: f32, high: f32) -> f32 {
        low + self.next_f32() * (high - low)
    }

    /// Bernoulli draw with probability `p`.
    #[inline]
    pub fn next_bool(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }

    /// Pair of independent standard normal samples (Box-Muller).
    #[inline]
    pub fn next_gaussian_pair(&mut self) -> (f32, f32) {
        let u1 = self.next_f32().max(1e-10);
        let u2 = self.next_f32();
        let r = (-2.0 * u1.ln()).sqrt();
        let theta = 2.0 * std::f32::consts::PI * u2;
        (r * theta.cos(), r * theta.sin())
    }

    /// Single standard normal sample.
    #[inline]
    pub fn next_gaussian(&mut self) -> f32 {
        self.next_gaussian_pair().0
    }
}

// ============================================================================
// Observation Noise Configuration
// ============================================================================

/// Gaussian observation noise settings.
///
/// `None` disables a channel entirely, which also skips the RNG draws for
/// it. Goals are never noised; hindsight relabeling needs exact achieved
/// goals.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NoiseConfig {
    /// Std-dev applied to position-like entries (m).
    pub position_std: Option<f32>,
    /// Std-dev applied to velocity-like entries (m/s).
    pub velocity_std: Option<f32>,
}

impl NoiseConfig {
    /// No observation noise (the default).
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Noise levels typical of a decent mocap + encoder setup:
    /// 2 mm position, 1 cm/s velocity.
    pub fn sensor_realistic() -> Self {
        Self {
            position_std: Some(0.002),
            velocity_std: Some(0.01),
        }
    }

    /// Set position noise std-dev.
    pub fn with_position_std(mut self, std: f32) -> Self {
        self.position_std = Some(std);
        self
    }

    /// Set velocity noise std-dev.
    pub fn with_velocity_std(mut self, std: f32) -> Self {
        self.velocity_std = Some(std);
        self
    }

    /// Whether any channel is enabled.
    pub fn is_enabled(&self) -> bool {
        self.position_std.is_some() || self.velocity_std.is_some()
    }
}

/// Add Gaussian noise to three consecutive entries.
#[inline]
fn perturb_3(slice: &mut [f32], std: f32, rng: &mut XorShiftRng) {
    let (n0, n1) = rng.next_gaussian_pair();
    let (n2, _) = rng.next_gaussian_pair();
    slice[0] += n0 * std;
    slice[1] += n1 * std;
    slice[2] += n2 * std;
}

/// Apply observation noise to one environment's observation slice.
///
/// The slice layout matches `observation::write_observations_all`:
/// gripper position (0..3), gripper velocity (3..6), finger width (6),
/// finger velocity (7), then for object tasks object position (8..11),
/// object relative position (11..14) and object velocity (14..17).
pub fn apply_observation_noise(
    obs: &mut [f32],
    has_object: bool,
    config: &NoiseConfig,
    rng: &mut XorShiftRng,
) {
    if let Some(std) = config.position_std {
        perturb_3(&mut obs[0..3], std, rng);
        obs[6] += rng.next_gaussian() * std;
        if has_object {
            perturb_3(&mut obs[8..11], std, rng);
            perturb_3(&mut obs[11..14], std, rng);
        }
    }
    if let Some(std) = config.velocity_std {
        perturb_3(&mut obs[3..6], std, rng);
        obs[7] += rng.next_gaussian() * std;
        if has_object {
            perturb_3(&mut obs[14..17], std, rng);
        }
    }
}
