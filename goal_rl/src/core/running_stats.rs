//! Streaming mean/variance statistics.
//!
//! Welford's online algorithm: numerically stable single-pass mean and
//! variance without storing samples. Used for episode reward and length
//! aggregation in evaluation reports and training monitors.

use serde::{Deserialize, Serialize};

/// Online mean/variance for a stream of scalar values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunningScalarStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningScalarStats {
    /// Create empty statistics.
    pub fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    /// Incorporate one sample.
    pub fn update(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// Incorporate several samples.
    pub fn update_many(&mut self, values: &[f64]) {
        for &v in values {
            self.update(v);
        }
    }

    /// Number of samples seen.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Sample mean (0 when empty).
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Population variance (0 when empty).
    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.m2 / self.count as f64
        }
    }

    /// Population standard deviation.
    pub fn std(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Smallest sample seen (0 when empty).
    pub fn min(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.min
        }
    }

    /// Largest sample seen (0 when empty).
    pub fn max(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.max
        }
    }

    /// Merge another accumulator into this one (parallel Welford).
    pub fn merge(&mut self, other: &Self) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = other.clone();
            return;
        }

        let total = self.count + other.count;
        let delta = other.mean - self.mean;
        let new_mean = self.mean + delta * other.count as f64 / total as f64;
        let new_m2 = self.m2
            + other.m2
            + delta * delta * self.count as f64 * other.count as f64 / total as f64;

        self.count = total;
        self.mean = new_mean;
        self.m2 = new_m2;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Reset to the empty state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for RunningScalarStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stats() {
        let stats = RunningScalarStats::new();
        assert_eq!(stats.count(), 0);
        assert_eq!(stats.mean(), 0.0);
        assert_eq!(stats.std(), 0.0);
        assert_eq!(stats.min(), 0.0);
        assert_eq!(stats.max(), 0.0);
    }

    #[test]
    fn test_known_values() {
        let mut stats = RunningScalarStats::new();
        stats.update_many(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);

        assert_eq!(stats.count(), 8);
        assert!((stats.mean() - 5.0).abs() < 1e-9);
        // Population variance of this classic dataset is 4.
        assert!((stats.variance() - 4.0).abs() < 1e-9);
        assert!((stats.std() - 2.0).abs() < 1e-9);
        assert_eq!(stats.min(), 2.0);
        assert_eq!(stats.max(), 9.0);
    }

    #[test]
    fn test_single_sample() {
        let mut stats = RunningScalarStats::new();
        stats.update(-42.5);

        assert_eq!(stats.mean(), -42.5);
        assert_eq!(stats.variance(), 0.0);
        assert_eq!(stats.min(), -42.5);
        assert_eq!(stats.max(), -42.5);
    }

    #[test]
    fn test_merge_matches_sequential() {
        let values = [1.0, -3.0, 2.5, 8.0, -1.5, 0.0, 4.0];

        let mut sequential = RunningScalarStats::new();
        sequential.update_many(&values);

        let mut left = RunningScalarStats::new();
        left.update_many(&values[..3]);
        let mut right = RunningScalarStats::new();
        right.update_many(&values[3..]);
        left.merge(&right);

        assert_eq!(left.count(), sequential.count());
        assert!((left.mean() - sequential.mean()).abs() < 1e-9);
        assert!((left.variance() - sequential.variance()).abs() < 1e-9);
        assert_eq!(left.min(), sequential.min());
        assert_eq!(left.max(), sequential.max());
    }

    #[test]
    fn test_merge_into_empty() {
        let mut empty = RunningScalarStats::new();
        let mut other = RunningScalarStats::new();
        other.update_many(&[1.0, 2.0, 3.0]);

        empty.merge(&other);
        assert_eq!(empty.count(), 3);
        assert!((empty.mean() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset() {
        let mut stats = RunningScalarStats::new();
        stats.update_many(&[5.0, 10.0]);
        stats.reset();

        assert_eq!(stats.count(), 0);
        assert_eq!(stats.mean(), 0.0);
    }
}
