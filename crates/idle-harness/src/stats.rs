// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Mean and sample standard deviation of trial durations.
//!
//! Moments are accumulated as exact integer nanoseconds, so the result does
//! not depend on the order samples arrive in. The variance uses the `n − 1`
//! (Bessel) denominator:
//!
//! ```text
//! var = (n · Σx² − (Σx)²) / (n · (n − 1))
//! ```
//!
//! clamped at zero. A single sample has no defined spread; its standard
//! deviation is reported as `0` and [`SampleStats::dispersion_defined`]
//! returns `false`.

use crate::HarnessError;
use std::time::Duration;

/// Running sums over a set of durations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleAccumulator {
    count: u64,
    sum_ns: u128,
    sum_sq_ns: u128,
}

impl SampleAccumulator {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one sample.
    pub fn push(&mut self, sample: Duration) {
        let ns = sample.as_nanos();
        self.count += 1;
        self.sum_ns = self.sum_ns.saturating_add(ns);
        self.sum_sq_ns = self.sum_sq_ns.saturating_add(ns.saturating_mul(ns));
    }

    /// Number of samples pushed.
    pub fn count(&self) -> usize {
        self.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Computes mean and standard deviation of everything pushed so far.
    pub fn finish(&self) -> Result<SampleStats, HarnessError> {
        if self.count == 0 {
            return Err(HarnessError::EmptySample);
        }

        let n = self.count as u128;
        let mean_ns = self.sum_ns as f64 / n as f64;
        if n == 1 {
            return Ok(SampleStats {
                count: 1,
                mean_ns,
                stddev_ns: 0.0,
            });
        }

        let exact = n
            .checked_mul(self.sum_sq_ns)
            .zip(self.sum_ns.checked_mul(self.sum_ns));
        let variance = match exact {
            Some((scaled_sq, sq_sum)) => {
                scaled_sq.saturating_sub(sq_sum) as f64 / (n * (n - 1)) as f64
            }
            // Only reachable with hours-long samples; fall back to floats.
            None => {
                let nf = n as f64;
                let sum = self.sum_ns as f64;
                (self.sum_sq_ns as f64 - sum * sum / nf) / (nf - 1.0)
            }
        };

        Ok(SampleStats {
            count: self.count as usize,
            mean_ns,
            stddev_ns: variance.max(0.0).sqrt(),
        })
    }
}

impl Extend<Duration> for SampleAccumulator {
    fn extend<I: IntoIterator<Item = Duration>>(&mut self, iter: I) {
        for sample in iter {
            self.push(sample);
        }
    }
}

impl FromIterator<Duration> for SampleAccumulator {
    fn from_iter<I: IntoIterator<Item = Duration>>(iter: I) -> Self {
        let mut acc = Self::new();
        acc.extend(iter);
        acc
    }
}

/// Summary statistics of one set of samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleStats {
    pub count: usize,
    mean_ns: f64,
    stddev_ns: f64,
}

impl SampleStats {
    /// Arithmetic mean in milliseconds.
    pub fn mean_ms(&self) -> f64 {
        self.mean_ns / 1e6
    }

    /// Sample standard deviation in milliseconds.
    pub fn stddev_ms(&self) -> f64 {
        self.stddev_ns / 1e6
    }

    pub fn mean_us(&self) -> f64 {
        self.mean_ns / 1e3
    }

    pub fn stddev_us(&self) -> f64 {
        self.stddev_ns / 1e3
    }

    /// `false` when the spread is undefined (fewer than two samples).
    pub fn dispersion_defined(&self) -> bool {
        self.count >= 2
    }
}

/// Mean and sample standard deviation of `samples`.
///
/// # Example
/// ```
/// use idle_harness::summarize;
/// use std::time::Duration;
///
/// let stats = summarize(&[Duration::from_millis(10), Duration::from_millis(20)]).unwrap();
/// assert_eq!(stats.mean_ms(), 15.0);
/// assert!((stats.stddev_ms() - 50f64.sqrt()).abs() < 1e-9);
/// ```
pub fn summarize(samples: &[Duration]) -> Result<SampleStats, HarnessError> {
    samples.iter().copied().collect::<SampleAccumulator>().finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_empty_is_error() {
        assert!(matches!(summarize(&[]), Err(HarnessError::EmptySample)));
        assert!(SampleAccumulator::new().finish().is_err());
    }

    #[test]
    fn test_single_sample() {
        let stats = summarize(&[ms(42)]).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.mean_ms(), 42.0);
        assert_eq!(stats.stddev_ms(), 0.0);
        assert!(!stats.dispersion_defined());
    }

    #[test]
    fn test_two_samples() {
        let stats = summarize(&[ms(10), ms(20)]).unwrap();
        assert_eq!(stats.mean_ms(), 15.0);
        assert!((stats.stddev_ms() - 50f64.sqrt()).abs() < 1e-9);
        assert!(stats.dispersion_defined());
    }

    #[test]
    fn test_identical_samples_have_zero_spread() {
        let samples = vec![Duration::from_micros(50_123); 10];
        let stats = summarize(&samples).unwrap();
        assert_eq!(stats.stddev_us(), 0.0);
        assert_eq!(stats.mean_us(), 50_123.0);
    }

    #[test]
    fn test_order_independent() {
        let a = [ms(3), ms(9), Duration::from_micros(4_517), ms(1)];
        let mut b = a;
        b.reverse();
        assert_eq!(summarize(&a).unwrap(), summarize(&b).unwrap());
    }

    #[test]
    fn test_known_values() {
        // 2, 4, 4, 4, 5, 5, 7, 9 ms: mean 5, sample variance 32/7.
        let samples: Vec<_> = [2, 4, 4, 4, 5, 5, 7, 9].into_iter().map(ms).collect();
        let stats = summarize(&samples).unwrap();
        assert_eq!(stats.mean_ms(), 5.0);
        assert!((stats.stddev_ms() - (32.0f64 / 7.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_accumulator_matches_slice() {
        let samples = [ms(7), ms(11), ms(13)];
        let mut acc = SampleAccumulator::new();
        for s in samples {
            acc.push(s);
        }
        assert_eq!(acc.count(), 3);
        assert_eq!(acc.finish().unwrap(), summarize(&samples).unwrap());
    }

    #[test]
    fn test_huge_samples_fall_back() {
        let big = Duration::from_secs(400_000_000_000);
        let stats = summarize(&[big, big]).unwrap();
        assert!(stats.stddev_ms().is_finite());
        assert!(stats.stddev_ms() >= 0.0);
    }
}
