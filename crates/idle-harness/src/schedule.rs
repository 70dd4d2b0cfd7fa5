// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The ordered list of idle durations a sweep visits.
//!
//! A schedule is fixed before the sweep starts and never depends on
//! measured results, so runs stay comparable across hosts.

use crate::HarnessError;
use std::time::Duration;

/// Upper bound on schedule length.
pub const MAX_POINTS: usize = 10_000;

/// A non-empty, strictly ascending sequence of idle durations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdleSchedule {
    points: Vec<Duration>,
}

impl IdleSchedule {
    /// `start, start + step, …` up to and including `max` when it lands on
    /// a step.
    ///
    /// # Example
    /// ```
    /// use idle_harness::IdleSchedule;
    /// use std::time::Duration;
    ///
    /// let s = IdleSchedule::linear(
    ///     Duration::ZERO,
    ///     Duration::from_millis(2200),
    ///     Duration::from_millis(200),
    /// ).unwrap();
    /// assert_eq!(s.len(), 12);
    /// ```
    pub fn linear(start: Duration, max: Duration, step: Duration) -> Result<Self, HarnessError> {
        if step.is_zero() {
            return Err(HarnessError::InvalidSchedule("step must be positive".into()));
        }
        if start > max {
            return Err(HarnessError::InvalidSchedule(format!(
                "start {start:?} exceeds max {max:?}"
            )));
        }

        let steps = (max - start).as_nanos() / step.as_nanos();
        if steps >= MAX_POINTS as u128 {
            return Err(HarnessError::InvalidSchedule(format!(
                "{} points exceeds the limit of {MAX_POINTS}",
                steps + 1
            )));
        }

        let points = (0..=steps as u32).map(|i| start + step * i).collect();
        Ok(Self { points })
    }

    /// Uses `points` as given; they must be strictly ascending.
    pub fn from_points(points: Vec<Duration>) -> Result<Self, HarnessError> {
        if points.is_empty() {
            return Err(HarnessError::InvalidSchedule("no idle durations".into()));
        }
        if points.len() > MAX_POINTS {
            return Err(HarnessError::InvalidSchedule(format!(
                "{} points exceeds the limit of {MAX_POINTS}",
                points.len()
            )));
        }
        if let Some(w) = points.windows(2).find(|w| w[0] >= w[1]) {
            return Err(HarnessError::InvalidSchedule(format!(
                "durations must be strictly ascending, found {:?} then {:?}",
                w[0], w[1]
            )));
        }
        Ok(Self { points })
    }

    /// Shorthand for [`IdleSchedule::from_points`] in milliseconds.
    pub fn from_millis(ms: &[u64]) -> Result<Self, HarnessError> {
        Self::from_points(ms.iter().map(|&m| Duration::from_millis(m)).collect())
    }

    /// The durations in sweep order.
    pub fn points(&self) -> &[Duration] {
        &self.points
    }

    /// Number of buckets.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`: schedules are non-empty by construction.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total time spent sleeping when every point runs `trials` trials.
    ///
    /// `None` when the total does not fit in a [`Duration`].
    pub fn total_idle(&self, trials: usize) -> Option<Duration> {
        let per_trial = self
            .points
            .iter()
            .try_fold(Duration::ZERO, |acc, d| acc.checked_add(*d))?;
        per_trial.checked_mul(u32::try_from(trials).ok()?)
    }
}

impl Default for IdleSchedule {
    /// 0 ms to 2200 ms in 200 ms steps.
    fn default() -> Self {
        Self {
            points: (0..=11).map(|i| Duration::from_millis(200 * i)).collect(),
        }
    }
}
