// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The sweep controller.
//!
//! A [`Sweep`] walks an [`IdleSchedule`] in order. For each idle duration it
//! runs `trials_per_duration` trials, resetting the session after every one,
//! and yields a [`DurationSummary`]. The sweep is an iterator: nothing runs
//! until the caller asks for the next bucket, so each summary can be written
//! out before the following bucket starts.
//!
//! ```text
//! first next():  warm-up trial ─▶ reset
//! every next():  ┌─ sleep(idle) ─▶ now ─▶ decode ─▶ synchronize ─▶ now ─▶ reset ─┐
//!                └──────────────────────── × trials ────────────────────────────┘
//!                summarize ─▶ Some(Ok(summary))
//! ```
//!
//! The warm-up absorbs one-time initialization cost and its timing is
//! discarded. The first error ends the sweep: buckets already yielded stay
//! valid, the samples of the failing bucket are dropped, one `Err` is
//! yielded and the iterator is fused afterwards.

use crate::{
    reset_session, run_trial, HarnessError, IdleSchedule, IdleSleeper, SampleAccumulator,
    SampleStats, ThreadSleeper,
};
use probe_engine::{ProbeBatch, Session};
use std::iter::FusedIterator;
use std::time::Duration;

/// Statistics for one idle duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationSummary {
    /// The idle duration the trials waited before decoding.
    pub idle: Duration,
    pub stats: SampleStats,
}

impl DurationSummary {
    /// Idle duration in whole milliseconds.
    pub fn idle_ms(&self) -> u128 {
        self.idle.as_millis()
    }
}

/// Iterator over per-duration summaries. See the module docs.
pub struct Sweep<'a, S: Session, Z: IdleSleeper = ThreadSleeper> {
    session: &'a mut S,
    workload: &'a ProbeBatch,
    schedule: IdleSchedule,
    trials_per_duration: usize,
    reset_between_trials: bool,
    sleeper: Z,
    next_bucket: usize,
    warmed_up: bool,
    finished: bool,
}

/// Starts a sweep over `schedule` on `session` using the thread sleeper.
///
/// Fails with [`HarnessError::InvalidTrialCount`] when
/// `trials_per_duration` is zero.
pub fn run_sweep<'a, S: Session>(
    session: &'a mut S,
    workload: &'a ProbeBatch,
    schedule: IdleSchedule,
    trials_per_duration: usize,
) -> Result<Sweep<'a, S>, HarnessError> {
    Sweep::new(session, workload, schedule, trials_per_duration)
}

impl<'a, S: Session> Sweep<'a, S> {
    pub fn new(
        session: &'a mut S,
        workload: &'a ProbeBatch,
        schedule: IdleSchedule,
        trials_per_duration: usize,
    ) -> Result<Self, HarnessError> {
        if trials_per_duration == 0 {
            return Err(HarnessError::InvalidTrialCount(trials_per_duration));
        }
        Ok(Self {
            session,
            workload,
            schedule,
            trials_per_duration,
            reset_between_trials: true,
            sleeper: ThreadSleeper,
            next_bucket: 0,
            warmed_up: false,
            finished: false,
        })
    }
}

impl<'a, S: Session, Z: IdleSleeper> Sweep<'a, S, Z> {
    /// Replaces the idle sleeper (e.g., with a virtual clock in tests).
    pub fn with_sleeper<Z2: IdleSleeper>(self, sleeper: Z2) -> Sweep<'a, S, Z2> {
        Sweep {
            session: self.session,
            workload: self.workload,
            schedule: self.schedule,
            trials_per_duration: self.trials_per_duration,
            reset_between_trials: self.reset_between_trials,
            sleeper,
            next_bucket: self.next_bucket,
            warmed_up: self.warmed_up,
            finished: self.finished,
        }
    }

    /// Keeps the context between trials instead of resetting it, so every
    /// trial decodes on top of a longer context.
    #[cfg(test)]
    pub(crate) fn without_reset(mut self) -> Self {
        self.reset_between_trials = false;
        self
    }

    pub fn schedule(&self) -> &IdleSchedule {
        &self.schedule
    }

    pub fn trials_per_duration(&self) -> usize {
        self.trials_per_duration
    }

    /// Buckets not yet yielded.
    pub fn remaining(&self) -> usize {
        if self.finished {
            0
        } else {
            self.schedule.len() - self.next_bucket
        }
    }

    fn warm_up(&mut self) -> Result<(), HarnessError> {
        let sample = run_trial(
            &mut *self.session,
            Duration::ZERO,
            self.workload,
            &mut self.sleeper,
        )
        .map_err(HarnessError::WarmupFailed)?;
        reset_session(&mut *self.session).map_err(HarnessError::WarmupFailed)?;
        tracing::debug!("warm-up decode took {:?} (discarded)", sample.elapsed);
        Ok(())
    }

    fn run_bucket(&mut self, index: usize) -> Result<DurationSummary, HarnessError> {
        let idle = self.schedule.points()[index];
        let mut acc = SampleAccumulator::new();

        for trial in 1..=self.trials_per_duration {
            let fail = |source| HarnessError::TrialFailed {
                bucket: index + 1,
                trial,
                idle,
                source,
            };
            let sample = run_trial(&mut *self.session, idle, self.workload, &mut self.sleeper)
                .map_err(fail)?;
            if self.reset_between_trials {
                reset_session(&mut *self.session).map_err(fail)?;
            }
            tracing::trace!("bucket {} trial {trial}: {:?}", index + 1, sample.elapsed);
            acc.push(sample.elapsed);
        }

        let stats = acc.finish()?;
        tracing::info!(
            "idle {:?}: {} trials, mean {:.3} ms, stddev {:.3} ms",
            idle,
            stats.count,
            stats.mean_ms(),
            stats.stddev_ms(),
        );
        Ok(DurationSummary { idle, stats })
    }
}

impl<S: Session, Z: IdleSleeper> Iterator for Sweep<'_, S, Z> {
    type Item = Result<DurationSummary, HarnessError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        if !self.warmed_up {
            if let Err(e) = self.warm_up() {
                tracing::error!("{e}");
                self.finished = true;
                return Some(Err(e));
            }
            self.warmed_up = true;
        }

        if self.next_bucket >= self.schedule.len() {
            self.finished = true;
            return None;
        }

        match self.run_bucket(self.next_bucket) {
            Ok(summary) => {
                self.next_bucket += 1;
                Some(Ok(summary))
            }
            Err(e) => {
                tracing::error!("sweep aborted: {e}");
                self.finished = true;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        // An error item may replace any of the remaining buckets.
        (0, Some(self.remaining() + usize::from(!self.finished)))
    }
}

impl<S: Session, Z: IdleSleeper> FusedIterator for Sweep<'_, S, Z> {}

#[cfg(test)]
mod tests {
    use super::*;
    use probe_engine::synthetic::{EngineCall, Journal, LatencyProfile, SyntheticBackend};
    use probe_engine::{Backend, Model, ModelParams, SessionParams, VirtualClock};

    fn model_file(name: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("idle_harness_sweep_{name}.gguf"));
        std::fs::write(&path, b"GGUF").unwrap();
        path
    }

    #[test]
    fn test_zero_trials_rejected() {
        let backend = SyntheticBackend::default().with_virtual_clock(VirtualClock::new());
        let path = model_file("zero_trials");
        let model = backend.load_model(&path, &ModelParams::default()).unwrap();
        let mut session = model.create_session(&SessionParams::default()).unwrap();
        let batch = ProbeBatch::single(model.placeholder_token());

        let result = run_sweep(&mut session, &batch, IdleSchedule::default(), 0);
        assert!(matches!(result, Err(HarnessError::InvalidTrialCount(0))));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_lazy_until_first_next() {
        let clock = VirtualClock::new();
        let backend = SyntheticBackend::new(LatencyProfile::fixed(Duration::from_millis(10)))
            .with_virtual_clock(clock.clone());
        let path = model_file("lazy");
        let model = backend.load_model(&path, &ModelParams::default()).unwrap();
        let mut session = model.create_session(&SessionParams::default()).unwrap();
        let batch = ProbeBatch::single(model.placeholder_token());

        let schedule = IdleSchedule::from_millis(&[0, 100]).unwrap();
        let mut sweep = run_sweep(&mut session, &batch, schedule, 2)
            .unwrap()
            .with_sleeper(clock.clone());
        assert_eq!(clock.now().as_nanos(), 0);
        assert_eq!(sweep.remaining(), 2);
        assert_eq!(sweep.schedule().len(), 2);
        assert_eq!(sweep.trials_per_duration(), 2);

        let first = sweep.next().unwrap().unwrap();
        assert_eq!(first.idle, Duration::ZERO);
        assert_eq!(sweep.remaining(), 1);
        // warm-up + two 10 ms trials
        assert_eq!(clock.now().as_micros(), 30_000);

        let second = sweep.next().unwrap().unwrap();
        assert_eq!(second.idle_ms(), 100);
        assert!(sweep.next().is_none());
        assert!(sweep.next().is_none());
        assert_eq!(sweep.remaining(), 0);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_without_reset_latency_grows() {
        let clock = VirtualClock::new();
        let journal = Journal::new();
        let profile = LatencyProfile {
            decode_ms: 10.0,
            offload_speedup_per_layer: 0.0,
            context_cost_us: 100.0,
            idle_penalty_ms_per_s: 0.0,
            idle_penalty_max_ms: 0.0,
            cache_rebuild_us: 0.0,
            ..Default::default()
        };
        let backend = SyntheticBackend::new(profile)
            .with_virtual_clock(clock.clone())
            .with_journal(journal.clone());
        let path = model_file("growth");
        let model = backend.load_model(&path, &ModelParams::default()).unwrap();
        let mut session = model.create_session(&SessionParams::default()).unwrap();
        let batch = ProbeBatch::single(model.placeholder_token());

        let schedule = IdleSchedule::from_millis(&[0, 100]).unwrap();
        let summaries: Vec<_> = run_sweep(&mut session, &batch, schedule, 5)
            .unwrap()
            .with_sleeper(clock.clone())
            .without_reset()
            .collect::<Result<_, _>>()
            .unwrap();

        // Trials see 0..=4 then 5..=9 cached tokens at 0.1 ms each.
        assert!((summaries[0].stats.mean_ms() - 10.2).abs() < 1e-4);
        assert!((summaries[1].stats.mean_ms() - 10.7).abs() < 1e-4);
        assert!(summaries[0].stats.stddev_ms() > 0.1);
        assert_eq!(session.cached_tokens(), 10);
        assert_eq!(journal.count(EngineCall::ResetCache), 1);
        std::fs::remove_file(&path).ok();
    }
}
