// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! One idle-then-decode measurement.

use crate::IdleSleeper;
use probe_engine::{EngineError, ProbeBatch, Session};
use std::time::Duration;

/// Result of a single trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialSample {
    /// Idle time requested before the decode.
    pub idle: Duration,
    /// Decode plus synchronize, on the engine clock.
    pub elapsed: Duration,
}

/// Sleeps for `idle`, then times one decode of `workload` through to
/// completion.
///
/// The timed interval covers exactly `decode` and `synchronize`; neither the
/// sleep nor any cache maintenance falls inside it. A zero `idle` skips the
/// sleeper entirely.
pub fn run_trial<S, Z>(
    session: &mut S,
    idle: Duration,
    workload: &ProbeBatch,
    sleeper: &mut Z,
) -> Result<TrialSample, EngineError>
where
    S: Session + ?Sized,
    Z: IdleSleeper + ?Sized,
{
    if !idle.is_zero() {
        sleeper.sleep(idle);
    }

    let start = session.now();
    session.decode(workload)?;
    session.synchronize()?;
    let end = session.now();

    Ok(TrialSample {
        idle,
        elapsed: end - start,
    })
}

/// Returns the session to an empty context, with the reset fully applied
/// before the next trial starts timing.
pub fn reset_session<S: Session + ?Sized>(session: &mut S) -> Result<(), EngineError> {
    session.reset_cache();
    session.rebuild_cache()?;
    session.synchronize()
}
