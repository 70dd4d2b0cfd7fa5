// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Engine-side time.
//!
//! Every timestamp the harness takes comes from the engine's own clock so
//! that start and end of a measurement share one time base. A clock is
//! either wall time (monotonic [`Instant`]) or a [`VirtualClock`] that only
//! moves when somebody blocks on it, which lets tests simulate seconds of
//! decode and idle time instantly.

use std::fmt;
use std::ops::Sub;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A point on an engine clock, in nanoseconds since the clock's epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct Timestamp {
    nanos: u64,
}

impl Timestamp {
    /// Creates a timestamp from nanoseconds since the epoch.
    pub fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    /// Creates a timestamp from microseconds since the epoch.
    pub fn from_micros(micros: u64) -> Self {
        Self {
            nanos: micros.saturating_mul(1_000),
        }
    }

    /// Nanoseconds since the epoch.
    pub fn as_nanos(&self) -> u64 {
        self.nanos
    }

    /// Microseconds since the epoch (truncated).
    pub fn as_micros(&self) -> u64 {
        self.nanos / 1_000
    }

    /// Elapsed time from `earlier` to `self`, zero if `earlier` is later.
    pub fn duration_since(&self, earlier: Timestamp) -> Duration {
        Duration::from_nanos(self.nanos.saturating_sub(earlier.nanos))
    }

    /// Returns this timestamp moved forward by `d`.
    pub fn saturating_add(&self, d: Duration) -> Timestamp {
        Timestamp {
            nanos: self.nanos.saturating_add(duration_nanos(d)),
        }
    }

    /// Drops sub-millisecond precision.
    pub fn truncate_to_millis(&self) -> Timestamp {
        Timestamp {
            nanos: self.nanos - self.nanos % 1_000_000,
        }
    }
}

impl Sub for Timestamp {
    type Output = Duration;

    fn sub(self, rhs: Timestamp) -> Duration {
        self.duration_since(rhs)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}s", self.nanos / 1_000_000_000, (self.nanos % 1_000_000_000) / 1_000)
    }
}

/// A simulated clock shared between an engine and its test driver.
///
/// Clones observe the same time. The clock never moves on its own.
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    nanos: Arc<AtomicU64>,
}

impl VirtualClock {
    /// Creates a clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Timestamp {
        Timestamp::from_nanos(self.nanos.load(Ordering::SeqCst))
    }

    /// Moves the clock forward by `d`.
    pub fn advance(&self, d: Duration) {
        self.nanos.fetch_add(duration_nanos(d), Ordering::SeqCst);
    }
}

/// The time source an engine measures against.
#[derive(Debug, Clone)]
pub enum EngineClock {
    /// Host monotonic time; blocking really blocks the thread.
    Wall { epoch: Instant },
    /// Simulated time; blocking advances the clock instead.
    Virtual(VirtualClock),
}

impl EngineClock {
    /// A wall clock whose epoch is now.
    pub fn wall() -> Self {
        EngineClock::Wall {
            epoch: Instant::now(),
        }
    }

    /// Current time on this clock.
    pub fn now(&self) -> Timestamp {
        match self {
            EngineClock::Wall { epoch } => Timestamp::from_nanos(duration_nanos(epoch.elapsed())),
            EngineClock::Virtual(clock) => clock.now(),
        }
    }

    /// Blocks the calling thread for `d` (or advances virtual time by `d`).
    pub fn block_for(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        match self {
            EngineClock::Wall { .. } => std::thread::sleep(d),
            EngineClock::Virtual(clock) => clock.advance(d),
        }
    }

    /// Blocks until the clock reaches `deadline`. Returns immediately if it
    /// already has.
    pub fn block_until(&self, deadline: Timestamp) {
        let now = self.now();
        if deadline > now {
            self.block_for(deadline - now);
        }
    }

    /// Returns `true` for a simulated clock.
    pub fn is_virtual(&self) -> bool {
        matches!(self, EngineClock::Virtual(_))
    }
}

impl Default for EngineClock {
    fn default() -> Self {
        EngineClock::wall()
    }
}

fn duration_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}
