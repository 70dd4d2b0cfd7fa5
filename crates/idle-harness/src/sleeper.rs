// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! How the harness waits out an idle period.
//!
//! Production code blocks the calling thread with [`ThreadSleeper`]; a
//! spin-wait would keep the very hardware busy whose idle behaviour is under
//! test. Tests advance a [`VirtualClock`] instead.

use probe_engine::VirtualClock;
use std::time::Duration;

/// Suspends the sweep for an idle period.
pub trait IdleSleeper {
    /// Waits for `idle`. Implementations must not return early on purpose.
    fn sleep(&mut self, idle: Duration);
}

/// Blocks the calling thread with [`std::thread::sleep`].
///
/// Best effort: actual granularity depends on the host scheduler and is not
/// corrected for.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl IdleSleeper for ThreadSleeper {
    fn sleep(&mut self, idle: Duration) {
        std::thread::sleep(idle);
    }
}

/// Advances simulated engine time instead of sleeping.
impl IdleSleeper for VirtualClock {
    fn sleep(&mut self, idle: Duration) {
        self.advance(idle);
    }
}

impl<T: IdleSleeper + ?Sized> IdleSleeper for &mut T {
    fn sleep(&mut self, idle: Duration) {
        (**self).sleep(idle);
    }
}
