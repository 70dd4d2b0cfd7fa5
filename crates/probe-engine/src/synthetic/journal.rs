// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Call journal for asserting on the exact sequence of engine calls.

use std::sync::{Arc, Mutex, MutexGuard};

/// One call made against a synthetic session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineCall {
    Now,
    Decode,
    Synchronize,
    ResetCache,
    RebuildCache,
}

/// A shared, append-only log of [`EngineCall`]s.
///
/// Clones append to the same log, so a test keeps one clone and hands the
/// other to the backend.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    calls: Arc<Mutex<Vec<EngineCall>>>,
}

impl Journal {
    /// Creates an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a call.
    pub fn record(&self, call: EngineCall) {
        self.lock().push(call);
    }

    /// Returns a copy of every call recorded so far.
    pub fn calls(&self) -> Vec<EngineCall> {
        self.lock().clone()
    }

    /// Number of times `call` was recorded.
    pub fn count(&self, call: EngineCall) -> usize {
        self.lock().iter().filter(|c| **c == call).count()
    }

    /// Total number of recorded calls.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Forgets everything recorded so far.
    pub fn clear(&self) {
        self.lock().clear();
    }

    // A panic while holding the lock cannot leave a Vec half-pushed, so a
    // poisoned journal is still consistent.
    fn lock(&self) -> MutexGuard<'_, Vec<EngineCall>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_between_clones() {
        let journal = Journal::new();
        let handle = journal.clone();
        handle.record(EngineCall::Decode);
        handle.record(EngineCall::Synchronize);
        handle.record(EngineCall::Decode);

        assert_eq!(journal.len(), 3);
        assert_eq!(journal.count(EngineCall::Decode), 2);
        assert_eq!(
            journal.calls(),
            vec![EngineCall::Decode, EngineCall::Synchronize, EngineCall::Decode]
        );
    }

    #[test]
    fn test_clear() {
        let journal = Journal::new();
        journal.record(EngineCall::Now);
        journal.clear();
        assert!(journal.is_empty());
    }

    #[test]
    fn test_serialize_snake_case() {
        let json = serde_json::to_string(&EngineCall::ResetCache).unwrap();
        assert_eq!(json, "\"reset_cache\"");
    }
}
