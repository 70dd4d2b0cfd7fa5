// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Synthetic session: context cache, work queue and scripted failures.

use super::{EngineCall, ModelInner};
use crate::{EngineError, ProbeBatch, Session, SessionParams, Timestamp};
use std::sync::Arc;
use std::time::Duration;

/// Working state of a [`SyntheticModel`](super::SyntheticModel).
///
/// Work submitted by `decode` completes at a computed deadline on the
/// engine clock. In asynchronous mode the deadline is only awaited by
/// `synchronize`, so timing a decode without synchronizing measures
/// submission, not compute.
#[derive(Debug)]
pub struct SyntheticSession {
    model: Arc<ModelInner>,
    n_ctx: usize,
    n_batch: usize,
    precise_timing: bool,
    /// Tokens held in the context cache.
    cached: usize,
    /// A reset was requested but not yet applied.
    pending_clear: bool,
    /// Completion time of queued work, if any.
    busy_until: Option<Timestamp>,
    /// Completion time of the most recent decode.
    last_completion: Option<Timestamp>,
    decode_calls: usize,
    synchronize_calls: usize,
    rebuild_calls: usize,
}

impl SyntheticSession {
    pub(crate) fn new(model: Arc<ModelInner>, params: &SessionParams) -> Self {
        Self {
            model,
            n_ctx: params.n_ctx as usize,
            n_batch: params.n_batch.min(params.n_ctx) as usize,
            precise_timing: params.precise_timing,
            cached: 0,
            pending_clear: false,
            busy_until: None,
            last_completion: None,
            decode_calls: 0,
            synchronize_calls: 0,
            rebuild_calls: 0,
        }
    }

    /// Number of decode calls made so far.
    pub fn decode_calls(&self) -> usize {
        self.decode_calls
    }

    /// Returns `true` if submitted work has not been awaited yet.
    pub fn has_pending_work(&self) -> bool {
        self.busy_until.is_some()
    }

    fn record(&self, call: EngineCall) {
        if let Some(journal) = &self.model.journal {
            journal.record(call);
        }
    }

    fn apply_clear(&mut self) {
        self.cached = 0;
        self.pending_clear = false;
    }
}

impl Session for SyntheticSession {
    fn decode(&mut self, batch: &ProbeBatch) -> Result<(), EngineError> {
        self.record(EngineCall::Decode);
        self.decode_calls += 1;
        let call = self.decode_calls;

        if self.model.failures.decode_call == Some(call) {
            return Err(EngineError::Decode {
                call,
                detail: "injected failure".into(),
            });
        }
        if batch.len() > self.n_batch {
            return Err(EngineError::Decode {
                call,
                detail: format!("batch of {} tokens exceeds n_batch {}", batch.len(), self.n_batch),
            });
        }

        let model = Arc::clone(&self.model);
        let clock = &model.clock;
        let profile = &model.profile;

        // Work queues behind anything still in flight.
        let start = match self.busy_until {
            Some(busy) => busy.max(clock.now()),
            None => clock.now(),
        };

        // An un-rebuilt reset is applied here, inside the decode.
        let mut latency = Duration::ZERO;
        if self.pending_clear {
            latency += profile.rebuild_cost();
            self.apply_clear();
        }

        if self.cached + batch.len() > self.n_ctx {
            return Err(EngineError::ContextFull {
                used: self.cached,
                requested: batch.len(),
                capacity: self.n_ctx,
            });
        }

        let idle = self.last_completion.map(|done| start - done);
        latency += profile.decode_latency(model.params.n_gpu_layers, self.cached, idle);
        self.cached += batch.len();

        let done = start.saturating_add(latency);
        self.last_completion = Some(done);
        tracing::trace!(
            "decode #{call}: {:?} (cached={}, idle={:?})",
            latency,
            self.cached,
            idle,
        );

        if profile.asynchronous {
            self.busy_until = Some(done);
        } else {
            clock.block_until(done);
        }
        Ok(())
    }

    fn synchronize(&mut self) -> Result<(), EngineError> {
        self.record(EngineCall::Synchronize);
        self.synchronize_calls += 1;
        let call = self.synchronize_calls;

        if self.model.failures.synchronize_call == Some(call) {
            return Err(EngineError::Synchronize {
                call,
                detail: "injected failure".into(),
            });
        }
        if let Some(deadline) = self.busy_until.take() {
            self.model.clock.block_until(deadline);
        }
        Ok(())
    }

    fn reset_cache(&mut self) {
        self.record(EngineCall::ResetCache);
        self.pending_clear = true;
    }

    fn rebuild_cache(&mut self) -> Result<(), EngineError> {
        self.record(EngineCall::RebuildCache);
        self.rebuild_calls += 1;
        if self.model.failures.rebuild_call == Some(self.rebuild_calls) {
            return Err(EngineError::CacheRebuild(format!(
                "injected failure on rebuild #{}",
                self.rebuild_calls
            )));
        }
        if self.pending_clear {
            self.model.clock.block_for(self.model.profile.rebuild_cost());
            self.apply_clear();
        }
        Ok(())
    }

    fn now(&self) -> Timestamp {
        self.record(EngineCall::Now);
        let t = self.model.clock.now();
        if self.precise_timing {
            t
        } else {
            t.truncate_to_millis()
        }
    }

    fn cached_tokens(&self) -> usize {
        self.cached
    }
}

impl Drop for SyntheticSession {
    fn drop(&mut self) {
        tracing::debug!(
            "synthetic session released after {} decodes",
            self.decode_calls
        );
    }
}
