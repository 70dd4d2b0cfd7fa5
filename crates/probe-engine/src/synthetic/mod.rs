// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! A simulated engine implementing the adapter traits.
//!
//! The synthetic backend stands in for a real runtime: it needs a model file
//! on disk (so setup failures behave like the real thing) but never reads
//! weights. Decode cost follows a [`LatencyProfile`], time comes from an
//! [`EngineClock`], and failures can be scripted with a [`FailurePlan`].
//!
//! With a [`VirtualClock`](crate::VirtualClock) nothing ever sleeps, which
//! makes multi-second sweeps run instantly under test.

mod journal;
mod profile;
mod session;

pub use journal::{EngineCall, Journal};
pub use profile::LatencyProfile;
pub use session::SyntheticSession;

use crate::{Backend, EngineClock, EngineError, Model, ModelParams, SessionParams, TokenId, VirtualClock};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Token id used as the probe placeholder (beginning-of-sequence).
pub const BOS_TOKEN: TokenId = 1;

/// Layer count reported by synthetic models.
pub const SYNTHETIC_LAYERS: u32 = 32;

/// Which engine calls should fail. Call numbers are 1-based and count every
/// call made on a session, warm-up included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FailurePlan {
    /// Fail this decode call.
    pub decode_call: Option<usize>,
    /// Fail this synchronize call.
    pub synchronize_call: Option<usize>,
    /// Fail this rebuild call.
    pub rebuild_call: Option<usize>,
}

impl FailurePlan {
    /// Fail the `n`-th decode.
    pub fn decode_at(n: usize) -> Self {
        Self {
            decode_call: Some(n),
            ..Default::default()
        }
    }

    /// Fail the `n`-th synchronize.
    pub fn synchronize_at(n: usize) -> Self {
        Self {
            synchronize_call: Some(n),
            ..Default::default()
        }
    }

    /// Fail the `n`-th cache rebuild.
    pub fn rebuild_at(n: usize) -> Self {
        Self {
            rebuild_call: Some(n),
            ..Default::default()
        }
    }
}

/// Loads [`SyntheticModel`]s.
#[derive(Debug, Clone, Default)]
pub struct SyntheticBackend {
    profile: LatencyProfile,
    clock: EngineClock,
    failures: FailurePlan,
    journal: Option<Journal>,
}

impl SyntheticBackend {
    /// Creates a backend with the given latency profile on a wall clock.
    pub fn new(profile: LatencyProfile) -> Self {
        Self {
            profile,
            ..Default::default()
        }
    }

    /// Uses `clock` for every model and session created afterwards.
    pub fn with_clock(mut self, clock: EngineClock) -> Self {
        self.clock = clock;
        self
    }

    /// Shorthand for `with_clock(EngineClock::Virtual(clock))`.
    pub fn with_virtual_clock(self, clock: VirtualClock) -> Self {
        self.with_clock(EngineClock::Virtual(clock))
    }

    /// Scripts failures.
    pub fn with_failures(mut self, failures: FailurePlan) -> Self {
        self.failures = failures;
        self
    }

    /// Records every session call into `journal`.
    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = Some(journal);
        self
    }

    /// The latency profile in effect.
    pub fn profile(&self) -> &LatencyProfile {
        &self.profile
    }
}

impl Backend for SyntheticBackend {
    type Model = SyntheticModel;

    fn name(&self) -> &'static str {
        "synthetic"
    }

    fn load_model(&self, path: &Path, params: &ModelParams) -> Result<SyntheticModel, EngineError> {
        let load_err = |detail: String| EngineError::ModelLoad {
            path: path.display().to_string(),
            detail,
        };

        self.profile.validate().map_err(|e| load_err(format!("invalid latency profile: {e}")))?;

        let meta = std::fs::metadata(path).map_err(|e| load_err(e.to_string()))?;
        if !meta.is_file() {
            return Err(load_err("not a regular file".into()));
        }

        let offloaded = params.n_gpu_layers.min(SYNTHETIC_LAYERS);
        tracing::info!(
            "loaded synthetic model '{}' ({} bytes, {offloaded}/{SYNTHETIC_LAYERS} layers offloaded)",
            path.display(),
            meta.len(),
        );

        Ok(SyntheticModel {
            inner: Arc::new(ModelInner {
                path: path.to_path_buf(),
                file_bytes: meta.len(),
                params: *params,
                profile: self.profile.clone(),
                clock: self.clock.clone(),
                failures: self.failures,
                journal: self.journal.clone(),
            }),
        })
    }
}

/// State shared between a model and the sessions created from it.
#[derive(Debug)]
pub(crate) struct ModelInner {
    pub(crate) path: PathBuf,
    pub(crate) file_bytes: u64,
    pub(crate) params: ModelParams,
    pub(crate) profile: LatencyProfile,
    pub(crate) clock: EngineClock,
    pub(crate) failures: FailurePlan,
    pub(crate) journal: Option<Journal>,
}

impl Drop for ModelInner {
    fn drop(&mut self) {
        tracing::debug!("synthetic model '{}' released", self.path.display());
    }
}

/// A loaded synthetic model.
#[derive(Debug, Clone)]
pub struct SyntheticModel {
    inner: Arc<ModelInner>,
}

impl SyntheticModel {
    /// Size of the backing model file in bytes.
    pub fn file_bytes(&self) -> u64 {
        self.inner.file_bytes
    }

    /// Number of live handles (this model, its clones, and open sessions).
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl Model for SyntheticModel {
    type Session = SyntheticSession;

    fn description(&self) -> String {
        format!(
            "synthetic '{}' ({} bytes, {} layers, {} offloaded)",
            self.inner.path.display(),
            self.inner.file_bytes,
            SYNTHETIC_LAYERS,
            self.inner.params.n_gpu_layers.min(SYNTHETIC_LAYERS),
        )
    }

    fn placeholder_token(&self) -> TokenId {
        BOS_TOKEN
    }

    fn create_session(&self, params: &SessionParams) -> Result<SyntheticSession, EngineError> {
        if params.n_ctx == 0 {
            return Err(EngineError::SessionCreate("n_ctx must be at least 1".into()));
        }
        if params.n_batch == 0 {
            return Err(EngineError::SessionCreate("n_batch must be at least 1".into()));
        }
        tracing::info!(
            "session created: n_ctx={}, n_batch={}, precise_timing={}",
            params.n_ctx,
            params.n_batch.min(params.n_ctx),
            params.precise_timing,
        );
        Ok(SyntheticSession::new(Arc::clone(&self.inner), params))
    }
}
