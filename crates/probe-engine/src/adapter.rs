// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The engine capability traits.
//!
//! ```text
//! Backend ──load_model──▶ Model ──create_session──▶ Session
//!                                                     │
//!                          decode · synchronize · reset_cache
//!                          rebuild_cache · now
//! ```

use crate::{EngineError, ModelParams, ProbeBatch, SessionParams, Timestamp, TokenId};
use std::path::Path;

/// An inference runtime able to load models.
pub trait Backend {
    /// The loaded-model handle this backend produces.
    type Model: Model;

    /// Returns a short identifier for logs (e.g., `"synthetic"`).
    fn name(&self) -> &'static str;

    /// Loads the model at `path`.
    fn load_model(&self, path: &Path, params: &ModelParams) -> Result<Self::Model, EngineError>;
}

/// A loaded model. Dropping it releases the weights once no session
/// refers to them.
pub trait Model {
    /// The session type created from this model.
    type Session: Session;

    /// Human-readable model description.
    fn description(&self) -> String;

    /// The token used to build the probe batch (beginning-of-sequence).
    fn placeholder_token(&self) -> TokenId;

    /// Creates working state for decoding.
    fn create_session(&self, params: &SessionParams) -> Result<Self::Session, EngineError>;
}

/// Mutable engine working state.
///
/// `decode` may return before the work finishes; only `synchronize`
/// guarantees completion. Timestamps must come from [`Session::now`].
pub trait Session {
    /// Submits one forward step over `batch`.
    fn decode(&mut self, batch: &ProbeBatch) -> Result<(), EngineError>;

    /// Blocks until all previously submitted work has completed.
    fn synchronize(&mut self) -> Result<(), EngineError>;

    /// Discards accumulated context. Takes effect on the next
    /// [`Session::rebuild_cache`] (or lazily inside the next decode).
    fn reset_cache(&mut self);

    /// Applies pending cache changes now.
    fn rebuild_cache(&mut self) -> Result<(), EngineError>;

    /// Reads the engine's high-resolution monotonic clock.
    fn now(&self) -> Timestamp;

    /// Tokens currently held in the context cache.
    fn cached_tokens(&self) -> usize;
}
