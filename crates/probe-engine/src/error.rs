// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the engine adapter.

/// Errors reported by an inference engine through the adapter traits.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The model file could not be loaded.
    #[error("unable to load model '{path}': {detail}")]
    ModelLoad { path: String, detail: String },

    /// The engine refused to create a session with the given parameters.
    #[error("failed to create session: {0}")]
    SessionCreate(String),

    /// A decode step failed.
    #[error("decode failed on call {call}: {detail}")]
    Decode { call: usize, detail: String },

    /// Waiting for queued work to complete failed.
    #[error("synchronize failed on call {call}: {detail}")]
    Synchronize { call: usize, detail: String },

    /// The decode would overflow the session's context window.
    #[error("context full: {used} tokens cached + {requested} requested > {capacity}")]
    ContextFull {
        used: usize,
        requested: usize,
        capacity: usize,
    },

    /// Applying a pending cache reset failed.
    #[error("cache rebuild failed: {0}")]
    CacheRebuild(String),
}
