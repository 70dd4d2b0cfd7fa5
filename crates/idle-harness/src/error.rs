// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the idle sweep.

use std::time::Duration;

/// Errors that can occur while configuring or running a sweep.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// The engine failed outside of a trial (model load, session creation).
    #[error("engine error: {0}")]
    Engine(#[from] probe_engine::EngineError),

    /// The warm-up trial failed; no bucket was measured.
    #[error("warm-up trial failed: {0}")]
    WarmupFailed(#[source] probe_engine::EngineError),

    /// A measured trial failed; the sweep was aborted.
    #[error("trial {trial} of bucket {bucket} (idle {idle:?}) failed: {source}")]
    TrialFailed {
        /// 1-based bucket index.
        bucket: usize,
        /// 1-based trial index within the bucket.
        trial: usize,
        idle: Duration,
        #[source]
        source: probe_engine::EngineError,
    },

    /// Statistics were requested for zero samples.
    #[error("cannot summarize an empty sample set")]
    EmptySample,

    /// The idle schedule is empty, unordered or malformed.
    #[error("invalid idle schedule: {0}")]
    InvalidSchedule(String),

    /// A sweep needs at least one trial per duration.
    #[error("trials per duration must be at least 1, got {0}")]
    InvalidTrialCount(usize),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Writing results failed.
    #[error("output error: {0}")]
    Output(#[from] std::io::Error),
}
