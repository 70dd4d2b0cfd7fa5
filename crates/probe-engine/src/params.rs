// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Load-time and session-time engine parameters.

/// Parameters passed when loading a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ModelParams {
    /// Number of layers to offload to the accelerator. Values at or above the
    /// model's layer count mean "offload everything".
    pub n_gpu_layers: u32,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self { n_gpu_layers: 99 }
    }
}

/// Parameters passed when creating a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SessionParams {
    /// Context window in tokens.
    pub n_ctx: u32,
    /// Maximum tokens accepted by a single decode call.
    pub n_batch: u32,
    /// Keep full-resolution engine timestamps.
    pub precise_timing: bool,
}

impl Default for SessionParams {
    fn default() -> Self {
        Self {
            n_ctx: 512,
            n_batch: 512,
            precise_timing: true,
        }
    }
}
