// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Latency model of the synthetic engine.
//!
//! One decode costs:
//!
//! ```text
//! decode_ms · max(1 − offload_speedup_per_layer · min(ngl, 99), 0.05)
//!   + context_cost_us · cached_tokens
//!   + min(idle_penalty_ms_per_s · (idle − idle_threshold), idle_penalty_max_ms)
//! ```
//!
//! The last term imitates an accelerator dropping into a low-power state
//! after sitting idle for longer than `idle_threshold_ms`.

use std::time::Duration;

/// Upper bound on the layer count used by the offload term.
const MAX_OFFLOAD_LAYERS: u32 = 99;

/// Floor for the offload factor so full offload never means free compute.
const MIN_OFFLOAD_FACTOR: f64 = 0.05;

/// Tunable cost model for [`SyntheticBackend`](super::SyntheticBackend).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LatencyProfile {
    /// Base cost of one decode step with nothing offloaded, in milliseconds.
    pub decode_ms: f64,
    /// Fractional speedup contributed by each offloaded layer.
    pub offload_speedup_per_layer: f64,
    /// Extra cost per token already held in the context cache, in microseconds.
    pub context_cost_us: f64,
    /// Idle time tolerated before the wake-up penalty starts, in milliseconds.
    pub idle_threshold_ms: u64,
    /// Wake-up penalty per second of idleness beyond the threshold.
    pub idle_penalty_ms_per_s: f64,
    /// Cap on the wake-up penalty, in milliseconds.
    pub idle_penalty_max_ms: f64,
    /// Cost of applying a pending cache reset, in microseconds.
    pub cache_rebuild_us: f64,
    /// When `true`, `decode` only enqueues work and `synchronize` waits for it.
    pub asynchronous: bool,
}

impl Default for LatencyProfile {
    fn default() -> Self {
        Self {
            decode_ms: 12.0,
            offload_speedup_per_layer: 0.005,
            context_cost_us: 40.0,
            idle_threshold_ms: 400,
            idle_penalty_ms_per_s: 6.0,
            idle_penalty_max_ms: 30.0,
            cache_rebuild_us: 50.0,
            asynchronous: true,
        }
    }
}

impl LatencyProfile {
    /// A profile where every decode costs exactly `latency`, independent of
    /// offload, context length and idle time.
    pub fn fixed(latency: Duration) -> Self {
        Self {
            decode_ms: latency.as_secs_f64() * 1000.0,
            offload_speedup_per_layer: 0.0,
            context_cost_us: 0.0,
            idle_threshold_ms: 0,
            idle_penalty_ms_per_s: 0.0,
            idle_penalty_max_ms: 0.0,
            cache_rebuild_us: 0.0,
            asynchronous: true,
        }
    }

    /// Checks that every term is finite and non-negative, and that a decode
    /// costs something.
    pub fn validate(&self) -> Result<(), String> {
        let terms = [
            ("decode_ms", self.decode_ms),
            ("offload_speedup_per_layer", self.offload_speedup_per_layer),
            ("context_cost_us", self.context_cost_us),
            ("idle_penalty_ms_per_s", self.idle_penalty_ms_per_s),
            ("idle_penalty_max_ms", self.idle_penalty_max_ms),
            ("cache_rebuild_us", self.cache_rebuild_us),
        ];
        for (name, value) in terms {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be a finite non-negative number, got {value}"));
            }
        }
        if self.decode_ms == 0.0 {
            return Err("decode_ms must be greater than zero".into());
        }
        Ok(())
    }

    /// Cost of one decode step.
    ///
    /// `idle` is the time since the previous decode completed, `None` for the
    /// first decode of a session.
    pub fn decode_latency(
        &self,
        n_gpu_layers: u32,
        cached_tokens: usize,
        idle: Option<Duration>,
    ) -> Duration {
        let offloaded = n_gpu_layers.min(MAX_OFFLOAD_LAYERS) as f64;
        let factor = (1.0 - self.offload_speedup_per_layer * offloaded).max(MIN_OFFLOAD_FACTOR);
        let compute_ms = self.decode_ms * factor;
        let context_ms = self.context_cost_us * cached_tokens as f64 / 1000.0;

        millis(compute_ms + context_ms) + idle.map(|d| self.idle_penalty(d)).unwrap_or_default()
    }

    /// Wake-up penalty after `idle` of inactivity.
    pub fn idle_penalty(&self, idle: Duration) -> Duration {
        let threshold = Duration::from_millis(self.idle_threshold_ms);
        if idle <= threshold {
            return Duration::ZERO;
        }
        let excess_s = (idle - threshold).as_secs_f64();
        millis((self.idle_penalty_ms_per_s * excess_s).min(self.idle_penalty_max_ms))
    }

    /// Cost of applying a pending cache reset.
    pub fn rebuild_cost(&self) -> Duration {
        millis(self.cache_rebuild_us / 1000.0)
    }
}

fn millis(ms: f64) -> Duration {
    Duration::from_secs_f64(ms.max(0.0) / 1000.0)
}
