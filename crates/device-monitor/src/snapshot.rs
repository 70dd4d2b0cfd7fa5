// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Aggregated point-in-time device snapshot.

use crate::{CpuInfo, ThermalInfo};
use std::time::{SystemTime, UNIX_EPOCH};

/// CPU and thermal readings taken together.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DeviceSnapshot {
    /// CPU clock state.
    pub cpu: CpuInfo,
    /// Thermal state, `None` when no thermal zone is exposed.
    pub thermal: Option<ThermalInfo>,
    /// Unix timestamp in milliseconds when the snapshot was taken.
    pub timestamp_ms: u64,
}

impl DeviceSnapshot {
    /// Reads all device metrics. Never fails: unavailable subsystems are
    /// logged at debug level and reported as defaults.
    pub fn capture() -> Self {
        let cpu = CpuInfo::read().unwrap_or_else(|e| {
            tracing::debug!("cpufreq unavailable: {e}");
            CpuInfo::unavailable()
        });
        let thermal = ThermalInfo::read()
            .map_err(|e| tracing::debug!("thermal zone unavailable: {e}"))
            .ok();

        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        Self {
            cpu,
            thermal,
            timestamp_ms,
        }
    }

    /// Returns `true` if the CPU is below its max clock or the package is hot.
    pub fn is_throttled(&self) -> bool {
        self.cpu.is_downclocked() || self.thermal.as_ref().is_some_and(ThermalInfo::is_hot)
    }

    /// One-line description for logs and CLI output.
    ///
    /// ```text
    /// Device: CPU 1200/3600 MHz (33%, powersave), 8 cores, Temp 54.3°C
    /// ```
    pub fn summary(&self) -> String {
        let clock = if self.cpu.max_frequency_mhz == 0 {
            "clock n/a".to_string()
        } else {
            let governor = self
                .cpu
                .governor
                .as_deref()
                .map(|g| format!(", {g}"))
                .unwrap_or_default();
            format!(
                "{}/{} MHz ({:.0}%{governor})",
                self.cpu.frequency_mhz,
                self.cpu.max_frequency_mhz,
                self.cpu.frequency_ratio() * 100.0,
            )
        };
        let temp = match &self.thermal {
            Some(t) => format!("{:.1}°C", t.temp_celsius),
            None => "n/a".to_string(),
        };
        format!(
            "Device: CPU {clock}, {} cores, Temp {temp}",
            self.cpu.online_cores
        )
    }
}
