// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! CPU clock state.
//!
//! Reads from `/sys/devices/system/cpu/`:
//! - `cpu0/cpufreq/scaling_{cur,min,max}_freq`: clocks in kHz.
//! - `cpu0/cpufreq/scaling_governor`: the frequency policy.
//! - `online`: online core ranges such as `"0-7"`.
//!
//! A clock that sags between probes after idle periods is exactly the effect
//! an idle sweep is trying to expose.

use crate::sysfs::{read_number, read_trimmed};
use crate::MonitorError;
use std::path::Path;

/// Base sysfs path for CPU information.
const CPU_BASE: &str = "/sys/devices/system/cpu";

/// CPU clock information.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct CpuInfo {
    /// Current frequency of core 0 in MHz.
    pub frequency_mhz: u32,
    /// Lowest frequency the governor may select, in MHz.
    pub min_frequency_mhz: u32,
    /// Highest frequency the governor may select, in MHz.
    pub max_frequency_mhz: u32,
    /// Active cpufreq governor, if exposed.
    pub governor: Option<String>,
    /// Number of online cores.
    pub online_cores: u32,
}

impl CpuInfo {
    /// Reads CPU clock state from sysfs.
    pub fn read() -> Result<Self, MonitorError> {
        Self::read_from(Path::new(CPU_BASE))
    }

    /// Reads CPU clock state from a sysfs tree rooted at `base`.
    pub(crate) fn read_from(base: &Path) -> Result<Self, MonitorError> {
        let freq_dir = base.join("cpu0").join("cpufreq");

        let frequency_mhz = read_mhz(&freq_dir.join("scaling_cur_freq"))?;
        let max_frequency_mhz = read_mhz(&freq_dir.join("scaling_max_freq"))?;
        let min_frequency_mhz = read_mhz(&freq_dir.join("scaling_min_freq")).unwrap_or(0);
        let governor = read_trimmed(&freq_dir.join("scaling_governor")).ok();

        Ok(Self {
            frequency_mhz,
            min_frequency_mhz,
            max_frequency_mhz,
            governor,
            online_cores: read_online_cores(base),
        })
    }

    /// Placeholder used when cpufreq is not exposed: clocks are zero and
    /// only the core count is known.
    pub fn unavailable() -> Self {
        Self {
            online_cores: available_parallelism(),
            ..Default::default()
        }
    }

    /// Returns `true` if core 0 is running below its maximum clock.
    pub fn is_downclocked(&self) -> bool {
        self.max_frequency_mhz > 0 && self.frequency_mhz < self.max_frequency_mhz
    }

    /// Returns `current / max` in `[0.0, 1.0]`, or `0.0` if unknown.
    pub fn frequency_ratio(&self) -> f32 {
        if self.max_frequency_mhz == 0 {
            return 0.0;
        }
        (self.frequency_mhz as f32 / self.max_frequency_mhz as f32).min(1.0)
    }
}

/// Reads a frequency in kHz and returns it in MHz.
fn read_mhz(path: &Path) -> Result<u32, MonitorError> {
    let khz: u64 = read_number(path, "kHz")?;
    Ok((khz / 1000) as u32)
}

fn read_online_cores(base: &Path) -> u32 {
    read_trimmed(&base.join("online"))
        .ok()
        .and_then(|s| parse_cpu_range(&s))
        .unwrap_or_else(available_parallelism)
}

fn available_parallelism() -> u32 {
    std::thread::available_parallelism()
        .map(|n| n.get() as u32)
        .unwrap_or(1)
}

/// Parses a CPU range list: `"0-3"` → 4, `"0"` → 1, `"0,2-3"` → 3.
fn parse_cpu_range(s: &str) -> Option<u32> {
    let mut total = 0u32;
    for part in s.split(',') {
        let part = part.trim();
        if let Some((start, end)) = part.split_once('-') {
            let start: u32 = start.trim().parse().ok()?;
            let end: u32 = end.trim().parse().ok()?;
            total += end.checked_sub(start)? + 1;
        } else {
            let _: u32 = part.parse().ok()?;
            total += 1;
        }
    }
    (total > 0).then_some(total)
}
