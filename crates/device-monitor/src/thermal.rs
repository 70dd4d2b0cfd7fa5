// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Thermal zone readings via `/sys/class/thermal/`.
//!
//! The kernel reports zone temperatures in millidegrees Celsius.

use crate::sysfs::read_number;
use crate::MonitorError;
use std::path::Path;

/// Default sysfs path for the first thermal zone.
const THERMAL_ZONE_PATH: &str = "/sys/class/thermal/thermal_zone0/temp";

/// Temperature above which most parts start to throttle (degrees Celsius).
const THROTTLE_THRESHOLD_C: f32 = 85.0;

/// Thermal state of the package.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ThermalInfo {
    /// Temperature in degrees Celsius.
    pub temp_celsius: f32,
}

impl ThermalInfo {
    /// Reads thermal zone 0.
    pub fn read() -> Result<Self, MonitorError> {
        Self::read_from(Path::new(THERMAL_ZONE_PATH))
    }

    /// Reads a temperature file in millidegrees Celsius.
    pub(crate) fn read_from(path: &Path) -> Result<Self, MonitorError> {
        let millidegrees: i64 = read_number(path, "millidegrees")?;
        Ok(Self {
            temp_celsius: millidegrees as f32 / 1000.0,
        })
    }

    /// Returns `true` at or above the throttle threshold.
    pub fn is_hot(&self) -> bool {
        self.temp_celsius >= THROTTLE_THRESHOLD_C
    }
}
