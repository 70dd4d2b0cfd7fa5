// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # device-monitor
//!
//! Reads the host's clock and thermal state from `/sys/` so an idle-latency
//! sweep can be correlated with what the hardware was doing.
//!
//! # Monitored Metrics
//! - **CPU frequency**: current, minimum and maximum clock of core 0.
//! - **Frequency governor**: e.g. `powersave`, `schedutil`, `performance`.
//! - **Online cores**: from `/sys/devices/system/cpu/online`.
//! - **Temperature**: thermal zone 0.
//!
//! # Graceful Degradation
//! Containers and VMs often hide cpufreq and thermal zones. Missing readings
//! become zeros / `None` instead of errors, so [`DeviceSnapshot::capture`]
//! always succeeds.
//!
//! # Example
//! ```no_run
//! let snap = device_monitor::snapshot();
//! println!("{}", snap.summary());
//! if snap.cpu.is_downclocked() {
//!     println!("CPU is running below its maximum clock");
//! }
//! ```

mod cpu;
mod error;
mod snapshot;
mod sysfs;
mod thermal;

pub use cpu::CpuInfo;
pub use error::MonitorError;
pub use snapshot::DeviceSnapshot;
pub use thermal::ThermalInfo;

/// Captures a point-in-time snapshot of the host device state.
///
/// Convenience wrapper around [`DeviceSnapshot::capture()`].
pub fn snapshot() -> DeviceSnapshot {
    DeviceSnapshot::capture()
}
