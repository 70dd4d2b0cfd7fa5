// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # idle-harness
//!
//! Measures how an inference engine's single-step decode latency changes
//! after the device has been left idle.
//!
//! For every idle duration in an [`IdleSchedule`] the harness sleeps, times
//! one decode of a fixed one-token [`ProbeBatch`](probe_engine::ProbeBatch)
//! through to completion, resets the engine's context cache, and repeats.
//! Each duration's samples reduce to a mean and a sample standard deviation.
//!
//! # Modules
//!
//! - [`trial`]: one sleep, decode, synchronize measurement plus the cache reset
//! - [`sweep`]: the lazy per-duration iterator
//! - [`stats`]: streaming mean / standard deviation
//! - [`schedule`]: idle durations
//! - [`config`]: TOML configuration
//! - [`report`]: text, JSON-lines and CSV output
//!
//! # Example
//! ```no_run
//! use idle_harness::{run_sweep, IdleSchedule, OutputFormat, SummaryWriter};
//! use probe_engine::synthetic::SyntheticBackend;
//! use probe_engine::{Backend, Model, ModelParams, ProbeBatch, SessionParams};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let model = SyntheticBackend::default().load_model(Path::new("model.gguf"), &ModelParams::default())?;
//! let mut session = model.create_session(&SessionParams::default())?;
//! let batch = ProbeBatch::single(model.placeholder_token());
//!
//! let mut out = SummaryWriter::new(std::io::stdout(), OutputFormat::Text);
//! for summary in run_sweep(&mut session, &batch, IdleSchedule::default(), 10)? {
//!     out.write(&summary?, None)?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod report;
pub mod schedule;
pub mod sleeper;
pub mod stats;
pub mod sweep;
pub mod trial;

pub use config::{HarnessConfig, IdleConfig};
pub use error::HarnessError;
pub use report::{format_text, OutputFormat, SummaryWriter};
pub use schedule::IdleSchedule;
pub use sleeper::{IdleSleeper, ThreadSleeper};
pub use stats::{summarize, SampleAccumulator, SampleStats};
pub use sweep::{run_sweep, DurationSummary, Sweep};
pub use trial::{reset_session, run_trial, TrialSample};
