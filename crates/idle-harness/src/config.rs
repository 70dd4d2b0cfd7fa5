// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Harness configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! model_path = "./models/tiny.gguf"
//! n_gpu_layers = 99
//! n_ctx = 512
//! n_batch = 512
//! precise_timing = true
//! trials_per_duration = 10
//! output_format = "text"
//! device_stats = false
//!
//! [idle]
//! start_ms = 0
//! max_ms = 2200
//! step_ms = 200
//! # points_ms = [0, 100, 500]
//!
//! [synthetic]
//! decode_ms = 12.0
//! idle_threshold_ms = 400
//! ```
//!
//! Everything except `model_path` is optional.

use crate::{HarnessError, IdleSchedule, OutputFormat};
use probe_engine::synthetic::LatencyProfile;
use probe_engine::{ModelParams, SessionParams};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for one sweep.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HarnessConfig {
    /// Path to the model file.
    pub model_path: PathBuf,
    /// Layers to offload to the accelerator.
    #[serde(default = "default_n_gpu_layers")]
    pub n_gpu_layers: u32,
    /// Context window in tokens.
    #[serde(default = "default_window")]
    pub n_ctx: u32,
    /// Maximum tokens per decode.
    #[serde(default = "default_window")]
    pub n_batch: u32,
    /// Keep full clock resolution in engine timestamps.
    #[serde(default = "default_true")]
    pub precise_timing: bool,
    /// Trials per idle duration.
    #[serde(default = "default_trials")]
    pub trials_per_duration: usize,
    #[serde(default)]
    pub output_format: OutputFormat,
    /// Attach a device snapshot to every output record.
    #[serde(default)]
    pub device_stats: bool,
    #[serde(default)]
    pub idle: IdleConfig,
    /// Cost model of the simulated engine.
    #[serde(default)]
    pub synthetic: LatencyProfile,
}

/// The `[idle]` table.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct IdleConfig {
    pub start_ms: u64,
    pub max_ms: u64,
    pub step_ms: u64,
    /// Explicit durations; overrides the range when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_ms: Option<Vec<u64>>,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            start_ms: 0,
            max_ms: 2200,
            step_ms: 200,
            points_ms: None,
        }
    }
}

fn default_n_gpu_layers() -> u32 {
    ModelParams::default().n_gpu_layers
}

fn default_window() -> u32 {
    512
}

fn default_true() -> bool {
    true
}

fn default_trials() -> usize {
    10
}

impl HarnessConfig {
    /// A config for `model_path` with every other field at its default.
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            n_gpu_layers: default_n_gpu_layers(),
            n_ctx: default_window(),
            n_batch: default_window(),
            precise_timing: true,
            trials_per_duration: default_trials(),
            output_format: OutputFormat::default(),
            device_stats: false,
            idle: IdleConfig::default(),
            synthetic: LatencyProfile::default(),
        }
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, HarnessError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HarnessError::ConfigError(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, HarnessError> {
        toml::from_str(toml_str)
            .map_err(|e| HarnessError::ConfigError(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, HarnessError> {
        toml::to_string_pretty(self)
            .map_err(|e| HarnessError::ConfigError(format!("TOML serialise error: {e}")))
    }

    /// Builds the idle schedule from the `[idle]` table.
    pub fn schedule(&self) -> Result<IdleSchedule, HarnessError> {
        match &self.idle.points_ms {
            Some(points) => IdleSchedule::from_millis(points),
            None => IdleSchedule::linear(
                Duration::from_millis(self.idle.start_ms),
                Duration::from_millis(self.idle.max_ms),
                Duration::from_millis(self.idle.step_ms),
            ),
        }
    }

    pub fn model_params(&self) -> ModelParams {
        ModelParams {
            n_gpu_layers: self.n_gpu_layers,
        }
    }

    pub fn session_params(&self) -> SessionParams {
        SessionParams {
            n_ctx: self.n_ctx,
            n_batch: self.n_batch,
            precise_timing: self.precise_timing,
        }
    }

    /// Checks every field that could only fail later, mid-setup.
    pub fn validate(&self) -> Result<(), HarnessError> {
        if self.model_path.as_os_str().is_empty() {
            return Err(HarnessError::ConfigError("model_path is empty".into()));
        }
        if self.trials_per_duration == 0 {
            return Err(HarnessError::InvalidTrialCount(0));
        }
        if self.n_ctx == 0 || self.n_batch == 0 {
            return Err(HarnessError::ConfigError(format!(
                "n_ctx and n_batch must be at least 1 (got {} and {})",
                self.n_ctx, self.n_batch
            )));
        }
        let schedule = self.schedule()?;
        if schedule.total_idle(self.trials_per_duration).is_none() {
            return Err(HarnessError::InvalidSchedule(format!(
                "total idle time of {} trials per duration overflows",
                self.trials_per_duration
            )));
        }
        self.synthetic
            .validate()
            .map_err(|e| HarnessError::ConfigError(format!("[synthetic] {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let c = HarnessConfig::from_toml(r#"model_path = "/tmp/m.gguf""#).unwrap();
        assert_eq!(c, HarnessConfig::new("/tmp/m.gguf"));
        assert_eq!(c.n_gpu_layers, 99);
        assert_eq!(c.n_ctx, 512);
        assert_eq!(c.trials_per_duration, 10);
        assert_eq!(c.output_format, OutputFormat::Text);
        assert_eq!(c.schedule().unwrap(), IdleSchedule::default());
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
model_path = "/tmp/model.gguf"
n_gpu_layers = 0
precise_timing = false
trials_per_duration = 3
output_format = "csv"
device_stats = true

[idle]
points_ms = [0, 100, 500]

[synthetic]
decode_ms = 2.5
asynchronous = false
"#;
        let c = HarnessConfig::from_toml(toml).unwrap();
        assert_eq!(c.model_params().n_gpu_layers, 0);
        assert!(!c.session_params().precise_timing);
        assert_eq!(c.trials_per_duration, 3);
        assert_eq!(c.output_format, OutputFormat::Csv);
        assert!(c.device_stats);
        assert_eq!(c.schedule().unwrap(), IdleSchedule::from_millis(&[0, 100, 500]).unwrap());
        assert_eq!(c.synthetic.decode_ms, 2.5);
        assert!(!c.synthetic.asynchronous);
        // Unset profile keys keep their defaults.
        assert_eq!(c.synthetic.idle_threshold_ms, 400);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_missing_model_path() {
        let err = HarnessConfig::from_toml("n_ctx = 64").unwrap_err();
        assert!(err.to_string().contains("model_path"));
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let mut c = HarnessConfig::new("./models/tiny.gguf");
        c.idle.points_ms = Some(vec![0, 50]);
        c.output_format = OutputFormat::Json;
        let toml = c.to_toml().unwrap();
        assert_eq!(HarnessConfig::from_toml(&toml).unwrap(), c);
    }

    #[test]
    fn test_validate_rejects() {
        let mut c = HarnessConfig::new("m.gguf");
        c.trials_per_duration = 0;
        assert!(matches!(c.validate(), Err(HarnessError::InvalidTrialCount(0))));

        let mut c = HarnessConfig::new("m.gguf");
        c.idle.step_ms = 0;
        assert!(matches!(c.validate(), Err(HarnessError::InvalidSchedule(_))));

        let mut c = HarnessConfig::new("m.gguf");
        c.idle.points_ms = Some(vec![0, u64::MAX]);
        c.trials_per_duration = 2000;
        assert!(matches!(c.validate(), Err(HarnessError::InvalidSchedule(_))));
        c.trials_per_duration = 1;
        assert!(c.validate().is_ok());

        let mut c = HarnessConfig::new("m.gguf");
        c.n_batch = 0;
        assert!(c.validate().is_err());

        let mut c = HarnessConfig::new("m.gguf");
        c.synthetic.decode_ms = -1.0;
        assert!(c.validate().unwrap_err().to_string().contains("[synthetic]"));
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join("idle_harness_config_test.toml");
        std::fs::write(&path, "model_path = \"x.gguf\"\ntrials_per_duration = 2\n").unwrap();
        let c = HarnessConfig::from_file(&path).unwrap();
        assert_eq!(c.trials_per_duration, 2);
        std::fs::remove_file(&path).ok();

        assert!(HarnessConfig::from_file(Path::new("/nonexistent/config.toml")).is_err());
    }
}
