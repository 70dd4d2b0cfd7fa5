// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `idle-bench sweep` command: run the idle/probe sweep.
//!
//! ```text
//! config (file + flags) → load model → create session → warm-up
//!   → for each idle duration: trials → summary → stdout
//! ```
//!
//! Summaries are written as soon as each bucket completes. On a failed
//! trial the summaries already printed stay valid and the process exits
//! non-zero.

use anyhow::Context;
use device_monitor::DeviceSnapshot;
use idle_harness::{run_sweep, HarnessConfig, OutputFormat, SummaryWriter};
use probe_engine::synthetic::SyntheticBackend;
use probe_engine::{Backend, Model, ProbeBatch};
use std::path::PathBuf;

#[derive(clap::Args)]
pub struct SweepArgs {
    /// Path to the model file.
    #[arg(short, long, required_unless_present = "config")]
    model: Option<PathBuf>,

    /// Number of layers to offload to the accelerator.
    #[arg(short = 'g', long = "ngl", visible_alias = "n-gpu-layers")]
    n_gpu_layers: Option<u32>,

    /// TOML configuration file; flags given here override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Trials per idle duration.
    #[arg(short = 'n', long)]
    trials: Option<usize>,

    /// Longest idle duration in milliseconds.
    #[arg(long)]
    max_idle_ms: Option<u64>,

    /// Step between idle durations in milliseconds.
    #[arg(long)]
    step_ms: Option<u64>,

    /// Explicit comma-separated idle durations in milliseconds (e.g., "0,100,500").
    #[arg(long, value_delimiter = ',', conflicts_with_all = ["max_idle_ms", "step_ms"])]
    idle_ms: Option<Vec<u64>>,

    /// Output format: text, json, csv.
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Attach CPU clock and temperature to every record.
    #[arg(long)]
    device_stats: bool,
}

impl SweepArgs {
    /// Loads the config file if given, then applies flag overrides.
    fn resolve(self) -> anyhow::Result<HarnessConfig> {
        let mut config = match &self.config {
            Some(path) => HarnessConfig::from_file(path)?,
            None => HarnessConfig::new(self.model.clone().unwrap_or_default()),
        };

        if let Some(model) = self.model {
            config.model_path = model;
        }
        if let Some(ngl) = self.n_gpu_layers {
            config.n_gpu_layers = ngl;
        }
        if let Some(trials) = self.trials {
            config.trials_per_duration = trials;
        }
        if let Some(max) = self.max_idle_ms {
            config.idle.max_ms = max;
            config.idle.points_ms = None;
        }
        if let Some(step) = self.step_ms {
            config.idle.step_ms = step;
            config.idle.points_ms = None;
        }
        if let Some(points) = self.idle_ms {
            config.idle.points_ms = Some(points);
        }
        if let Some(format) = self.format {
            config.output_format = format;
        }
        config.device_stats |= self.device_stats;

        config.validate()?;
        Ok(config)
    }
}

pub fn execute(args: SweepArgs) -> anyhow::Result<()> {
    let config = args.resolve()?;
    let schedule = config.schedule()?;

    eprintln!("╔══════════════════════════════════════════════════════╗");
    eprintln!("║               idle-bench · Idle Sweep                ║");
    eprintln!("╚══════════════════════════════════════════════════════╝");
    eprintln!();

    // ── Setup ──────────────────────────────────────────────────
    let backend = SyntheticBackend::new(config.synthetic.clone());
    let model = backend
        .load_model(&config.model_path, &config.model_params())
        .with_context(|| format!("failed to load model '{}'", config.model_path.display()))?;
    let mut session = model
        .create_session(&config.session_params())
        .context("failed to create session")?;
    let batch = ProbeBatch::single(model.placeholder_token());

    let sweep = run_sweep(&mut session, &batch, schedule, config.trials_per_duration)?;

    eprintln!("  Backend:   {}", backend.name());
    eprintln!("  Model:     {}", model.description());
    eprintln!(
        "  Schedule:  {} durations, {} trials each (~{:.1} s idle)",
        sweep.schedule().len(),
        sweep.trials_per_duration(),
        sweep
            .schedule()
            .total_idle(sweep.trials_per_duration())
            .map_or(f64::INFINITY, |d| d.as_secs_f64()),
    );
    eprintln!();

    // ── Sweep ──────────────────────────────────────────────────

    let stdout = std::io::stdout();
    let mut writer = SummaryWriter::new(stdout.lock(), config.output_format)
        .with_device_columns(config.device_stats);

    for summary in sweep {
        let summary = summary?;
        let device = config.device_stats.then(DeviceSnapshot::capture);
        writer.write(&summary, device.as_ref())?;
    }

    tracing::info!("sweep complete: {} summaries", writer.records());
    if config.output_format == OutputFormat::Text {
        eprintln!();
        eprintln!("  Done.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(clap::Parser)]
    struct TestCli {
        #[command(flatten)]
        args: SweepArgs,
    }

    fn parse(argv: &[&str]) -> Result<SweepArgs, clap::Error> {
        TestCli::try_parse_from(std::iter::once("idle-bench").chain(argv.iter().copied()))
            .map(|c| c.args)
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["-m", "model.gguf"]).unwrap().resolve().unwrap();
        assert_eq!(config.model_path, PathBuf::from("model.gguf"));
        assert_eq!(config.n_gpu_layers, 99);
        assert_eq!(config.trials_per_duration, 10);
        assert_eq!(config.schedule().unwrap().len(), 12);
        assert_eq!(config.output_format, OutputFormat::Text);
    }

    #[test]
    fn test_overrides() {
        let config = parse(&[
            "-m", "m.gguf", "--ngl", "0", "-n", "3", "--idle-ms", "0,50,100", "--format", "csv",
            "--device-stats",
        ])
        .unwrap()
        .resolve()
        .unwrap();
        assert_eq!(config.n_gpu_layers, 0);
        assert_eq!(config.trials_per_duration, 3);
        assert_eq!(config.idle.points_ms, Some(vec![0, 50, 100]));
        assert_eq!(config.output_format, OutputFormat::Csv);
        assert!(config.device_stats);
    }

    #[test]
    fn test_short_ngl() {
        let config = parse(&["-m", "m.gguf", "-g", "0"]).unwrap().resolve().unwrap();
        assert_eq!(config.n_gpu_layers, 0);
        let config = parse(&["-m", "m.gguf", "--n-gpu-layers", "12"]).unwrap().resolve().unwrap();
        assert_eq!(config.n_gpu_layers, 12);
    }

    #[test]
    fn test_no_reset_flag_removed() {
        assert!(parse(&["-m", "m.gguf", "--no-reset"]).is_err());
    }

    #[test]
    fn test_overflowing_schedule_rejected() {
        let max = u64::MAX.to_string();
        let idle = format!("0,{max}");
        let args = parse(&["-m", "m.gguf", "--idle-ms", &idle, "-n", "2000"]).unwrap();
        assert!(args.resolve().is_err());
    }

    #[test]
    fn test_model_required() {
        assert!(parse(&["--ngl", "10"]).is_err());
    }

    #[test]
    fn test_bad_values_rejected() {
        assert!(parse(&["-m", "m.gguf", "--format", "xml"]).is_err());
        assert!(parse(&["-m", "m.gguf", "--idle-ms", "0,50", "--step-ms", "10"]).is_err());
        assert!(parse(&["-m", "m.gguf", "-n", "0"]).unwrap().resolve().is_err());
        assert!(parse(&["-m", "m.gguf", "--idle-ms", "100,50"]).unwrap().resolve().is_err());
    }

    #[test]
    fn test_config_file_with_override() {
        let path = std::env::temp_dir().join("idle_bench_cli_test.toml");
        std::fs::write(&path, "model_path = \"from_file.gguf\"\ntrials_per_duration = 4\n").unwrap();
        let path_str = path.display().to_string();

        let config = parse(&["--config", &path_str]).unwrap().resolve().unwrap();
        assert_eq!(config.model_path, PathBuf::from("from_file.gguf"));
        assert_eq!(config.trials_per_duration, 4);

        let config = parse(&["--config", &path_str, "-n", "2", "-m", "cli.gguf"])
            .unwrap()
            .resolve()
            .unwrap();
        assert_eq!(config.model_path, PathBuf::from("cli.gguf"));
        assert_eq!(config.trials_per_duration, 2);
        std::fs::remove_file(&path).ok();
    }
}
