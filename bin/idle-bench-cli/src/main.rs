// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # idle-bench
//!
//! Measures decode latency after periods of device idleness.
//!
//! ## Usage
//! ```bash
//! # Default sweep: 0..=2200 ms idle in 200 ms steps, 10 trials each
//! idle-bench sweep -m ./models/tiny.gguf
//!
//! # Custom durations, JSON lines with device state
//! idle-bench sweep -m ./models/tiny.gguf --idle-ms 0,100,500,2000 --format json --device-stats
//!
//! # Host CPU clock and temperature
//! idle-bench status
//! ```

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "idle-bench",
    about = "Measure how decode latency degrades after device idleness",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an idle/probe sweep and print one summary per idle duration.
    Sweep(commands::sweep::SweepArgs),

    /// Display host CPU clock and thermal state.
    Status,

    /// Print a complete configuration file with default values.
    Config {
        /// Model path to put in the generated file.
        #[arg(short, long, default_value = "./models/model.gguf")]
        model: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);

    match cli.command {
        Commands::Sweep(args) => commands::sweep::execute(args),
        Commands::Status => commands::status::execute(),
        Commands::Config { model } => commands::config::execute(model),
    }
}
