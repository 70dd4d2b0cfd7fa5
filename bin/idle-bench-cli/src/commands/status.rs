// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `idle-bench status` command: display host clock and thermal state.
//!
//! Reads cpufreq and thermal zone data from sysfs. Where a reading is not
//! exposed (containers, non-Linux hosts) the command still works and says so.

pub fn execute() -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              idle-bench · Device Status              ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let snapshot = device_monitor::snapshot();

    // ── CPU ────────────────────────────────────────────────────
    let cpu = &snapshot.cpu;
    println!("  CPU");
    println!("   Online cores: {}", cpu.online_cores);
    if cpu.max_frequency_mhz == 0 {
        println!("   Frequency:    not exposed");
    } else {
        println!(
            "   Frequency:    {} MHz  (range {}-{} MHz)",
            cpu.frequency_mhz, cpu.min_frequency_mhz, cpu.max_frequency_mhz,
        );
        println!(
            "   Clock ratio:  {:.0}%  {}",
            cpu.frequency_ratio() * 100.0,
            ratio_bar(cpu.frequency_ratio()),
        );
    }
    println!("   Governor:     {}", cpu.governor.as_deref().unwrap_or("unknown"));
    println!();

    // ── Thermal ────────────────────────────────────────────────
    println!("  Thermal");
    match &snapshot.thermal {
        Some(t) => {
            println!("   Temperature:  {:.1} C", t.temp_celsius);
            if t.is_hot() {
                println!("   WARNING: package is hot, expect thermal throttling");
            }
        }
        None => println!("   Temperature:  not exposed"),
    }
    println!();

    // ── Assessment ─────────────────────────────────────────────
    println!("  Assessment");
    if snapshot.is_throttled() {
        println!("   Status:       THROTTLED");
        println!("   Note:         idle sweeps will mix clock ramp-up into decode latency");
    } else {
        println!("   Status:       Full clock");
    }
    println!();
    println!("{}", snapshot.summary());

    tracing::debug!(?snapshot, "device snapshot");
    Ok(())
}

/// Visual bar for a 0.0-1.0 clock ratio.
fn ratio_bar(ratio: f32) -> String {
    let filled = ((ratio * 20.0).round() as usize).min(20);
    let symbol = if ratio >= 0.9 {
        "#"
    } else if ratio >= 0.5 {
        "="
    } else {
        "-"
    };
    format!("[{}{}]", symbol.repeat(filled), ".".repeat(20 - filled))
}
