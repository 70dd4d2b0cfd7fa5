// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for the statistics aggregator and a virtual-clock sweep.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use idle_harness::{run_sweep, summarize, IdleSchedule, SampleAccumulator};
use probe_engine::synthetic::{LatencyProfile, SyntheticBackend};
use probe_engine::{Backend, Model, ModelParams, ProbeBatch, SessionParams, VirtualClock};
use std::time::Duration;

fn samples(n: usize) -> Vec<Duration> {
    (0..n)
        .map(|i| Duration::from_micros(6_000 + (i as u64 * 7_919) % 1_000))
        .collect()
}

fn bench_summarize(c: &mut Criterion) {
    let mut group = c.benchmark_group("summarize");
    for n in [10, 1_000, 100_000] {
        let data = samples(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &data, |b, data| {
            b.iter(|| summarize(black_box(data)))
        });
    }
    group.finish();
}

fn bench_accumulator_push(c: &mut Criterion) {
    let data = samples(1_000);
    c.bench_function("accumulator_push_1000", |b| {
        b.iter(|| {
            let mut acc = SampleAccumulator::new();
            for &s in &data {
                acc.push(black_box(s));
            }
            acc.finish()
        })
    });
}

fn bench_virtual_sweep(c: &mut Criterion) {
    let path = std::env::temp_dir().join("idle_harness_bench.gguf");
    if std::fs::write(&path, b"GGUF").is_err() {
        return;
    }
    let clock = VirtualClock::new();
    let Ok(model) = SyntheticBackend::new(LatencyProfile::default())
        .with_virtual_clock(clock.clone())
        .load_model(&path, &ModelParams::default())
    else {
        return;
    };
    let batch = ProbeBatch::single(model.placeholder_token());

    c.bench_function("virtual_sweep_12x10", |b| {
        b.iter(|| {
            let Ok(mut session) = model.create_session(&SessionParams::default()) else {
                return 0;
            };
            let Ok(sweep) = run_sweep(&mut session, &batch, IdleSchedule::default(), 10) else {
                return 0;
            };
            sweep.with_sleeper(clock.clone()).filter_map(Result::ok).count()
        })
    });
    std::fs::remove_file(&path).ok();
}

criterion_group!(
    benches,
    bench_summarize,
    bench_accumulator_push,
    bench_virtual_sweep
);
criterion_main!(benches);
