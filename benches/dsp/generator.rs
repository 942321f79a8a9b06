//! Benchmarks for the synthetic EMG generator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use emg_dsp::dsp::{GeneratorConfig, SignalGenerator};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 2_000.0;

pub fn bench_generator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/generator");
    let dt = 1.0 / SAMPLE_RATE;

    let configs = [
        ("bursting", GeneratorConfig::default()),
        ("steady", GeneratorConfig::steady(100.0)),
    ];

    for &size in BLOCK_SIZES {
        for (name, config) in configs {
            let Ok(mut generator) = SignalGenerator::seeded(config, SAMPLE_RATE, 7) else {
                continue;
            };
            let mut buffer = vec![0.0f32; size];
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    for (n, slot) in buffer.iter_mut().enumerate() {
                        *slot = generator.next(black_box(n as f32 * dt));
                    }
                    black_box(&buffer);
                })
            });
        }
    }

    group.finish();
}
