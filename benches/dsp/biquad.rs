//! Benchmarks for the biquad stage, one group entry per response.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use emg_dsp::dsp::{design, BiquadFilter, FilterSpec};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 2_000.0;

pub fn bench_biquad(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/biquad");

    let specs = [
        ("highpass", FilterSpec::high_pass(SAMPLE_RATE, 5.0)),
        ("bandpass", FilterSpec::band_pass(SAMPLE_RATE, 5.0, 50.0)),
        ("notch", FilterSpec::notch(SAMPLE_RATE, 60.0, 30.0)),
        ("lowpass", FilterSpec::low_pass(SAMPLE_RATE, 2.0)),
    ];

    for &size in BLOCK_SIZES {
        // 20 Hz tone with a DC offset, roughly what reaches the first stage
        let input: Vec<f32> = (0..size)
            .map(|i| 0.2 + (std::f32::consts::TAU * 20.0 * i as f32 / SAMPLE_RATE).sin())
            .collect();

        for (name, spec) in specs {
            let Ok(mut filter) = BiquadFilter::new(spec) else {
                continue;
            };
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    filter.render(black_box(&mut buffer));
                })
            });
        }
    }

    // Redesign cost, paid on every cutoff nudge from the host
    let spec = FilterSpec::band_pass(SAMPLE_RATE, 20.0, 400.0);
    group.bench_function("design", |b| b.iter(|| design(black_box(&spec))));

    group.finish();
}
