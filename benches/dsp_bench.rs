//! Benchmarks for the EMG filter chain.
//!
//! Run with: cargo bench
//!
//! At the default 2 kHz sample rate every sample has a 500us budget, so
//! these mostly guard against regressions rather than deadlines.
//!
//! Reference timing at 2kHz sample rate:
//!   - 32 samples   = 16ms (one acquisition step)
//!   - 100 samples  = 50ms (one headless report)
//!   - 1000 samples = 500ms (one scope buffer)
//!
//! Benchmark groups:
//!   - dsp/*        Biquad stages and the signal generator
//!   - scenarios/*  Full presets, generator through scope buffers

use criterion::{criterion_group, criterion_main};

mod dsp;
mod scenarios;

/// Block sizes matching the host's step, report interval, and trace length.
pub const BLOCK_SIZES: &[usize] = &[32, 100, 1000];

criterion_group!(
    benches,
    dsp::bench_biquad,
    dsp::bench_generator,
    scenarios::bench_pipeline,
);
criterion_main!(benches);
