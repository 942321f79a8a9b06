//! Benchmarks for the filter and signal primitives.

mod biquad;
mod generator;

pub use biquad::bench_biquad;
pub use generator::bench_generator;
