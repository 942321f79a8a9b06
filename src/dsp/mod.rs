//! Sample-level DSP primitives used by the processing pipeline.
//!
//! Everything here is allocation-free per sample. Orchestration (stage order,
//! taps, scope buffers) lives in [`crate::pipeline`].

/// Biquad coefficient design and the second-order filter section.
pub mod biquad;
/// Synthetic EMG-like signal source.
pub mod generator;

pub use biquad::{design, BiquadCoefficients, BiquadFilter, FilterKind, FilterSpec};
pub use generator::{BurstConfig, GeneratorConfig, GeneratorState, SignalGenerator};

/// Full-wave rectifier used ahead of the envelope smoother.
#[inline]
pub fn rectify(sample: f32) -> f32 {
    sample.abs()
}
