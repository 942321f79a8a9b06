use thiserror::Error;

use crate::dsp::biquad::FilterKind;

/// Construction-time failures. Nothing in the per-sample path returns these.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("unknown filter kind: {0}")]
    UnknownFilterKind(String),

    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(f32),

    #[error("{0} filter needs an upper band edge")]
    MissingUpperFrequency(FilterKind),

    #[error("{kind} filter at {freq1} Hz has a degenerate a0 = {a0}")]
    DegenerateCoefficients { kind: FilterKind, freq1: f32, a0: f32 },

    #[error("{kind} filter has an unusable frequency: {reason}")]
    InvalidFrequency { kind: FilterKind, reason: String },

    #[error("{kind} filter at {freq1} Hz produced non-finite coefficients")]
    NonFiniteCoefficients { kind: FilterKind, freq1: f32 },

    #[error("pipeline has no stages")]
    EmptyPipeline,

    #[error("stage index {index} out of range for {len} stages")]
    StageOutOfRange { index: usize, len: usize },

    #[error("envelope output needs a smoothing stage after mid stage {mid_stage}")]
    EnvelopeWithoutSmoother { mid_stage: usize },

    #[error("scope capacity must be non-zero")]
    ZeroCapacity,

    #[error("stage {index} runs at {found} Hz but the simulation runs at {expected} Hz")]
    SampleRateMismatch {
        index: usize,
        found: f32,
        expected: f32,
    },

    #[error("invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
