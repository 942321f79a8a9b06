pub mod dsp; // Biquad sections, rectifier, EMG generator
pub mod error;
pub mod pipeline; // Stage chains, scope buffers, live control

pub use error::{ConfigError, Result};
