use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::biquad::FilterSpec;
use crate::dsp::generator::GeneratorConfig;
use crate::error::{ConfigError, Result};

/// Stage order and taps.
///
/// Samples run through `stages` in order. The value leaving `mid_stage` is
/// the mid stream. With `envelope` set, the signal is rectified right before
/// the last stage and that stage's output is the envelope stream; without
/// it, the envelope stream carries the final stage output as-is.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub stages: Vec<FilterSpec>,
    pub mid_stage: usize,
    pub envelope: bool,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        let len = self.stages.len();
        if len == 0 {
            return Err(ConfigError::EmptyPipeline);
        }
        if self.mid_stage >= len {
            return Err(ConfigError::StageOutOfRange {
                index: self.mid_stage,
                len,
            });
        }
        if self.envelope && self.mid_stage + 1 >= len {
            return Err(ConfigError::EnvelopeWithoutSmoother {
                mid_stage: self.mid_stage,
            });
        }
        Ok(())
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub sample_rate_hz: f32,
    /// Samples kept per scope trace.
    pub buffer_capacity: usize,
    pub generator: GeneratorConfig,
    pub pipeline: PipelineConfig,
}

impl SimulationConfig {
    pub const SAMPLE_RATE_HZ: f32 = 2_000.0;
    pub const BUFFER_CAPACITY: usize = 1_000;

    /// High-pass 5 Hz, band-pass 5-50 Hz, rectify, low-pass 2 Hz.
    pub fn emg_envelope() -> Self {
        let sr = Self::SAMPLE_RATE_HZ;
        Self {
            sample_rate_hz: sr,
            buffer_capacity: Self::BUFFER_CAPACITY,
            generator: GeneratorConfig::default(),
            pipeline: PipelineConfig {
                stages: vec![
                    FilterSpec::high_pass(sr, 5.0),
                    FilterSpec::band_pass(sr, 5.0, 50.0),
                    FilterSpec::low_pass(sr, 2.0),
                ],
                mid_stage: 1,
                envelope: true,
            },
        }
    }

    /// The envelope chain with a 10 Hz notch after the band-pass.
    pub fn emg_notch_envelope() -> Self {
        let sr = Self::SAMPLE_RATE_HZ;
        Self {
            pipeline: PipelineConfig {
                stages: vec![
                    FilterSpec::high_pass(sr, 5.0),
                    FilterSpec::band_pass(sr, 5.0, 50.0),
                    FilterSpec::notch(sr, 10.0, 30.0),
                    FilterSpec::low_pass(sr, 2.0),
                ],
                mid_stage: 2,
                envelope: true,
            },
            ..Self::emg_envelope()
        }
    }

    /// Steady 100 Hz source with 60 Hz hum; band-pass 20-400 Hz then a 60 Hz notch.
    pub fn bandpass_notch() -> Self {
        let sr = Self::SAMPLE_RATE_HZ;
        Self {
            sample_rate_hz: sr,
            buffer_capacity: Self::BUFFER_CAPACITY,
            generator: GeneratorConfig {
                interference_freq_hz: 60.0,
                ..GeneratorConfig::steady(100.0)
            },
            pipeline: PipelineConfig {
                stages: vec![
                    FilterSpec::band_pass(sr, 20.0, 400.0),
                    FilterSpec::notch(sr, 60.0, 10.0),
                ],
                mid_stage: 1,
                envelope: false,
            },
        }
    }

    pub fn time_step(&self) -> f32 {
        1.0 / self.sample_rate_hz
    }

    /// Everything the pipeline would reject, checked up front.
    pub fn validate(&self) -> Result<()> {
        if !self.sample_rate_hz.is_finite() || self.sample_rate_hz <= 0.0 {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate_hz));
        }
        if self.buffer_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        self.generator.validate()?;
        self.pipeline.validate()?;

        for (index, stage) in self.pipeline.stages.iter().enumerate() {
            if stage.sample_rate_hz != self.sample_rate_hz {
                return Err(ConfigError::SampleRateMismatch {
                    index,
                    found: stage.sample_rate_hz,
                    expected: self.sample_rate_hz,
                });
            }
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::emg_envelope()
    }
}

/// Named chains shipped with the scope.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    #[default]
    EmgEnvelope,
    EmgNotchEnvelope,
    BandpassNotch,
}

impl Preset {
    pub const ALL: [Preset; 3] = [
        Preset::EmgEnvelope,
        Preset::EmgNotchEnvelope,
        Preset::BandpassNotch,
    ];

    pub fn config(self) -> SimulationConfig {
        match self {
            Preset::EmgEnvelope => SimulationConfig::emg_envelope(),
            Preset::EmgNotchEnvelope => SimulationConfig::emg_notch_envelope(),
            Preset::BandpassNotch => SimulationConfig::bandpass_notch(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Preset::EmgEnvelope => "emg-envelope",
            Preset::EmgNotchEnvelope => "emg-notch-envelope",
            Preset::BandpassNotch => "bandpass-notch",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Preset::ALL
            .into_iter()
            .find(|preset| preset.name() == s)
            .ok_or_else(|| ConfigError::InvalidParameter {
                name: "preset",
                reason: format!("unknown preset '{}'", s),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_validate() {
        for preset in Preset::ALL {
            assert_eq!(preset.config().validate(), Ok(()), "{}", preset);
        }
    }

    #[test]
    fn preset_names_round_trip() {
        for preset in Preset::ALL {
            assert_eq!(preset.name().parse::<Preset>(), Ok(preset));
        }
        assert!("emg".parse::<Preset>().is_err());
    }

    #[test]
    fn empty_pipeline_is_rejected() {
        let mut config = SimulationConfig::default();
        config.pipeline.stages.clear();
        assert_eq!(config.validate(), Err(ConfigError::EmptyPipeline));
    }

    #[test]
    fn mid_stage_must_exist() {
        let mut config = SimulationConfig::bandpass_notch();
        config.pipeline.mid_stage = 2;
        assert_eq!(
            config.validate(),
            Err(ConfigError::StageOutOfRange { index: 2, len: 2 })
        );
    }

    #[test]
    fn envelope_needs_a_stage_after_the_mid_tap() {
        let mut config = SimulationConfig::emg_envelope();
        config.pipeline.mid_stage = 2;
        assert_eq!(
            config.validate(),
            Err(ConfigError::EnvelopeWithoutSmoother { mid_stage: 2 })
        );
    }

    #[test]
    fn stage_rates_must_match_the_simulation() {
        let mut config = SimulationConfig::emg_envelope();
        config.pipeline.stages[1].sample_rate_hz = 48_000.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SampleRateMismatch { index: 1, .. })
        ));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let config = SimulationConfig {
            buffer_capacity: 0,
            ..SimulationConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroCapacity));
    }
}
