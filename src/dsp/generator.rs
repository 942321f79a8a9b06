use std::f32::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/*
Synthetic EMG
=============

Surface EMG looks like band-limited noise whose loudness follows muscle
effort. The generator fakes that with two detuned sinusoids whose amplitude
and frequency wobble every sample, plus the two contaminants a real recording
picks up:

  components      amp1*sin(phase1) + amp2*sin(phase2)
                  phase2 runs at `secondary_ratio` times the base frequency.
                  Each sample draws fresh amplitude/frequency jitter.

  bursts          Every `interval` samples a coin is flipped. On success the
                  components are scaled by a random factor for
                  `duration_samples` samples (a "contraction"). When no burst
                  is running the factor falls back to 1.

  interference    A clean sinusoid driven by the caller's clock `t`
                  (mains hum, motion artefact).

  noise           Uniform white noise in [-noise_amplitude, noise_amplitude].

Phases are accumulated per sample and wrapped to [0, 2*pi) so long runs keep
their f32 precision.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstConfig {
    /// Samples between burst coin flips.
    pub interval: u64,
    /// Chance that a coin flip starts a burst.
    pub probability: f32,
    /// Range the burst gain is drawn from.
    pub scale: (f32, f32),
    pub duration_samples: u32,
}

impl BurstConfig {
    /// Never bursts. The gain stays at 1.
    pub fn disabled() -> Self {
        Self {
            probability: 0.0,
            ..Self::default()
        }
    }
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            interval: 50,
            probability: 0.2,
            scale: (1.0, 3.0),
            duration_samples: 100,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorConfig {
    pub base_freq_hz: f32,
    pub primary_amplitude: f32,
    pub secondary_amplitude: f32,
    pub secondary_ratio: f32,
    /// Per-sample amplitude multiplier range.
    pub amplitude_jitter: (f32, f32),
    /// Per-sample frequency multiplier range.
    pub frequency_jitter: (f32, f32),
    pub noise_amplitude: f32,
    pub interference_freq_hz: f32,
    pub interference_amplitude: f32,
    pub burst: BurstConfig,
}

impl GeneratorConfig {
    /// Two steady sinusoids: no jitter and no bursts.
    pub fn steady(base_freq_hz: f32) -> Self {
        Self {
            base_freq_hz,
            amplitude_jitter: (1.0, 1.0),
            frequency_jitter: (1.0, 1.0),
            burst: BurstConfig::disabled(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_range("amplitude_jitter", self.amplitude_jitter)?;
        check_range("frequency_jitter", self.frequency_jitter)?;
        check_range("burst.scale", self.burst.scale)?;

        if !self.noise_amplitude.is_finite() || self.noise_amplitude < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "noise_amplitude",
                reason: format!("{} is not a finite, non-negative amplitude", self.noise_amplitude),
            });
        }
        if self.burst.interval == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "burst.interval",
                reason: "must be at least one sample".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.burst.probability) {
            return Err(ConfigError::InvalidParameter {
                name: "burst.probability",
                reason: format!("{} is outside [0, 1]", self.burst.probability),
            });
        }

        Ok(())
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_freq_hz: 20.0,
            primary_amplitude: 0.5,
            secondary_amplitude: 0.3,
            secondary_ratio: 1.5,
            amplitude_jitter: (0.8, 1.2),
            frequency_jitter: (0.9, 1.1),
            noise_amplitude: 0.2,
            interference_freq_hz: 10.0,
            interference_amplitude: 0.3,
            burst: BurstConfig::default(),
        }
    }
}

fn check_range(name: &'static str, (min, max): (f32, f32)) -> Result<()> {
    if min.is_finite() && max.is_finite() && min <= max {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            reason: format!("({}, {}) is not an ordered finite range", min, max),
        })
    }
}

/// Running state, advanced once per generated sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorState {
    /// Radians, wrapped to [0, 2*pi).
    pub phase1: f32,
    pub phase2: f32,
    pub burst_factor: f32,
    pub burst_remaining: u32,
    pub sample_counter: u64,
}

impl Default for GeneratorState {
    fn default() -> Self {
        Self {
            phase1: 0.0,
            phase2: 0.0,
            burst_factor: 1.0,
            burst_remaining: 0,
            sample_counter: 0,
        }
    }
}

pub struct SignalGenerator<R = StdRng> {
    config: GeneratorConfig,
    time_step: f32,
    state: GeneratorState,
    rng: R,
    nonfinite_count: u64,
}

impl SignalGenerator<StdRng> {
    /// Generator with a reproducible random stream.
    pub fn seeded(config: GeneratorConfig, sample_rate_hz: f32, seed: u64) -> Result<Self> {
        Self::new(config, sample_rate_hz, StdRng::seed_from_u64(seed))
    }

    /// Generator seeded from the operating system's entropy source.
    pub fn from_entropy(config: GeneratorConfig, sample_rate_hz: f32) -> Result<Self> {
        Self::new(config, sample_rate_hz, StdRng::from_os_rng())
    }
}

impl<R: Rng> SignalGenerator<R> {
    pub fn new(config: GeneratorConfig, sample_rate_hz: f32, rng: R) -> Result<Self> {
        if !sample_rate_hz.is_finite() || sample_rate_hz <= 0.0 {
            return Err(ConfigError::InvalidSampleRate(sample_rate_hz));
        }
        config.validate()?;

        Ok(Self {
            config,
            time_step: 1.0 / sample_rate_hz,
            state: GeneratorState::default(),
            rng,
            nonfinite_count: 0,
        })
    }

    /// Produce one sample. `t` is the host clock in seconds and only drives
    /// the interference term.
    pub fn next(&mut self, t: f32) -> f32 {
        let Self {
            config,
            time_step,
            state,
            rng,
            ..
        } = self;
        let burst = &config.burst;

        if state.sample_counter % burst.interval == 0 {
            if rng.random::<f32>() < burst.probability {
                state.burst_factor = rng.random_range(burst.scale.0..=burst.scale.1);
                state.burst_remaining = burst.duration_samples;
            } else if state.burst_remaining == 0 {
                state.burst_factor = 1.0;
            }
        }
        if state.burst_remaining > 0 {
            state.burst_remaining -= 1;
        }
        state.sample_counter = state.sample_counter.wrapping_add(1);

        let (amp_lo, amp_hi) = config.amplitude_jitter;
        let (freq_lo, freq_hi) = config.frequency_jitter;
        let amp1 = config.primary_amplitude * rng.random_range(amp_lo..=amp_hi);
        let amp2 = config.secondary_amplitude * rng.random_range(amp_lo..=amp_hi);
        let freq1 = config.base_freq_hz * rng.random_range(freq_lo..=freq_hi);
        let freq2 = config.base_freq_hz * config.secondary_ratio * rng.random_range(freq_lo..=freq_hi);

        state.phase1 = (state.phase1 + TAU * freq1 * *time_step).rem_euclid(TAU);
        state.phase2 = (state.phase2 + TAU * freq2 * *time_step).rem_euclid(TAU);

        let noise = config.noise_amplitude;
        let value = state.burst_factor * (amp1 * state.phase1.sin() + amp2 * state.phase2.sin())
            + config.interference_amplitude * (TAU * config.interference_freq_hz * t).sin()
            + rng.random_range(-noise..=noise);

        self.sanitize(value)
    }

    fn sanitize(&mut self, value: f32) -> f32 {
        if value.is_finite() {
            return value;
        }

        if self.nonfinite_count == 0 {
            log::warn!(
                "generator produced {} at sample {}; substituting 0.0",
                value,
                self.state.sample_counter
            );
        }
        self.nonfinite_count += 1;
        0.0
    }

    /// Back to the initial phase/burst state. The random stream is not rewound.
    pub fn reset(&mut self) {
        self.state = GeneratorState::default();
    }

    pub fn state(&self) -> &GeneratorState {
        &self.state
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn time_step(&self) -> f32 {
        self.time_step
    }

    /// How many samples were replaced by 0.0 so far.
    pub fn nonfinite_count(&self) -> u64 {
        self.nonfinite_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 2_000.0;

    fn run(generator: &mut SignalGenerator, len: usize) -> Vec<f32> {
        let dt = generator.time_step();
        (0..len).map(|n| generator.next(n as f32 * dt)).collect()
    }

    #[test]
    fn same_seed_same_sequence() {
        let config = GeneratorConfig::default();
        let mut a = SignalGenerator::seeded(config, SAMPLE_RATE, 42).unwrap();
        let mut b = SignalGenerator::seeded(config, SAMPLE_RATE, 42).unwrap();

        let left = run(&mut a, 3_000);
        let right = run(&mut b, 3_000);
        assert_eq!(left, right);
        assert_eq!(a.state(), b.state());
    }

    #[test]
    fn different_seeds_diverge() {
        let config = GeneratorConfig::default();
        let mut a = SignalGenerator::seeded(config, SAMPLE_RATE, 1).unwrap();
        let mut b = SignalGenerator::seeded(config, SAMPLE_RATE, 2).unwrap();

        assert_ne!(run(&mut a, 100), run(&mut b, 100));
    }

    #[test]
    fn bursts_start_only_on_interval_boundaries() {
        let config = GeneratorConfig {
            burst: BurstConfig {
                probability: 0.5,
                ..BurstConfig::default()
            },
            ..GeneratorConfig::default()
        };
        let duration = config.burst.duration_samples;
        let mut generator = SignalGenerator::seeded(config, SAMPLE_RATE, 7).unwrap();

        let mut previous = generator.state().burst_remaining;
        let mut activations = 0;
        for call in 0..5_000u64 {
            generator.next(0.0);
            let remaining = generator.state().burst_remaining;

            // anything other than a one-step countdown is a fresh burst
            if remaining != previous.saturating_sub(1) {
                assert_eq!(call % 50, 0, "burst started off-boundary at call {}", call);
                assert_eq!(remaining, duration - 1);
                activations += 1;
            }
            previous = remaining;
        }

        assert!(activations > 0);
        assert!(activations <= 5_000 / 50);
    }

    #[test]
    fn burst_counter_runs_down_to_zero() {
        let config = GeneratorConfig {
            burst: BurstConfig {
                probability: 1.0,
                interval: 500,
                duration_samples: 100,
                ..BurstConfig::default()
            },
            ..GeneratorConfig::default()
        };
        let mut generator = SignalGenerator::seeded(config, SAMPLE_RATE, 3).unwrap();

        generator.next(0.0);
        let factor = generator.state().burst_factor;
        assert!((1.0..=3.0).contains(&factor));
        assert_eq!(generator.state().burst_remaining, 99);

        for expected in (0..99).rev() {
            generator.next(0.0);
            assert_eq!(generator.state().burst_remaining, expected);
        }
        for _ in 0..50 {
            generator.next(0.0);
            assert_eq!(generator.state().burst_remaining, 0);
        }
    }

    #[test]
    fn burst_factor_falls_back_to_one_when_idle() {
        let config = GeneratorConfig {
            burst: BurstConfig::disabled(),
            ..GeneratorConfig::default()
        };
        let mut generator = SignalGenerator::seeded(config, SAMPLE_RATE, 9).unwrap();
        generator.state.burst_factor = 2.5;

        generator.next(0.0);
        assert_eq!(generator.state().burst_factor, 1.0);
    }

    #[test]
    fn nonfinite_output_becomes_zero() {
        let config = GeneratorConfig {
            interference_amplitude: f32::INFINITY,
            ..GeneratorConfig::default()
        };
        let mut generator = SignalGenerator::seeded(config, SAMPLE_RATE, 11).unwrap();

        for value in run(&mut generator, 200) {
            assert_eq!(value, 0.0);
        }
        assert_eq!(generator.nonfinite_count(), 200);
    }

    #[test]
    fn phases_stay_wrapped() {
        let mut generator =
            SignalGenerator::seeded(GeneratorConfig::default(), SAMPLE_RATE, 5).unwrap();
        for _ in 0..20_000 {
            generator.next(0.0);
            let state = generator.state();
            assert!((0.0..TAU).contains(&state.phase1), "phase1 {}", state.phase1);
            assert!((0.0..TAU).contains(&state.phase2), "phase2 {}", state.phase2);
        }
    }

    #[test]
    fn steady_config_matches_closed_form() {
        let config = GeneratorConfig {
            noise_amplitude: 0.0,
            interference_amplitude: 0.0,
            ..GeneratorConfig::steady(100.0)
        };
        let mut generator = SignalGenerator::seeded(config, SAMPLE_RATE, 0).unwrap();
        let dt = 1.0 / SAMPLE_RATE as f64;

        for n in 0..2_000 {
            let actual = generator.next(0.0) as f64;
            let t = (n + 1) as f64 * dt;
            let expected = 0.5 * (std::f64::consts::TAU * 100.0 * t).sin()
                + 0.3 * (std::f64::consts::TAU * 150.0 * t).sin();
            assert!(
                (actual - expected).abs() < 5e-3,
                "sample {}: expected {}, got {}",
                n,
                expected,
                actual
            );
        }
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut generator =
            SignalGenerator::seeded(GeneratorConfig::default(), SAMPLE_RATE, 8).unwrap();
        run(&mut generator, 123);
        generator.reset();
        assert_eq!(generator.state(), &GeneratorState::default());
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let reversed = GeneratorConfig {
            amplitude_jitter: (1.2, 0.8),
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            SignalGenerator::seeded(reversed, SAMPLE_RATE, 0),
            Err(ConfigError::InvalidParameter { name: "amplitude_jitter", .. })
        ));

        let negative_noise = GeneratorConfig {
            noise_amplitude: -0.1,
            ..GeneratorConfig::default()
        };
        assert!(negative_noise.validate().is_err());

        let no_interval = GeneratorConfig {
            burst: BurstConfig {
                interval: 0,
                ..BurstConfig::default()
            },
            ..GeneratorConfig::default()
        };
        assert!(no_interval.validate().is_err());

        let bad_probability = GeneratorConfig {
            burst: BurstConfig {
                probability: f32::NAN,
                ..BurstConfig::default()
            },
            ..GeneratorConfig::default()
        };
        assert!(bad_probability.validate().is_err());

        assert!(matches!(
            SignalGenerator::seeded(GeneratorConfig::default(), 0.0, 0),
            Err(ConfigError::InvalidSampleRate(_))
        ));
    }
}
