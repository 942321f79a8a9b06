use std::f32::consts::{FRAC_PI_2, LN_2, TAU};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/*
Second-Order IIR ("Biquad") Sections
====================================

Every stage of the EMG chain is one biquad: a recursive filter that remembers
the previous two inputs and the previous two outputs, and mixes them with the
current input using six coefficients.

    y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2] - a1*y[n-1] - a2*y[n-2]

The b's shape the zeros (what gets cancelled), the a's shape the poles (what
rings). Coefficients are divided through by a0 once at design time so the
difference equation above never divides per sample.

| kind      | inputs                   | passes          | rejects       |
| --------- | ------------------------ | --------------- | ------------- |
| high-pass | freq1, q                 | above freq1     | below freq1   |
| low-pass  | freq1, q                 | below freq1     | above freq1   |
| band-pass | freq1 (low), freq2 (high)| between edges   | outside       |
| notch     | freq1 (center), q        | everything else | around freq1  |

Shared terms (RBJ cookbook):

    w     = 2*pi*f / sample_rate
    alpha = sin(w) / (2*q)

The band-pass is a constant-skirt-gain section centred on the geometric mean
of the two edges. Its alpha uses a fixed one-octave term instead of q:

    wc    = 2*pi*sqrt(f1*f2) / sample_rate
    bw    = 2*pi*(f2 - f1) / sample_rate
    alpha = sin(bw) * sinh(ln(2)/2 * pi/2)

Everything runs in f32, including the normalisation.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    HighPass,
    BandPass,
    Notch,
    LowPass,
}

impl FilterKind {
    pub fn name(self) -> &'static str {
        match self {
            FilterKind::HighPass => "high-pass",
            FilterKind::BandPass => "band-pass",
            FilterKind::Notch => "notch",
            FilterKind::LowPass => "low-pass",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "highpass" | "high-pass" | "hp" => Ok(FilterKind::HighPass),
            "bandpass" | "band-pass" | "bp" => Ok(FilterKind::BandPass),
            "notch" | "bandstop" | "band-stop" => Ok(FilterKind::Notch),
            "lowpass" | "low-pass" | "lp" => Ok(FilterKind::LowPass),
            _ => Err(ConfigError::UnknownFilterKind(s.to_string())),
        }
    }
}

/// Everything needed to design one stage.
///
/// `freq2` is only read by [`FilterKind::BandPass`] (upper edge). `q` is
/// ignored by the band-pass design.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSpec {
    pub kind: FilterKind,
    pub sample_rate_hz: f32,
    pub freq1: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub freq2: Option<f32>,
    #[cfg_attr(feature = "serde", serde(default = "FilterSpec::default_q"))]
    pub q: f32,
}

impl FilterSpec {
    pub const DEFAULT_Q: f32 = 1.0;

    #[cfg(feature = "serde")]
    fn default_q() -> f32 {
        Self::DEFAULT_Q
    }

    pub fn high_pass(sample_rate_hz: f32, cutoff_hz: f32) -> Self {
        Self {
            kind: FilterKind::HighPass,
            sample_rate_hz,
            freq1: cutoff_hz,
            freq2: None,
            q: Self::DEFAULT_Q,
        }
    }

    pub fn low_pass(sample_rate_hz: f32, cutoff_hz: f32) -> Self {
        Self {
            kind: FilterKind::LowPass,
            sample_rate_hz,
            freq1: cutoff_hz,
            freq2: None,
            q: Self::DEFAULT_Q,
        }
    }

    pub fn band_pass(sample_rate_hz: f32, low_hz: f32, high_hz: f32) -> Self {
        Self {
            kind: FilterKind::BandPass,
            sample_rate_hz,
            freq1: low_hz,
            freq2: Some(high_hz),
            q: Self::DEFAULT_Q,
        }
    }

    pub fn notch(sample_rate_hz: f32, center_hz: f32, q: f32) -> Self {
        Self {
            kind: FilterKind::Notch,
            sample_rate_hz,
            freq1: center_hz,
            freq2: None,
            q,
        }
    }

    pub fn with_q(mut self, q: f32) -> Self {
        self.q = q;
        self
    }

    /// Same spec with `freq1` replaced. Used for live cutoff changes.
    pub fn with_freq1(mut self, freq1: f32) -> Self {
        self.freq1 = freq1;
        self
    }
}

/// Normalised coefficients: `a0` is always exactly 1.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a0: f32,
    pub a1: f32,
    pub a2: f32,
}

/// Map a spec onto normalised coefficients.
///
/// Fails when the sample rate is unusable, when a frequency falls outside
/// (0, nyquist), when band-pass edges are missing or not ascending, when the
/// raw `a0` comes out zero or non-finite, or when any normalised coefficient
/// is non-finite.
pub fn design(spec: &FilterSpec) -> Result<BiquadCoefficients> {
    let sample_rate = spec.sample_rate_hz;
    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        return Err(ConfigError::InvalidSampleRate(sample_rate));
    }
    check_frequencies(spec)?;

    let (b0, b1, b2, a0, a1, a2) = match spec.kind {
        FilterKind::HighPass => {
            let omega = TAU * spec.freq1 / sample_rate;
            let alpha = omega.sin() / (2.0 * spec.q);
            let cosw = omega.cos();

            let b0 = (1.0 + cosw) / 2.0;
            (b0, -(1.0 + cosw), b0, 1.0 + alpha, -2.0 * cosw, 1.0 - alpha)
        }
        FilterKind::LowPass => {
            let omega = TAU * spec.freq1 / sample_rate;
            let alpha = omega.sin() / (2.0 * spec.q);
            let cosw = omega.cos();

            let b0 = (1.0 - cosw) / 2.0;
            (b0, 1.0 - cosw, b0, 1.0 + alpha, -2.0 * cosw, 1.0 - alpha)
        }
        FilterKind::BandPass => {
            let freq2 = spec
                .freq2
                .ok_or(ConfigError::MissingUpperFrequency(spec.kind))?;
            let wc = TAU * (spec.freq1 * freq2).sqrt() / sample_rate;
            let bw = TAU * (freq2 - spec.freq1) / sample_rate;
            let alpha = bw.sin() * (LN_2 / 2.0 * FRAC_PI_2).sinh();
            let cosw = wc.cos();

            (alpha, 0.0, -alpha, 1.0 + alpha, -2.0 * cosw, 1.0 - alpha)
        }
        FilterKind::Notch => {
            let omega = TAU * spec.freq1 / sample_rate;
            let alpha = omega.sin() / (2.0 * spec.q);
            let cosw = omega.cos();

            (1.0, -2.0 * cosw, 1.0, 1.0 + alpha, -2.0 * cosw, 1.0 - alpha)
        }
    };

    if a0 == 0.0 || !a0.is_finite() {
        return Err(ConfigError::DegenerateCoefficients {
            kind: spec.kind,
            freq1: spec.freq1,
            a0,
        });
    }

    let coeffs = BiquadCoefficients {
        b0: b0 / a0,
        b1: b1 / a0,
        b2: b2 / a0,
        a0: 1.0,
        a1: a1 / a0,
        a2: a2 / a0,
    };

    let finite = [coeffs.b0, coeffs.b1, coeffs.b2, coeffs.a1, coeffs.a2]
        .iter()
        .all(|c| c.is_finite());
    if !finite {
        return Err(ConfigError::NonFiniteCoefficients {
            kind: spec.kind,
            freq1: spec.freq1,
        });
    }

    Ok(coeffs)
}

/// Every edge must sit strictly inside (0, nyquist); band-pass edges must ascend.
fn check_frequencies(spec: &FilterSpec) -> Result<()> {
    let nyquist = spec.sample_rate_hz / 2.0;
    let in_band = |freq: f32| freq.is_finite() && freq > 0.0 && freq < nyquist;
    let out_of_band = |freq: f32| ConfigError::InvalidFrequency {
        kind: spec.kind,
        reason: format!("{} Hz is outside (0, {}) Hz", freq, nyquist),
    };

    if !in_band(spec.freq1) {
        return Err(out_of_band(spec.freq1));
    }

    if spec.kind == FilterKind::BandPass {
        let freq2 = spec
            .freq2
            .ok_or(ConfigError::MissingUpperFrequency(spec.kind))?;
        if !in_band(freq2) {
            return Err(out_of_band(freq2));
        }
        if freq2 <= spec.freq1 {
            return Err(ConfigError::InvalidFrequency {
                kind: spec.kind,
                reason: format!(
                    "upper edge {} Hz is not above lower edge {} Hz",
                    freq2, spec.freq1
                ),
            });
        }
    }

    Ok(())
}

/// One biquad stage: designed coefficients plus a direct-form I delay line.
#[derive(Debug, Clone)]
pub struct BiquadFilter {
    spec: FilterSpec,
    coeffs: BiquadCoefficients,

    x1: f32, // previous input
    x2: f32, // input before that
    y1: f32, // previous output
    y2: f32, // output before that
}

impl BiquadFilter {
    pub fn new(spec: FilterSpec) -> Result<Self> {
        let coeffs = design(&spec)?;

        Ok(Self {
            spec,
            coeffs,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        })
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let c = &self.coeffs;
        let output =
            c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    /// Filter a block in place.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Swap in a new design and clear the delay line.
    ///
    /// The new coefficients are designed before anything is touched, so a
    /// failed reconfigure leaves the filter exactly as it was.
    pub fn reconfigure(&mut self, spec: FilterSpec) -> Result<()> {
        let coeffs = design(&spec)?;
        self.spec = spec;
        self.coeffs = coeffs;
        self.reset();
        Ok(())
    }

    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }

    pub fn spec(&self) -> &FilterSpec {
        &self.spec
    }

    pub fn coefficients(&self) -> &BiquadCoefficients {
        &self.coeffs
    }
}
