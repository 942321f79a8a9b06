//! Spectrum widget for the filtered trace
//!
//! Hann-windowed FFT over the whole trace, sampled at log-spaced frequencies
//! so the low EMG band gets as much room as the top octave.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Number of points drawn
const SPECTRUM_POINTS: usize = 48;
/// Lowest frequency drawn; the envelope band sits at a few Hz
const MIN_FREQ_HZ: f32 = 1.0;
/// Floor for silent bins
const FLOOR_DB: f64 = -120.0;

pub struct SpectrumAnalyzer {
    window: Vec<f32>,
    /// FFT bin for each drawn point
    bin_indices: Vec<usize>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    /// (log10 frequency, magnitude dB)
    spectrum: Vec<(f64, f64)>,
}

impl SpectrumAnalyzer {
    /// `trace_len` must match the length later passed to [`update`](Self::update).
    pub fn new(trace_len: usize, sample_rate: f32) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(trace_len);

        let window: Vec<f32> = (0..trace_len)
            .map(|i| {
                if trace_len > 1 {
                    let denom = (trace_len - 1) as f32;
                    0.5 * (1.0 - (std::f32::consts::TAU * i as f32 / denom).cos())
                } else {
                    1.0
                }
            })
            .collect();

        let nyquist = (sample_rate / 2.0).max(MIN_FREQ_HZ);
        let ratio = (nyquist / MIN_FREQ_HZ) as f64;
        let half = (trace_len / 2).max(1);

        let mut bin_indices = Vec::with_capacity(SPECTRUM_POINTS);
        let mut spectrum = Vec::with_capacity(SPECTRUM_POINTS);
        for i in 0..SPECTRUM_POINTS {
            let t = i as f64 / (SPECTRUM_POINTS - 1) as f64;
            let freq = MIN_FREQ_HZ as f64 * ratio.powf(t);
            let index = (freq * trace_len as f64 / sample_rate as f64).round() as usize;

            bin_indices.push(index.min(half - 1));
            spectrum.push((freq.log10(), FLOOR_DB));
        }

        Self {
            window,
            bin_indices,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); trace_len],
            spectrum,
        }
    }

    /// Recompute from a time-ordered trace. Mismatched lengths are ignored.
    pub fn update(&mut self, trace: &[f32]) {
        if trace.len() != self.window.len() {
            return;
        }

        for ((slot, &sample), &w) in self.scratch.iter_mut().zip(trace).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        for (point, &index) in self.spectrum.iter_mut().zip(&self.bin_indices) {
            let bin = self.scratch[index];
            let power = (bin.re * bin.re + bin.im * bin.im).max(1e-12);
            point.1 = 10.0 * (power as f64).log10();
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.spectrum
    }
}

/// Render the spectrum chart (x axis is log10 Hz)
pub fn render_spectrum(frame: &mut Frame, area: Rect, spectrum: &[(f64, f64)]) {
    let block = Block::default()
        .title(" Filtered spectrum ")
        .borders(Borders::ALL);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(spectrum);

    let min_x = spectrum.first().map(|(x, _)| *x).unwrap_or(0.0);
    let max_x = spectrum.last().map(|(x, _)| *x).unwrap_or(1.0).max(min_x + 1.0);
    let max_db = spectrum.iter().map(|(_, db)| *db).fold(-100.0, f64::max);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([min_x, max_x])
                .labels(vec![
                    format!("{:.0}", 10f64.powf(min_x)),
                    format!("{:.0} Hz", 10f64.powf(max_x)),
                ])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-100.0, max_db.max(0.0) + 10.0])
                .labels(vec!["-100", "-60", "-20", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
