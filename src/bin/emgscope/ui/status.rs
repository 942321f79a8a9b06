//! Status bar widget - preset, run state, filter chain, and sample count

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use emg_dsp::dsp::{FilterKind, FilterSpec};

use super::UiInit;

/// Short label for one stage, e.g. "HP 5.0 Hz"
fn stage_label(spec: &FilterSpec) -> String {
    match spec.kind {
        FilterKind::HighPass => format!("HP {:.1} Hz", spec.freq1),
        FilterKind::LowPass => format!("LP {:.1} Hz", spec.freq1),
        FilterKind::BandPass => format!(
            "BP {:.0}-{:.0} Hz",
            spec.freq1,
            spec.freq2.unwrap_or(spec.freq1)
        ),
        FilterKind::Notch => format!("Notch {:.0} Hz Q{:.0}", spec.freq1, spec.q),
    }
}

/// The chain as drawn in the status bar: stages joined by arrows, the mid tap
/// marked, and the rectifier shown ahead of the smoother.
fn chain_label(init: &UiInit) -> String {
    let last = init.stage_specs.len().saturating_sub(1);
    let mut parts = Vec::with_capacity(init.stage_specs.len() + 1);

    for (index, spec) in init.stage_specs.iter().enumerate() {
        if init.envelope && index == last {
            parts.push("|x|".to_string());
        }
        let mut label = stage_label(spec);
        if index == init.mid_stage {
            label.push_str(" [mid]");
        }
        parts.push(label);
    }

    parts.join(" → ")
}

/// Render the status bar
pub fn render_status(frame: &mut Frame, area: Rect, init: &UiInit, paused: bool, samples: u64) {
    let block = Block::default()
        .title(format!(" emgscope: {} ", init.preset))
        .borders(Borders::ALL);

    let run_symbol = if paused { "⏸" } else { "▶" };
    let run_state = if paused { "Paused" } else { "Running" };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} {}  ", run_symbol, run_state),
            Style::default().fg(if paused { Color::Yellow } else { Color::Green }),
        ),
        Span::styled(
            format!("{:.1}kHz  ", init.sample_rate / 1000.0),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(chain_label(init), Style::default().fg(Color::Cyan)),
        Span::raw("  "),
        Span::styled(
            format!("{} samples", samples),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}
