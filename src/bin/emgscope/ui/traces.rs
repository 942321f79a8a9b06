//! Scrolling trace widget

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

use emg_dsp::pipeline::{ScopeBuffers, Trace};

/// Fraction of the half-height a normalised trace may use.
const DISPLAY_RANGE: f32 = 0.9;

/// Scale a sample by the trace's peak. A silent trace passes through as-is.
fn normalize_for_display(value: f32, max_amplitude: f32) -> f32 {
    if max_amplitude == 0.0 {
        return value;
    }
    value / max_amplitude * DISPLAY_RANGE
}

/// Render one trace oldest-to-newest, scaled to its own peak
pub fn render_trace(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    color: Color,
    scope: &ScopeBuffers,
    trace: Trace,
) {
    let block = Block::default().title(title).borders(Borders::ALL);

    let max_amplitude = scope
        .trace(trace)
        .iter()
        .fold(0.0f32, |acc, &x| acc.max(x.abs()));
    let len = scope.capacity().max(2);

    let data: Vec<(f64, f64)> = scope
        .ordered(trace)
        .enumerate()
        .map(|(i, sample)| {
            let x = i as f64 / (len - 1) as f64;
            let y = normalize_for_display(sample, max_amplitude) as f64;
            (x, y)
        })
        .collect();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-1.0, 1.0])
                .labels(vec![format!("-{:.2}", max_amplitude), format!("{:.2}", max_amplitude)])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_trace_passes_through() {
        assert_eq!(normalize_for_display(0.0, 0.0), 0.0);
        assert_eq!(normalize_for_display(0.25, 0.0), 0.25);
    }

    #[test]
    fn peak_maps_to_display_range() {
        assert_eq!(normalize_for_display(2.0, 2.0), DISPLAY_RANGE);
        assert_eq!(normalize_for_display(-1.0, 2.0), -DISPLAY_RANGE / 2.0);
    }
}
