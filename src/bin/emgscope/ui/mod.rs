//! TUI module for emgscope
//!
//! Three scrolling traces (raw, filtered, envelope) plus a spectrum of the
//! filtered trace.

mod spectrum;
mod status;
mod traces;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};
use std::time::Duration;

use emg_dsp::dsp::FilterSpec;
use emg_dsp::pipeline::{self, ControlMessage, Preset, ScopeBuffers, StageUpdate, Trace};

use super::acquisition::Acquisition;
use spectrum::{render_spectrum, SpectrumAnalyzer};
use status::render_status;
use traces::render_trace;

/// Arrow keys move the high-pass cutoff by this much.
const CUTOFF_STEP_HZ: f32 = 0.5;
/// Arrow keys never push the cutoff below this.
const CUTOFF_FLOOR_HZ: f32 = 1.0;

/// Static facts about the running pipeline, captured before the worker starts.
pub struct UiInit {
    pub preset: Preset,
    pub sample_rate: f32,
    pub capacity: usize,
    pub stage_specs: Vec<FilterSpec>,
    pub mid_stage: usize,
    /// First high-pass stage; the arrow keys do nothing without one.
    pub cutoff_stage: Option<usize>,
    pub envelope: bool,
}

pub struct UiApp {
    init: UiInit,
    frame_rx: Consumer<pipeline::Frame>,
    control_tx: Producer<ControlMessage>,
    update_rx: Consumer<StageUpdate>,
    acquisition: Acquisition,
    scope: ScopeBuffers,
    spectrum: SpectrumAnalyzer,
    /// Time-ordered copy of the filtered trace, reused every frame.
    mid_ordered: Vec<f32>,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        init: UiInit,
        frame_rx: Consumer<pipeline::Frame>,
        control_tx: Producer<ControlMessage>,
        update_rx: Consumer<StageUpdate>,
        acquisition: Acquisition,
    ) -> EyreResult<Self> {
        let scope = ScopeBuffers::new(init.capacity)?;
        let spectrum = SpectrumAnalyzer::new(init.capacity, init.sample_rate);

        Ok(Self {
            mid_ordered: Vec::with_capacity(init.capacity),
            init,
            frame_rx,
            control_tx,
            update_rx,
            acquisition,
            scope,
            spectrum,
            should_quit: false,
        })
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            while let Ok(update) = self.update_rx.pop() {
                apply_update(&mut self.init.stage_specs, update);
            }
            if self.scope.drain(&mut self.frame_rx) > 0 {
                self.mid_ordered.clear();
                self.mid_ordered.extend(self.scope.ordered(Trace::Mid));
                self.spectrum.update(&self.mid_ordered);
            }

            terminal.draw(|frame| self.render(frame))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') => {
                let paused = self.acquisition.toggle_pause();
                log::info!("generation {}", if paused { "paused" } else { "resumed" });
            }
            KeyCode::Up => self.nudge_cutoff(CUTOFF_STEP_HZ),
            KeyCode::Down => self.nudge_cutoff(-CUTOFF_STEP_HZ),
            KeyCode::Char('r') | KeyCode::Char('R') => {
                if self.send(ControlMessage::ResetFilters) {
                    self.scope.clear();
                }
            }
            _ => {}
        }
    }

    fn nudge_cutoff(&mut self, delta_hz: f32) {
        if let Some(message) = cutoff_message(self.init.cutoff_stage, delta_hz) {
            // the status bar changes once the worker reports the applied design
            self.send(message);
        }
    }

    fn send(&mut self, message: ControlMessage) -> bool {
        match self.control_tx.push(message) {
            Ok(()) => true,
            Err(_) => {
                log::warn!("control queue full; dropping {:?}", message);
                false
            }
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Status bar
                Constraint::Min(12),   // Traces + spectrum
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        render_status(
            frame,
            chunks[0],
            &self.init,
            self.acquisition.is_paused(),
            self.scope.written(),
        );

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(chunks[1]);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(body[0]);

        let envelope_title = if self.init.envelope {
            " Envelope (rectified + smoothed) "
        } else {
            " Output "
        };
        render_trace(frame, rows[0], " Raw ", Color::Red, &self.scope, Trace::Raw);
        render_trace(frame, rows[1], " Filtered ", Color::Green, &self.scope, Trace::Mid);
        render_trace(frame, rows[2], envelope_title, Color::Blue, &self.scope, Trace::Envelope);

        render_spectrum(frame, body[1], self.spectrum.data());

        let help = Paragraph::new(
            " [Q] Quit  [Space] Pause/Resume  [Up/Down] High-pass ±0.5 Hz  [R] Reset filters",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[2]);
    }
}

fn cutoff_message(cutoff_stage: Option<usize>, delta_hz: f32) -> Option<ControlMessage> {
    cutoff_stage.map(|stage| ControlMessage::AdjustCutoff {
        stage,
        delta_hz,
        floor_hz: CUTOFF_FLOOR_HZ,
    })
}

fn apply_update(stage_specs: &mut [FilterSpec], update: StageUpdate) {
    if let Some(spec) = stage_specs.get_mut(update.stage) {
        *spec = update.spec;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_target_the_highpass_stage() {
        assert_eq!(
            cutoff_message(Some(2), -CUTOFF_STEP_HZ),
            Some(ControlMessage::AdjustCutoff {
                stage: 2,
                delta_hz: -0.5,
                floor_hz: 1.0,
            })
        );
    }

    #[test]
    fn arrows_do_nothing_without_a_highpass_stage() {
        assert_eq!(cutoff_message(None, CUTOFF_STEP_HZ), None);
    }

    #[test]
    fn reported_design_replaces_the_displayed_one() {
        let mut specs = vec![
            FilterSpec::high_pass(2_000.0, 5.0),
            FilterSpec::low_pass(2_000.0, 2.0),
        ];
        let applied = FilterSpec::high_pass(2_000.0, 5.5);

        apply_update(&mut specs, StageUpdate { stage: 0, spec: applied });
        apply_update(&mut specs, StageUpdate { stage: 7, spec: applied });

        assert_eq!(specs[0], applied);
        assert_eq!(specs[1], FilterSpec::low_pass(2_000.0, 2.0));
    }
}
