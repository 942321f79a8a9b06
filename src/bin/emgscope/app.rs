//! Scope - builder and runner for the terminal host

use color_eyre::eyre::Result as EyreResult;
use rtrb::RingBuffer;

use emg_dsp::dsp::{FilterKind, FilterSpec};
use emg_dsp::pipeline::{
    ControlMessage, Frame, Preset, ProcessingPipeline, ScopeBuffers, SimulationConfig,
    StageUpdate, Trace,
};

use super::acquisition::Acquisition;
use super::ui::{UiApp, UiInit};

/// Control messages queued between UI frames.
const CONTROL_QUEUE: usize = 64;

pub struct Scope {
    preset: Preset,
    config: SimulationConfig,
    pipeline: ProcessingPipeline,
    block: usize,
}

impl Scope {
    pub fn new(preset: Preset, config: SimulationConfig, pipeline: ProcessingPipeline) -> Self {
        Self {
            preset,
            config,
            pipeline,
            block: 32,
        }
    }

    /// Samples generated per acquisition step.
    pub fn block(mut self, block: usize) -> Self {
        self.block = block.max(1);
        self
    }

    /// Run without a terminal UI, printing the chain's state every 100 samples.
    pub fn run_headless(mut self, samples: u64) -> EyreResult<()> {
        let mut scope = ScopeBuffers::new(self.config.buffer_capacity)?;
        let dt = self.config.time_step() as f64;

        println!("=== emgscope: {} ===", self.preset);
        println!("Sample rate: {} Hz", self.config.sample_rate_hz);
        for (index, spec) in self.pipeline.stage_specs().enumerate() {
            println!("  Stage {}: {:?}", index, spec);
        }
        println!();

        for n in 0..samples {
            let frame = self.pipeline.tick((n as f64 * dt) as f32, &mut scope);

            if (n + 1) % 100 == 0 {
                println!(
                    "Raw: {:.4}, Filtered: {:.4}, Envelope: {:.4}",
                    frame.raw, frame.mid, frame.envelope
                );
                println!(
                    "Max raw: {:.4}, Max filtered: {:.4}, Max envelope: {:.4}",
                    peak(scope.trace(Trace::Raw)),
                    peak(scope.trace(Trace::Mid)),
                    peak(scope.trace(Trace::Envelope))
                );
            }
        }

        println!();
        println!(
            "{} samples, {} non-finite substitutions",
            samples,
            self.pipeline.generator().nonfinite_count()
        );
        Ok(())
    }

    /// Open the terminal scope (takes over until the user quits).
    pub fn run(self) -> EyreResult<()> {
        let capacity = self.config.buffer_capacity;
        let sample_rate = self.config.sample_rate_hz;

        // a second of headroom between the worker and the UI
        let frame_slots = (sample_rate as usize).max(capacity);
        let (frame_tx, frame_rx) = RingBuffer::<Frame>::new(frame_slots);
        let (control_tx, control_rx) = RingBuffer::<ControlMessage>::new(CONTROL_QUEUE);
        let (update_tx, update_rx) = RingBuffer::<StageUpdate>::new(CONTROL_QUEUE);

        let init = UiInit {
            preset: self.preset,
            sample_rate,
            capacity,
            stage_specs: self.pipeline.stage_specs().copied().collect::<Vec<FilterSpec>>(),
            mid_stage: self.pipeline.mid_stage(),
            cutoff_stage: self.pipeline.find_stage(FilterKind::HighPass),
            envelope: self.pipeline.has_envelope(),
        };

        let acquisition = Acquisition::spawn(
            self.pipeline,
            sample_rate,
            self.block,
            frame_tx,
            control_rx,
            update_tx,
        );
        let mut ui = UiApp::new(init, frame_rx, control_tx, update_rx, acquisition)?;

        let mut terminal = ratatui::init();
        let result = ui.run(&mut terminal);
        ratatui::restore();
        result
    }
}

fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
}
