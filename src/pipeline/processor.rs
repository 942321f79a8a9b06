use rand::rngs::StdRng;
use rand::Rng;

use crate::dsp::biquad::{BiquadFilter, FilterKind, FilterSpec};
use crate::dsp::generator::SignalGenerator;
use crate::dsp::rectify;
use crate::error::{ConfigError, Result};
use crate::pipeline::config::SimulationConfig;
use crate::pipeline::message::{ControlMessage, MessageReceiver, StageUpdate};
use crate::pipeline::scope::{Frame, ScopeBuffers};

/// Generator plus an ordered chain of biquad stages.
///
/// Each stage owns its filter outright; nothing reads another stage's delay
/// line, so any stage can be redesigned between ticks without disturbing
/// the rest.
pub struct ProcessingPipeline<R = StdRng> {
    generator: SignalGenerator<R>,
    stages: Vec<BiquadFilter>,
    mid_stage: usize,
    envelope: bool,
}

impl ProcessingPipeline<StdRng> {
    /// Pipeline whose generator is seeded from OS entropy.
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;
        let generator = SignalGenerator::from_entropy(config.generator, config.sample_rate_hz)?;
        Self::assemble(config, generator)
    }

    pub fn seeded(config: &SimulationConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let generator = SignalGenerator::seeded(config.generator, config.sample_rate_hz, seed)?;
        Self::assemble(config, generator)
    }
}

impl<R: Rng> ProcessingPipeline<R> {
    pub fn with_rng(config: &SimulationConfig, rng: R) -> Result<Self> {
        config.validate()?;
        let generator = SignalGenerator::new(config.generator, config.sample_rate_hz, rng)?;
        Self::assemble(config, generator)
    }

    fn assemble(config: &SimulationConfig, generator: SignalGenerator<R>) -> Result<Self> {
        let stages = config
            .pipeline
            .stages
            .iter()
            .copied()
            .map(BiquadFilter::new)
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "pipeline ready: {} stages at {} Hz, mid after stage {}, envelope {}",
            stages.len(),
            config.sample_rate_hz,
            config.pipeline.mid_stage,
            config.pipeline.envelope
        );

        Ok(Self {
            generator,
            stages,
            mid_stage: config.pipeline.mid_stage,
            envelope: config.pipeline.envelope,
        })
    }

    /// Generate one sample at host time `t` and run it through the chain.
    pub fn next_frame(&mut self, t: f32) -> Frame {
        let raw = self.generator.next(t);
        self.process(raw)
    }

    /// Run an externally supplied sample through the chain.
    pub fn process(&mut self, raw: f32) -> Frame {
        let last = self.stages.len() - 1;
        let mut signal = raw;
        let mut mid = raw;

        for (index, stage) in self.stages.iter_mut().enumerate() {
            if self.envelope && index == last {
                signal = rectify(signal);
            }
            signal = stage.process(signal);
            if index == self.mid_stage {
                mid = signal;
            }
        }

        Frame {
            raw,
            mid,
            envelope: signal,
        }
    }

    /// One full tick: generate, filter, and write all three traces.
    pub fn tick(&mut self, t: f32, scope: &mut ScopeBuffers) -> Frame {
        let frame = self.next_frame(t);
        scope.push(frame);
        frame
    }

    pub fn reconfigure(&mut self, stage: usize, spec: FilterSpec) -> Result<()> {
        let len = self.stages.len();
        let filter = self
            .stages
            .get_mut(stage)
            .ok_or(ConfigError::StageOutOfRange { index: stage, len })?;

        filter.reconfigure(spec)?;
        log::debug!("stage {} reconfigured: {:?}", stage, spec);
        Ok(())
    }

    /// Shift a stage's `freq1` by `delta_hz`, clamped to `floor_hz`.
    /// Returns the cutoff now in effect.
    pub fn adjust_cutoff(&mut self, stage: usize, delta_hz: f32, floor_hz: f32) -> Result<f32> {
        let spec = *self.stage_spec(stage).ok_or(ConfigError::StageOutOfRange {
            index: stage,
            len: self.stages.len(),
        })?;

        let cutoff = (spec.freq1 + delta_hz).max(floor_hz);
        self.reconfigure(stage, spec.with_freq1(cutoff))?;
        Ok(cutoff)
    }

    pub fn reset_filters(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }

    pub fn apply(&mut self, message: ControlMessage) -> Result<()> {
        match message {
            ControlMessage::Reconfigure { stage, spec } => self.reconfigure(stage, spec),
            ControlMessage::AdjustCutoff {
                stage,
                delta_hz,
                floor_hz,
            } => self.adjust_cutoff(stage, delta_hz, floor_hz).map(|_| ()),
            ControlMessage::ResetFilters => {
                self.reset_filters();
                Ok(())
            }
        }
    }

    /// Apply every queued message. Failures are logged and skipped so a bad
    /// edit never stops the signal.
    pub fn drain_messages<M: MessageReceiver>(&mut self, rx: &mut M) -> usize {
        self.drain_messages_with(rx, |_| {})
    }

    /// Like [`drain_messages`](Self::drain_messages), calling `on_applied`
    /// with the resulting design of every stage an accepted edit touched.
    /// Rejected edits report nothing.
    pub fn drain_messages_with<M, F>(&mut self, rx: &mut M, mut on_applied: F) -> usize
    where
        M: MessageReceiver,
        F: FnMut(StageUpdate),
    {
        let mut count = 0;
        while let Some(message) = rx.pop() {
            match self.apply(message) {
                Ok(()) => {
                    if let Some(stage) = message.stage() {
                        if let Some(spec) = self.stage_spec(stage) {
                            on_applied(StageUpdate { stage, spec: *spec });
                        }
                    }
                }
                Err(err) => log::warn!("ignoring {:?}: {}", message, err),
            }
            count += 1;
        }
        count
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn stage_spec(&self, stage: usize) -> Option<&FilterSpec> {
        self.stages.get(stage).map(BiquadFilter::spec)
    }

    pub fn stage_specs(&self) -> impl Iterator<Item = &FilterSpec> + '_ {
        self.stages.iter().map(BiquadFilter::spec)
    }

    /// Index of the first stage of the given kind.
    pub fn find_stage(&self, kind: FilterKind) -> Option<usize> {
        self.stages.iter().position(|stage| stage.spec().kind == kind)
    }

    pub fn mid_stage(&self) -> usize {
        self.mid_stage
    }

    pub fn has_envelope(&self) -> bool {
        self.envelope
    }

    pub fn generator(&self) -> &SignalGenerator<R> {
        &self.generator
    }
}
