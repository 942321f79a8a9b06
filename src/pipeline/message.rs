#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::dsp::biquad::FilterSpec;

/// Live edits a host can queue for the pipeline.
///
/// Messages are applied between ticks, never inside one.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ControlMessage {
    /// Replace a stage's design outright.
    Reconfigure { stage: usize, spec: FilterSpec },
    /// Nudge a stage's `freq1` by `delta_hz`, never going below `floor_hz`.
    AdjustCutoff {
        stage: usize,
        delta_hz: f32,
        floor_hz: f32,
    },
    /// Zero every stage's delay line.
    ResetFilters,
}

impl ControlMessage {
    /// Stage the message edits, if it targets one.
    pub fn stage(&self) -> Option<usize> {
        match *self {
            ControlMessage::Reconfigure { stage, .. } | ControlMessage::AdjustCutoff { stage, .. } => {
                Some(stage)
            }
            ControlMessage::ResetFilters => None,
        }
    }
}

/// A stage's design as it stands after an edit was applied.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StageUpdate {
    pub stage: usize,
    pub spec: FilterSpec,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<ControlMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<ControlMessage> {
    fn pop(&mut self) -> Option<ControlMessage> {
        Consumer::pop(self).ok()
    }
}

impl MessageReceiver for std::collections::VecDeque<ControlMessage> {
    fn pop(&mut self) -> Option<ControlMessage> {
        self.pop_front()
    }
}
