//! Orchestration above the DSP primitives: stage order, taps, scope traces,
//! and the control messages a host uses to edit stages between ticks.

/// Simulation settings and the named presets.
pub mod config;
/// Queued stage edits.
pub mod message;
/// The generator-to-envelope processing chain.
pub mod processor;
/// Ring-buffered traces for a renderer.
pub mod scope;

pub use config::{PipelineConfig, Preset, SimulationConfig};
pub use message::{ControlMessage, MessageReceiver, StageUpdate};
pub use processor::ProcessingPipeline;
pub use scope::{Frame, ScopeBuffers, Trace};
