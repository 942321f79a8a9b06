//! Whole-chain benchmarks.
//!
//! Each preset runs generator, filter stages, and scope writes together,
//! the same work the acquisition thread does per step.

mod pipeline;

pub use pipeline::bench_pipeline;
