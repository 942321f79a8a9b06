//! Benchmarks for the shipped presets.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use emg_dsp::pipeline::{Preset, ProcessingPipeline, ScopeBuffers};

use crate::BLOCK_SIZES;

pub fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/pipeline");

    for &size in BLOCK_SIZES {
        for preset in Preset::ALL {
            let config = preset.config();
            let Ok(mut pipeline) = ProcessingPipeline::seeded(&config, 42) else {
                continue;
            };
            let Ok(mut scope) = ScopeBuffers::new(config.buffer_capacity) else {
                continue;
            };
            let dt = config.time_step();

            group.bench_with_input(BenchmarkId::new(preset.name(), size), &size, |b, _| {
                b.iter(|| {
                    for n in 0..size {
                        black_box(pipeline.tick(n as f32 * dt, &mut scope));
                    }
                })
            });
        }
    }

    group.finish();
}
