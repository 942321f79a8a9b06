//! Acquisition worker: runs the pipeline at the sample rate on its own thread.
//!
//! Frames go out through one ring buffer, control messages come in through
//! another, and the design of every stage an accepted edit touched goes back
//! through a third. A frame is pushed whole, so the renderer never sees half
//! a tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use emg_dsp::pipeline::{ControlMessage, Frame, ProcessingPipeline, StageUpdate};
use rtrb::{Consumer, Producer};

pub struct Acquisition {
    running: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Acquisition {
    pub fn spawn(
        mut pipeline: ProcessingPipeline,
        sample_rate: f32,
        block: usize,
        mut frames: Producer<Frame>,
        mut controls: Consumer<ControlMessage>,
        mut updates: Producer<StageUpdate>,
    ) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let paused = Arc::new(AtomicBool::new(false));

        let worker_running = running.clone();
        let worker_paused = paused.clone();
        let block_duration = Duration::from_secs_f32(block as f32 / sample_rate);

        let handle = thread::spawn(move || {
            let mut tick: u64 = 0;
            let mut dropped: u64 = 0;

            while worker_running.load(Ordering::Relaxed) {
                // edits land between ticks, never inside one
                pipeline.drain_messages_with(&mut controls, |update| {
                    if updates.push(update).is_err() {
                        log::warn!("update queue full; stage {} display is stale", update.stage);
                    }
                });

                if !worker_paused.load(Ordering::Relaxed) {
                    for _ in 0..block {
                        let t = (tick as f64 / sample_rate as f64) as f32;
                        let frame = pipeline.next_frame(t);
                        tick += 1;

                        if frames.push(frame).is_err() {
                            dropped += 1;
                        }
                    }
                }

                thread::sleep(block_duration);
            }

            log::debug!(
                "acquisition stopped after {} samples ({} dropped, {} non-finite)",
                tick,
                dropped,
                pipeline.generator().nonfinite_count()
            );
        });

        Self {
            running,
            paused,
            handle: Some(handle),
        }
    }

    /// Flip pause; returns whether generation is now paused.
    pub fn toggle_pause(&self) -> bool {
        !self.paused.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }
}

impl Drop for Acquisition {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("acquisition thread panicked");
            }
        }
    }
}
