//! Fixed-capacity trace storage shared between the pipeline and a renderer.

#[cfg(feature = "rtrb")]
use rtrb::Consumer;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// The three values produced by one tick.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frame {
    pub raw: f32,
    pub mid: f32,
    pub envelope: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trace {
    Raw,
    Mid,
    Envelope,
}

impl Trace {
    pub const ALL: [Trace; 3] = [Trace::Raw, Trace::Mid, Trace::Envelope];

    pub fn label(self) -> &'static str {
        match self {
            Trace::Raw => "raw",
            Trace::Mid => "filtered",
            Trace::Envelope => "envelope",
        }
    }
}

/// Three ring buffers behind one write cursor.
///
/// Each [`push`](ScopeBuffers::push) writes all three traces at the cursor and
/// then advances it, so every slot always holds values from the same tick.
#[derive(Debug, Clone)]
pub struct ScopeBuffers {
    raw: Vec<f32>,
    mid: Vec<f32>,
    envelope: Vec<f32>,
    cursor: usize,
    written: u64,
}

impl ScopeBuffers {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        Ok(Self {
            raw: vec![0.0; capacity],
            mid: vec![0.0; capacity],
            envelope: vec![0.0; capacity],
            cursor: 0,
            written: 0,
        })
    }

    #[inline]
    pub fn push(&mut self, frame: Frame) {
        self.raw[self.cursor] = frame.raw;
        self.mid[self.cursor] = frame.mid;
        self.envelope[self.cursor] = frame.envelope;
        self.cursor = (self.cursor + 1) % self.raw.len();
        self.written = self.written.wrapping_add(1);
    }

    /// Pull every frame the producer has published so far.
    #[cfg(feature = "rtrb")]
    pub fn drain(&mut self, rx: &mut Consumer<Frame>) -> usize {
        let mut count = 0;
        while let Ok(frame) = rx.pop() {
            self.push(frame);
            count += 1;
        }
        count
    }

    pub fn capacity(&self) -> usize {
        self.raw.len()
    }

    /// Slot the next tick will be written to. Also the oldest sample once
    /// the buffers have wrapped.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Total ticks pushed since construction or the last clear.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Storage order, not time order.
    pub fn trace(&self, trace: Trace) -> &[f32] {
        match trace {
            Trace::Raw => &self.raw,
            Trace::Mid => &self.mid,
            Trace::Envelope => &self.envelope,
        }
    }

    /// Oldest-to-newest samples, starting at the cursor.
    pub fn ordered(&self, trace: Trace) -> impl Iterator<Item = f32> + '_ {
        let data = self.trace(trace);
        let (newer, older) = data.split_at(self.cursor);
        older.iter().chain(newer.iter()).copied()
    }

    pub fn latest(&self) -> Option<Frame> {
        if self.written == 0 {
            return None;
        }
        let index = (self.cursor + self.capacity() - 1) % self.capacity();
        Some(Frame {
            raw: self.raw[index],
            mid: self.mid[index],
            envelope: self.envelope[index],
        })
    }

    pub fn clear(&mut self) {
        self.raw.fill(0.0);
        self.mid.fill(0.0);
        self.envelope.fill(0.0);
        self.cursor = 0;
        self.written = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(value: f32) -> Frame {
        Frame {
            raw: value,
            mid: value * 10.0,
            envelope: value * 100.0,
        }
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(matches!(ScopeBuffers::new(0), Err(ConfigError::ZeroCapacity)));
    }

    #[test]
    fn cursor_wraps_at_capacity() {
        let mut scope = ScopeBuffers::new(4).unwrap();
        for i in 0..6 {
            scope.push(frame(i as f32));
        }
        assert_eq!(scope.cursor(), 2);
        assert_eq!(scope.written(), 6);
        assert_eq!(scope.trace(Trace::Raw), &[4.0, 5.0, 2.0, 3.0]);
    }

    #[test]
    fn ordered_reads_oldest_first() {
        let mut scope = ScopeBuffers::new(4).unwrap();
        for i in 0..6 {
            scope.push(frame(i as f32));
        }

        let raw: Vec<f32> = scope.ordered(Trace::Raw).collect();
        let mid: Vec<f32> = scope.ordered(Trace::Mid).collect();
        assert_eq!(raw, vec![2.0, 3.0, 4.0, 5.0]);
        assert_eq!(mid, vec![20.0, 30.0, 40.0, 50.0]);
    }

    #[test]
    fn traces_stay_in_lockstep() {
        let mut scope = ScopeBuffers::new(3).unwrap();
        for i in 0..7 {
            scope.push(frame(i as f32 + 1.0));
        }
        for slot in 0..3 {
            let raw = scope.trace(Trace::Raw)[slot];
            assert_eq!(scope.trace(Trace::Mid)[slot], raw * 10.0);
            assert_eq!(scope.trace(Trace::Envelope)[slot], raw * 100.0);
        }
    }

    #[test]
    fn latest_is_the_last_push() {
        let mut scope = ScopeBuffers::new(2).unwrap();
        assert_eq!(scope.latest(), None);

        scope.push(frame(1.0));
        scope.push(frame(2.0));
        assert_eq!(scope.latest(), Some(frame(2.0)));
    }

    #[test]
    fn clear_resets_everything() {
        let mut scope = ScopeBuffers::new(2).unwrap();
        scope.push(frame(1.0));
        scope.clear();

        assert_eq!(scope.cursor(), 0);
        assert_eq!(scope.written(), 0);
        assert!(scope.trace(Trace::Envelope).iter().all(|&v| v == 0.0));
    }

    #[cfg(feature = "rtrb")]
    #[test]
    fn drain_applies_whole_frames() {
        let (mut tx, mut rx) = rtrb::RingBuffer::<Frame>::new(16);
        for i in 0..5 {
            tx.push(frame(i as f32)).unwrap();
        }

        let mut scope = ScopeBuffers::new(8).unwrap();
        assert_eq!(scope.drain(&mut rx), 5);
        assert_eq!(scope.cursor(), 5);
        assert_eq!(scope.latest(), Some(frame(4.0)));
        assert_eq!(scope.drain(&mut rx), 0);
    }
}
