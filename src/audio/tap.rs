//! Sample tap: mirrors a mono mixdown of the audio flowing to the output into
//! a ring buffer the visualizer can read from another thread.

use std::sync::{Arc, Mutex, PoisonError};

use super::frames::{Frame, FrameSource};

#[derive(Debug)]
struct Ring {
    buf: Vec<f64>,
    pos: usize,
}

/// Shared ring of the most recent mono samples.
///
/// One `SampleTap` lives as long as the player; each loaded track is wrapped
/// with [`SampleTap::wrap`] so every stage writes into the same ring.
#[derive(Debug, Clone)]
pub struct SampleTap {
    ring: Arc<Mutex<Ring>>,
    capacity: usize,
}

impl SampleTap {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            ring: Arc::new(Mutex::new(Ring {
                buf: vec![0.0; capacity],
                pos: 0,
            })),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Put `inner` behind the tap.
    pub fn wrap<S: FrameSource>(&self, inner: S) -> Tapped<S> {
        Tapped {
            inner,
            ring: Arc::clone(&self.ring),
            capacity: self.capacity,
        }
    }

    /// The last `n` samples (at most `capacity`) in chronological order.
    pub fn samples(&self, n: usize) -> Vec<f64> {
        let n = n.min(self.capacity);
        let mut out = Vec::with_capacity(n);
        let ring = self.ring.lock().unwrap_or_else(PoisonError::into_inner);
        let start = (ring.pos + self.capacity - n) % self.capacity;
        for i in 0..n {
            out.push(ring.buf[(start + i) % self.capacity]);
        }
        out
    }

    /// Zero the ring so a new session does not show stale audio.
    pub fn clear(&self) {
        let mut ring = self.ring.lock().unwrap_or_else(PoisonError::into_inner);
        ring.buf.fill(0.0);
        ring.pos = 0;
    }
}

/// A frame source whose output is mirrored into a [`SampleTap`].
#[derive(Debug)]
pub struct Tapped<S> {
    inner: S,
    ring: Arc<Mutex<Ring>>,
    capacity: usize,
}

impl<S> Tapped<S> {
    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }
}

impl<S: FrameSource> FrameSource for Tapped<S> {
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        let (n, more) = self.inner.stream(frames);
        if n > 0 {
            let mut ring = self.ring.lock().unwrap_or_else(PoisonError::into_inner);
            for frame in &frames[..n] {
                let pos = ring.pos;
                ring.buf[pos] = (frame[0] + frame[1]) / 2.0;
                ring.pos = (pos + 1) % self.capacity;
            }
        }
        (n, more)
    }
}
