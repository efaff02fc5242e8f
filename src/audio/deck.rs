//! The loaded track's processing chain and the `rodio` source that drains it.
//!
//! The chain (decoder -> volume -> EQ -> tap) sits behind a mutex. The output
//! thread locks it once per chunk; the player locks it for seek, volume, EQ
//! and position queries. The tap ring has its own lock, so readers of the
//! visualizer window never wait on a chunk being rendered.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rodio::Source;

use crate::error::DecodeError;

use super::decode::PcmStream;
use super::eq::{EQ_BANDS, Equalizer};
use super::frames::{Frame, FrameSource};
use super::tap::{SampleTap, Tapped};
use super::volume::Volume;

/// Frames rendered per lock of the chain.
const CHUNK_FRAMES: usize = 1024;

pub type Chain = Tapped<Equalizer<Volume<PcmStream>>>;

/// Compose a decoded stream with the player's current volume, EQ and tap.
pub fn build_chain(
    pcm: PcmStream,
    tap: &SampleTap,
    sample_rate: u32,
    volume_db: f64,
    eq: [f64; EQ_BANDS],
) -> Chain {
    tap.wrap(Equalizer::new(Volume::new(pcm, volume_db), sample_rate, eq))
}

fn pcm_of(chain: &mut Chain) -> &mut PcmStream {
    chain.inner_mut().inner_mut().inner_mut()
}

/// One loaded track.
#[derive(Debug)]
pub struct Deck {
    slot: Arc<Mutex<Option<Chain>>>,
    done: Arc<AtomicBool>,
    sample_rate: u32,
}

impl Deck {
    pub fn new(chain: Chain, sample_rate: u32) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(chain))),
            done: Arc::new(AtomicBool::new(false)),
            sample_rate,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Chain>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A `rodio` source pulling from this deck. Create one per sink.
    pub fn source(&self) -> DeckSource {
        DeckSource {
            slot: Arc::clone(&self.slot),
            done: Arc::clone(&self.done),
            buf: vec![[0.0; 2]; CHUNK_FRAMES],
            filled: 0,
            cursor: 0,
            sample_rate: self.sample_rate,
        }
    }

    /// Run `f` on the chain; `None` once the deck is closed.
    pub fn with_chain<R>(&self, f: impl FnOnce(&mut Chain) -> R) -> Option<R> {
        self.lock().as_mut().map(f)
    }

    pub fn set_volume(&self, db: f64) {
        self.with_chain(|c| c.inner_mut().inner_mut().set_db(db));
    }

    pub fn set_eq_band(&self, band: usize, db: f64) {
        self.with_chain(|c| c.inner_mut().set_gain(band, db));
    }

    pub fn position(&self) -> Duration {
        self.with_chain(|c| pcm_of(c).position())
            .map(|frames| self.frames_to_duration(frames))
            .unwrap_or_default()
    }

    pub fn duration(&self) -> Duration {
        self.with_chain(|c| pcm_of(c).len())
            .map(|frames| self.frames_to_duration(frames))
            .unwrap_or_default()
    }

    /// Move to `at`, clamped to the end of the track.
    pub fn seek_to(&self, at: Duration) -> Result<(), DecodeError> {
        let target = (at.as_secs_f64() * f64::from(self.sample_rate)).round() as usize;
        self.with_chain(|c| {
            let pcm = pcm_of(c);
            let clamped = target.min(pcm.len());
            pcm.seek(clamped)
        })
        .unwrap_or(Ok(()))
    }

    /// Seek relative to the current position, clamped to `[0, len]`.
    pub fn seek_by(&self, delta_secs: f64) -> Result<(), DecodeError> {
        let rate = f64::from(self.sample_rate);
        self.with_chain(|c| {
            let pcm = pcm_of(c);
            let target = pcm.position() as f64 + delta_secs * rate;
            let clamped = target.round().clamp(0.0, pcm.len() as f64) as usize;
            pcm.seek(clamped)
        })
        .unwrap_or(Ok(()))
    }

    /// Whether the stream ran out while being played.
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    /// Drop the chain and its decoded buffer; sources return no more data.
    pub fn close(&self) {
        if let Some(mut chain) = self.lock().take() {
            pcm_of(&mut chain).close();
        }
    }

    fn frames_to_duration(&self, frames: usize) -> Duration {
        Duration::from_secs_f64(frames as f64 / f64::from(self.sample_rate.max(1)))
    }
}

/// Interleaved `f32` view of a deck for the output mixer.
pub struct DeckSource {
    slot: Arc<Mutex<Option<Chain>>>,
    done: Arc<AtomicBool>,
    buf: Vec<Frame>,
    filled: usize,
    cursor: usize,
    sample_rate: u32,
}

impl DeckSource {
    fn refill(&mut self) -> bool {
        let (n, _more) = {
            let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
            match slot.as_mut() {
                Some(chain) => chain.stream(&mut self.buf),
                None => return false,
            }
        };
        if n == 0 {
            self.done.store(true, Ordering::Release);
            return false;
        }
        self.filled = n;
        self.cursor = 0;
        true
    }
}

impl Iterator for DeckSource {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.cursor >= self.filled * 2 && !self.refill() {
            return None;
        }
        let sample = self.buf[self.cursor / 2][self.cursor % 2];
        self.cursor += 1;
        Some(sample as f32)
    }
}

impl Source for DeckSource {
    fn current_span_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        2
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}
