//! In-memory [`Playback`] used by transport and event-loop tests.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::audio::{EQ_BANDS, Playback};
use crate::error::{DecodeError, PlayerError};

#[derive(Debug, Default)]
pub struct FakePlayer {
    pub loaded: Option<PathBuf>,
    pub played: Vec<PathBuf>,
    pub paused: bool,
    pub position: Duration,
    pub duration: Duration,
    pub volume: f64,
    pub eq: [f64; EQ_BANDS],
    pub done: bool,
    pub samples: Vec<f64>,
    /// Paths whose `play` fails.
    pub broken: Vec<PathBuf>,
    pub seeks: Vec<f64>,
}

impl FakePlayer {
    pub fn new() -> Self {
        Self {
            duration: Duration::from_secs(180),
            ..Self::default()
        }
    }

    pub fn last_played(&self) -> Option<&Path> {
        self.played.last().map(PathBuf::as_path)
    }
}

impl Playback for FakePlayer {
    fn play(&mut self, path: &Path) -> Result<(), PlayerError> {
        if self.broken.iter().any(|p| p == path) {
            return Err(DecodeError::DecodeFailed(format!("cannot open {}", path.display())).into());
        }
        self.loaded = Some(path.to_path_buf());
        self.played.push(path.to_path_buf());
        self.paused = false;
        self.position = Duration::ZERO;
        self.done = false;
        Ok(())
    }

    fn stop(&mut self) {
        self.loaded = None;
        self.paused = false;
    }

    fn toggle_pause(&mut self) {
        if self.loaded.is_some() {
            self.paused = !self.paused;
        }
    }

    fn is_playing(&self) -> bool {
        self.loaded.is_some()
    }

    fn is_paused(&self) -> bool {
        self.loaded.is_some() && self.paused
    }

    fn seek_by(&mut self, delta_secs: f64) -> Result<(), PlayerError> {
        self.seeks.push(delta_secs);
        let target = (self.position.as_secs_f64() + delta_secs).clamp(0.0, self.duration.as_secs_f64());
        self.position = Duration::from_secs_f64(target);
        Ok(())
    }

    fn seek_to(&mut self, at: Duration) -> Result<(), PlayerError> {
        self.position = at.min(self.duration);
        Ok(())
    }

    fn position(&self) -> Duration {
        self.position
    }

    fn duration(&self) -> Duration {
        self.duration
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn set_volume(&mut self, db: f64) {
        self.volume = db.clamp(-30.0, 6.0);
    }

    fn eq_bands(&self) -> [f64; EQ_BANDS] {
        self.eq
    }

    fn set_eq_band(&mut self, band: usize, db: f64) {
        if let Some(g) = self.eq.get_mut(band) {
            *g = db.clamp(-12.0, 12.0);
        }
    }

    fn samples(&self) -> Vec<f64> {
        if self.is_playing() && !self.paused {
            self.samples.clone()
        } else {
            Vec::new()
        }
    }

    fn track_done(&self) -> bool {
        self.loaded.is_some() && self.done
    }

    fn close(&mut self) {
        self.stop();
    }
}
