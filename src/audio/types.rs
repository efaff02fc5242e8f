//! The playback-engine contract the UI and transport logic are written against.

use std::path::Path;
use std::time::Duration;

use crate::error::PlayerError;

use super::eq::EQ_BANDS;

/// Transport state as shown to the user.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Everything the UI needs from a playback engine.
///
/// [`super::Player`] drives a real output device; tests use an in-memory fake.
pub trait Playback {
    /// Decode and start `path`. On failure the previous track keeps playing.
    fn play(&mut self, path: &Path) -> Result<(), PlayerError>;
    fn stop(&mut self);
    fn toggle_pause(&mut self);
    /// A track is loaded (playing or paused).
    fn is_playing(&self) -> bool;
    fn is_paused(&self) -> bool;
    /// Seek relative to the current position, clamped to the track bounds.
    fn seek_by(&mut self, delta_secs: f64) -> Result<(), PlayerError>;
    fn seek_to(&mut self, at: Duration) -> Result<(), PlayerError>;
    fn position(&self) -> Duration;
    fn duration(&self) -> Duration;
    /// Current volume in dB.
    fn volume(&self) -> f64;
    fn set_volume(&mut self, db: f64);
    fn eq_bands(&self) -> [f64; EQ_BANDS];
    fn set_eq_band(&mut self, band: usize, db: f64);
    /// Recent mono samples for the visualizer; empty unless audio is flowing.
    fn samples(&self) -> Vec<f64>;
    /// The loaded track played through to its end.
    fn track_done(&self) -> bool;
    fn close(&mut self);

    fn state(&self) -> PlaybackState {
        match (self.is_playing(), self.is_paused()) {
            (false, _) => PlaybackState::Stopped,
            (true, true) => PlaybackState::Paused,
            (true, false) => PlaybackState::Playing,
        }
    }
}
