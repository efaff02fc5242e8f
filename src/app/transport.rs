//! Playback actions: glue between the playlist, the UI state and a
//! [`Playback`] engine.

use std::fmt::Display;
use std::time::Duration;

use tracing::{info, warn};

use crate::audio::{EQ_BANDS, PRESETS, Playback};

use super::model::App;

/// Past this point "previous" restarts the current track instead.
const RESTART_THRESHOLD: Duration = Duration::from_secs(3);

impl App {
    /// Show an error on the status line.
    pub fn report(&mut self, err: impl Display) {
        let msg = err.to_string();
        warn!(error = %msg, "user-visible error");
        self.error = Some(msg);
    }

    /// Start the playlist's current track.
    pub fn play_current<P: Playback + ?Sized>(&mut self, player: &mut P) {
        let Some((index, track)) = self.playlist.current() else {
            return;
        };
        let path = track.path.clone();
        match player.play(&path) {
            Ok(()) => {
                info!(index, path = %path.display(), "track started");
                self.error = None;
            }
            Err(e) => self.report(e),
        }
    }

    /// Make the highlighted track current and play it.
    pub fn play_selected<P: Playback + ?Sized>(&mut self, player: &mut P) {
        if !self.has_tracks() {
            return;
        }
        self.playlist.set_index(self.cursor);
        self.play_current(player);
    }

    /// Space: start the highlighted track when stopped, otherwise pause/resume.
    pub fn toggle_play<P: Playback + ?Sized>(&mut self, player: &mut P) {
        if player.is_playing() {
            player.toggle_pause();
        } else {
            self.play_selected(player);
        }
    }

    pub fn stop<P: Playback + ?Sized>(&mut self, player: &mut P) {
        player.stop();
    }

    /// Advance the playlist and play the result; stop at the end of the list.
    pub fn next_track<P: Playback + ?Sized>(&mut self, player: &mut P) {
        if self.playlist.next().is_none() {
            player.stop();
            return;
        }
        self.follow_current();
        self.play_current(player);
    }

    /// Restart the current track when past the first few seconds, otherwise
    /// go back one track.
    pub fn prev_track<P: Playback + ?Sized>(&mut self, player: &mut P) {
        if player.position() > RESTART_THRESHOLD {
            if let Err(e) = player.seek_to(Duration::ZERO) {
                self.report(e);
            }
            return;
        }
        if self.playlist.prev().is_none() {
            return;
        }
        self.follow_current();
        self.play_current(player);
    }

    pub fn seek<P: Playback + ?Sized>(&mut self, player: &mut P, forward: bool) {
        let step = self.controls.seek_seconds as f64;
        let delta = if forward { step } else { -step };
        if let Err(e) = player.seek_by(delta) {
            self.report(e);
        }
    }

    pub fn change_volume<P: Playback + ?Sized>(&mut self, player: &mut P, up: bool) {
        let step = self.controls.volume_step_db;
        let db = player.volume() + if up { step } else { -step };
        player.set_volume(db);
    }

    /// Raise or lower the focused EQ band. Any manual edit leaves the preset.
    pub fn change_eq_band<P: Playback + ?Sized>(&mut self, player: &mut P, up: bool) {
        let step = self.controls.eq_step_db;
        let band = self.eq_cursor.min(EQ_BANDS - 1);
        let db = player.eq_bands()[band] + if up { step } else { -step };
        player.set_eq_band(band, db);
        self.preset = None;
    }

    /// Apply preset `index` to every band.
    pub fn apply_preset<P: Playback + ?Sized>(&mut self, player: &mut P, index: usize) {
        let Some(preset) = PRESETS.get(index) else {
            return;
        };
        for (band, gain) in preset.gains.iter().enumerate() {
            player.set_eq_band(band, *gain);
        }
        self.preset = Some(index);
    }

    /// Step to the next preset; from a custom curve this starts at the first.
    pub fn next_preset<P: Playback + ?Sized>(&mut self, player: &mut P) {
        let next = self.preset.map_or(0, |i| (i + 1) % PRESETS.len());
        self.apply_preset(player, next);
    }

    /// Play the search selection and close the search overlay.
    pub fn commit_search<P: Playback + ?Sized>(&mut self, player: &mut P) {
        if let Some(index) = self.search_selection() {
            self.playlist.set_index(index);
            self.select(index);
            self.play_current(player);
        }
        self.search = None;
    }

    /// Periodic update: advance past finished tracks and refresh the spectrum.
    pub fn tick<P: Playback + ?Sized>(&mut self, player: &mut P) {
        if player.is_playing() && !player.is_paused() && player.track_done() {
            self.next_track(player);
        }
        let samples = player.samples();
        self.analyzer.analyze(&samples);
    }

    fn follow_current(&mut self) {
        if let Some(index) = self.playlist.index() {
            self.select(index);
        }
    }
}
