use std::path::Path;
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, info};

use crate::config::AudioSettings;
use crate::error::PlayerError;

use super::decode::FfmpegDecoder;
use super::deck::{Deck, build_chain};
use super::eq::{EQ_BANDS, clamp_gain};
use super::tap::SampleTap;
use super::types::Playback;
use super::volume::clamp_volume;

/// Playback engine backed by the default `rodio` output device.
///
/// Volume and EQ are player-wide: they survive track changes and are applied
/// to each newly loaded chain.
pub struct Player {
    stream: OutputStream,
    sink: Option<Sink>,
    deck: Option<Deck>,
    tap: SampleTap,
    decoder: FfmpegDecoder,
    sample_rate: u32,
    volume_db: f64,
    eq: [f64; EQ_BANDS],
    paused: bool,
}

impl Player {
    /// Open the default output device. `window` is the tap size handed to
    /// the visualizer on each [`Playback::samples`] call.
    pub fn new(settings: &AudioSettings, window: usize) -> Result<Self, PlayerError> {
        let mut stream = OutputStreamBuilder::open_default_stream()?;
        // rodio logs to stderr when the stream is dropped, which would land on the TUI.
        stream.log_on_drop(false);

        Ok(Self {
            stream,
            sink: None,
            deck: None,
            tap: SampleTap::new(window),
            decoder: FfmpegDecoder::new(settings.decoder.clone()),
            sample_rate: settings.sample_rate,
            volume_db: clamp_volume(settings.volume_db),
            eq: settings.eq.map(clamp_gain),
            paused: false,
        })
    }

    fn unload(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        if let Some(deck) = self.deck.take() {
            deck.close();
        }
        self.paused = false;
    }
}

impl Playback for Player {
    fn play(&mut self, path: &Path) -> Result<(), PlayerError> {
        let pcm = self.decoder.decode(path, self.sample_rate)?;
        self.unload();

        let chain = build_chain(pcm, &self.tap, self.sample_rate, self.volume_db, self.eq);
        let deck = Deck::new(chain, self.sample_rate);
        let sink = Sink::connect_new(self.stream.mixer());
        sink.append(deck.source());
        sink.play();

        info!(path = %path.display(), duration_s = deck.duration().as_secs(), "playing");
        self.sink = Some(sink);
        self.deck = Some(deck);
        Ok(())
    }

    fn stop(&mut self) {
        if self.deck.is_some() {
            debug!("stop");
        }
        self.unload();
    }

    fn toggle_pause(&mut self) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };
        if self.paused {
            sink.play();
        } else {
            sink.pause();
        }
        self.paused = !self.paused;
    }

    fn is_playing(&self) -> bool {
        self.deck.is_some()
    }

    fn is_paused(&self) -> bool {
        self.deck.is_some() && self.paused
    }

    fn seek_by(&mut self, delta_secs: f64) -> Result<(), PlayerError> {
        match &self.deck {
            Some(deck) => Ok(deck.seek_by(delta_secs)?),
            None => Ok(()),
        }
    }

    fn seek_to(&mut self, at: Duration) -> Result<(), PlayerError> {
        match &self.deck {
            Some(deck) => Ok(deck.seek_to(at)?),
            None => Ok(()),
        }
    }

    fn position(&self) -> Duration {
        self.deck.as_ref().map(Deck::position).unwrap_or_default()
    }

    fn duration(&self) -> Duration {
        self.deck.as_ref().map(Deck::duration).unwrap_or_default()
    }

    fn volume(&self) -> f64 {
        self.volume_db
    }

    fn set_volume(&mut self, db: f64) {
        self.volume_db = clamp_volume(db);
        if let Some(deck) = &self.deck {
            deck.set_volume(self.volume_db);
        }
    }

    fn eq_bands(&self) -> [f64; EQ_BANDS] {
        self.eq
    }

    fn set_eq_band(&mut self, band: usize, db: f64) {
        if band >= EQ_BANDS {
            return;
        }
        self.eq[band] = clamp_gain(db);
        if let Some(deck) = &self.deck {
            deck.set_eq_band(band, self.eq[band]);
        }
    }

    fn samples(&self) -> Vec<f64> {
        if self.is_playing() && !self.paused {
            self.tap.samples(self.tap.capacity())
        } else {
            Vec::new()
        }
    }

    fn track_done(&self) -> bool {
        self.deck.as_ref().is_some_and(Deck::is_done)
    }

    fn close(&mut self) {
        self.unload();
        self.tap.clear();
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.unload();
    }
}
