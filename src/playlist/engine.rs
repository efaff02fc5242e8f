use std::collections::VecDeque;
use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::config::RepeatSetting;
use crate::error::ProviderError;
use crate::library::Track;

use super::provider::Provider;

/// What happens when the end of the order (or the current track) is reached.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum RepeatMode {
    #[default]
    Off,
    All,
    One,
}

impl RepeatMode {
    /// `Off -> All -> One -> Off`.
    pub fn cycle(self) -> Self {
        match self {
            Self::Off => Self::All,
            Self::All => Self::One,
            Self::One => Self::Off,
        }
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Off => "Off",
            Self::All => "All",
            Self::One => "One",
        })
    }
}

impl From<RepeatSetting> for RepeatMode {
    fn from(s: RepeatSetting) -> Self {
        match s {
            RepeatSetting::Off => Self::Off,
            RepeatSetting::All => Self::All,
            RepeatSetting::One => Self::One,
        }
    }
}

impl From<RepeatMode> for RepeatSetting {
    fn from(m: RepeatMode) -> Self {
        match m {
            RepeatMode::Off => Self::Off,
            RepeatMode::All => Self::All,
            RepeatMode::One => Self::One,
        }
    }
}

/// Where the current track came from.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
enum PlaybackSource {
    #[default]
    Order,
    /// Popped off the play-next queue; holds the track index.
    Queue(usize),
}

/// Ordered track list with shuffle, repeat and a play-next queue.
///
/// `tracks` is append-only so track indices stay valid for the whole
/// session. `order` is always a permutation of `0..tracks.len()` and `pos`
/// indexes into it.
#[derive(Debug)]
pub struct Playlist {
    tracks: Vec<Track>,
    order: Vec<usize>,
    pos: usize,
    queue: VecDeque<usize>,
    source: PlaybackSource,
    shuffle: bool,
    repeat: RepeatMode,
    rng: StdRng,
}

impl Default for Playlist {
    fn default() -> Self {
        Self::new()
    }
}

impl Playlist {
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// A playlist whose shuffles are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            tracks: Vec::new(),
            order: Vec::new(),
            pos: 0,
            queue: VecDeque::new(),
            source: PlaybackSource::Order,
            shuffle: false,
            repeat: RepeatMode::Off,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Append tracks. New indices go to the end of the order, even when
    /// shuffled.
    pub fn add(&mut self, tracks: impl IntoIterator<Item = Track>) {
        let start = self.tracks.len();
        self.tracks.extend(tracks);
        self.order.extend(start..self.tracks.len());
    }

    /// Fetch a provider playlist and append its tracks. Returns how many were
    /// added.
    pub fn add_from_provider(
        &mut self,
        provider: &dyn Provider,
        playlist_id: &str,
    ) -> Result<usize, ProviderError> {
        let tracks = provider.tracks(playlist_id)?;
        let added = tracks.len();
        self.add(tracks);
        debug!(provider = provider.name(), playlist_id, added, "added provider tracks");
        Ok(added)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Track indices in play order.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Index of the current track, queue-aware.
    pub fn index(&self) -> Option<usize> {
        match self.source {
            PlaybackSource::Queue(i) => Some(i),
            PlaybackSource::Order => self.order.get(self.pos).copied(),
        }
    }

    pub fn current(&self) -> Option<(usize, &Track)> {
        let i = self.index()?;
        self.tracks.get(i).map(|t| (i, t))
    }

    /// Advance and return the track to play, or `None` at the end of the
    /// order with repeat off.
    pub fn next(&mut self) -> Option<&Track> {
        if self.tracks.is_empty() {
            return None;
        }
        if let Some(i) = self.queue.pop_front() {
            self.source = PlaybackSource::Queue(i);
            return self.tracks.get(i);
        }

        self.source = PlaybackSource::Order;
        if self.repeat == RepeatMode::One {
            return self.order_track();
        }
        if self.pos + 1 < self.order.len() {
            self.pos += 1;
            return self.order_track();
        }
        if self.repeat == RepeatMode::All {
            if self.shuffle {
                self.order.shuffle(&mut self.rng);
            }
            self.pos = 0;
            return self.order_track();
        }
        None
    }

    /// Step back. At the first position this wraps with repeat all, and
    /// otherwise stays on (restarts) the current track.
    pub fn prev(&mut self) -> Option<&Track> {
        self.source = PlaybackSource::Order;
        if self.order.is_empty() {
            return None;
        }
        if self.pos > 0 {
            self.pos -= 1;
        } else if self.repeat == RepeatMode::All {
            self.pos = self.order.len() - 1;
        }
        self.order_track()
    }

    /// Make track `index` current. No-op for an unknown index.
    pub fn set_index(&mut self, index: usize) {
        self.source = PlaybackSource::Order;
        if let Some(pos) = self.order.iter().position(|&i| i == index) {
            self.pos = pos;
        }
    }

    /// Append a track to the play-next queue.
    pub fn queue(&mut self, index: usize) {
        if index < self.tracks.len() {
            self.queue.push_back(index);
        }
    }

    /// Remove the first queued occurrence of `index`.
    pub fn dequeue(&mut self, index: usize) -> bool {
        match self.queue.iter().position(|&i| i == index) {
            Some(at) => {
                self.queue.remove(at);
                true
            }
            None => false,
        }
    }

    /// 1-based position of `index` in the queue, 0 when not queued.
    pub fn queue_position(&self, index: usize) -> usize {
        self.queue
            .iter()
            .position(|&i| i == index)
            .map_or(0, |p| p + 1)
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Flip shuffle. Turning it on pins the current track at the head of a
    /// freshly shuffled order; turning it off restores ascending order while
    /// keeping the current track current.
    pub fn toggle_shuffle(&mut self) {
        self.shuffle = !self.shuffle;
        let Some(current) = self.index() else {
            return;
        };

        if self.shuffle {
            let mut rest: Vec<usize> = (0..self.tracks.len()).filter(|&i| i != current).collect();
            rest.shuffle(&mut self.rng);
            self.order.clear();
            self.order.push(current);
            self.order.extend(rest);
            self.pos = 0;
        } else {
            self.order = (0..self.tracks.len()).collect();
            self.pos = current;
        }
        debug!(shuffle = self.shuffle, current, "toggled shuffle");
    }

    pub fn shuffled(&self) -> bool {
        self.shuffle
    }

    pub fn cycle_repeat(&mut self) {
        self.repeat = self.repeat.cycle();
    }

    pub fn set_repeat(&mut self, mode: RepeatMode) {
        self.repeat = mode;
    }

    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    fn order_track(&self) -> Option<&Track> {
        self.order.get(self.pos).and_then(|&i| self.tracks.get(i))
    }
}
