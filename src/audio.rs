//! Audio pipeline: external decoding, volume and EQ stages, the sample tap
//! feeding the visualizer, and the `rodio`-backed player.

mod deck;
mod decode;
mod eq;
mod frames;
mod player;
mod tap;
mod types;
mod volume;

pub use eq::{EQ_BANDS, EQ_FREQS, PRESETS, find_preset};
pub use player::Player;
pub use types::{Playback, PlaybackState};
pub use volume::{MAX_VOLUME_DB, MIN_VOLUME_DB};

#[cfg(test)]
mod tests;
