//! Playlist engine: track order, shuffle, repeat and the play-next queue.
//!
//! The engine only decides *what* plays next. Loading and playing the chosen
//! track is the caller's job.

mod engine;
mod provider;

pub use engine::{Playlist, RepeatMode};
pub use provider::{PlaylistInfo, Provider};
