//! Application module: the model driven by the event loop and drawn by the UI.
//!
//! `app::model` holds the playlist, cursor, focus and search state;
//! `app::transport` maps user intents onto a [`crate::audio::Playback`].

mod model;
mod transport;

pub use model::*;

#[cfg(test)]
pub(crate) mod testing;
