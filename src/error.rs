//! Error types shared by the audio pipeline and playlist providers.

use thiserror::Error;

/// Failures of the external decoder and of the decoded PCM stream.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The decoder executable is not on `PATH`.
    #[error("{program} is required to play {ext} files, install it with your package manager")]
    DependencyMissing { program: String, ext: String },
    /// The decoder ran but errored or produced nothing playable.
    #[error("decode failed: {0}")]
    DecodeFailed(String),
    /// A seek target past the end of the stream.
    #[error("seek position {pos} out of range [0, {len}]")]
    OutOfRange { pos: usize, len: usize },
}

/// Errors surfaced by the playback engine.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("audio output: {0}")]
    Output(#[from] rodio::StreamError),
}

/// Errors returned by playlist providers.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ProviderError {
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}
