use crate::error::ProviderError;
use crate::library::Track;

/// Summary of a playlist offered by a [`Provider`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistInfo {
    pub id: String,
    pub name: String,
    pub track_count: usize,
}

/// A source of playlists beyond the local filesystem.
///
/// Returned tracks carry whatever the decoder can open: a local path or a
/// stream URL.
pub trait Provider {
    fn name(&self) -> &str;

    fn playlists(&self) -> Result<Vec<PlaylistInfo>, ProviderError>;

    fn tracks(&self, playlist_id: &str) -> Result<Vec<Track>, ProviderError>;
}
