use std::path::{Path, PathBuf};

/// A playable item. `path` is a filesystem path or a stream URL handed to the decoder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Track {
    pub path: PathBuf,
    pub title: String,
    pub artist: String,
}

impl Track {
    /// Build a track from a file name of the form `Artist - Title.ext`.
    ///
    /// Without a `" - "` separator the whole stem becomes the title.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();

        match stem.split_once(" - ") {
            Some((artist, title)) => Self {
                path: path.to_path_buf(),
                title: title.trim().to_string(),
                artist: artist.trim().to_string(),
            },
            None => Self {
                path: path.to_path_buf(),
                title: stem.to_string(),
                artist: String::new(),
            },
        }
    }

    pub fn display_name(&self) -> String {
        if self.artist.is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", self.artist, self.title)
        }
    }
}
