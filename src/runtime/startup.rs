use std::error::Error;
use std::path::PathBuf;

use tracing::warn;

use crate::app::App;
use crate::audio::{Playback, find_preset};
use crate::config::{LibrarySettings, Settings};
use crate::library::collect_audio_files;

/// Expand command-line paths into playable files, keeping argument order.
pub fn collect_files(
    paths: &[PathBuf],
    library: &LibrarySettings,
) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut files = Vec::new();
    for path in paths {
        let found = collect_audio_files(path, library)
            .map_err(|e| format!("scanning {}: {e}", path.display()))?;
        files.extend(found);
    }
    Ok(files)
}

/// Apply configured volume, EQ (or a named preset), repeat and shuffle.
pub fn apply_playback_defaults<P: Playback + ?Sized>(
    app: &mut App,
    player: &mut P,
    settings: &Settings,
) {
    player.set_volume(settings.audio.volume_db);

    let name = settings.audio.eq_preset.trim();
    let named = !name.is_empty() && !name.eq_ignore_ascii_case("custom");
    match find_preset(name).filter(|_| named) {
        Some((index, _)) => app.apply_preset(player, index),
        None => {
            if named {
                warn!(preset = name, "unknown EQ preset, using configured gains");
            }
            for (band, gain) in settings.audio.eq.iter().enumerate() {
                player.set_eq_band(band, *gain);
            }
        }
    }

    app.playlist.set_repeat(settings.playback.repeat.into());
    if settings.playback.shuffle && !app.playlist.shuffled() {
        app.playlist.toggle_shuffle();
    }
}

/// Copy the session's volume, EQ, repeat and shuffle back into `settings`.
pub fn store_session<P: Playback + ?Sized>(settings: &mut Settings, app: &App, player: &P) {
    settings.audio.volume_db = player.volume();
    settings.audio.eq = player.eq_bands();
    settings.audio.eq_preset = app.preset_name().to_string();
    settings.playback.repeat = app.playlist.repeat().into();
    settings.playback.shuffle = app.playlist.shuffled();
}
