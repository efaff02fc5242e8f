use serde::{Deserialize, Serialize};

use crate::audio::EQ_BANDS;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/specamp/config.toml` or `~/.config/specamp/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `SPECAMP__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub playback: PlaybackSettings,
    pub controls: ControlsSettings,
    pub ui: UiSettings,
    pub library: LibrarySettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AudioSettings {
    /// External decoder executable, looked up on `PATH`.
    pub decoder: String,
    /// Rate every track is decoded to (Hz).
    pub sample_rate: u32,
    /// Output gain in dB, clamped to [-30, 6].
    pub volume_db: f64,
    /// Per-band EQ gains in dB, clamped to [-12, 12].
    /// Bands: 70Hz, 180Hz, 320Hz, 600Hz, 1kHz, 3kHz, 6kHz, 12kHz, 14kHz, 16kHz
    pub eq: [f64; EQ_BANDS],
    /// Preset name applied at startup. Empty or "Custom" uses `eq`.
    pub eq_preset: String,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            decoder: "ffmpeg".to_string(),
            sample_rate: 44_100,
            volume_db: 0.0,
            eq: [0.0; EQ_BANDS],
            eq_preset: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Whether shuffle starts enabled.
    pub shuffle: bool,
    /// Default repeat mode.
    pub repeat: RepeatSetting,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RepeatSetting {
    #[default]
    #[serde(alias = "no-loop", alias = "none")]
    Off,
    #[serde(alias = "loop-all", alias = "loop_all", alias = "loop-around")]
    All,
    #[serde(alias = "loop-one", alias = "loop_one", alias = "repeat-one")]
    One,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Seconds to seek when pressing left / right.
    pub seek_seconds: u64,
    /// Volume change per keypress (dB).
    pub volume_step_db: f64,
    /// EQ gain change per keypress (dB).
    pub eq_step_db: f64,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            seek_seconds: 5,
            volume_step_db: 1.0,
            eq_step_db: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UiSettings {
    /// Redraw / spectrum refresh interval in milliseconds.
    pub tick_ms: u64,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self { tick_ms: 50 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks while walking directories.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: vec!["mp3".into(), "flac".into(), "wav".into(), "ogg".into()],
            follow_links: true,
            include_hidden: true,
        }
    }
}
