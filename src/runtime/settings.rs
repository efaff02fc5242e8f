use tracing::warn;

use crate::config;

/// Load settings, falling back to defaults when the file cannot be read or
/// fails validation.
///
/// The flag is `false` after a fallback: the session must not be written back
/// over a config file that was never applied.
pub fn load_settings() -> (config::Settings, bool) {
    match config::Settings::load() {
        Ok(s) => {
            if let Err(msg) = s.validate() {
                warn!(%msg, "invalid config");
                eprintln!("specamp: invalid config, using defaults: {msg}");
                (config::Settings::default(), false)
            } else {
                (s, true)
            }
        }
        Err(e) => {
            // Config is optional; failures should not prevent the app from starting.
            warn!(error = %e, "failed to load config");
            eprintln!("specamp: failed to load config, using defaults: {e}");
            (config::Settings::default(), false)
        }
    }
}

/// Persist the session's settings unless they came from a fallback.
pub fn save_settings(settings: &config::Settings, writable: bool) {
    if !writable {
        warn!("config was not loaded, leaving the file untouched");
        return;
    }
    if let Err(e) = settings.save() {
        warn!(error = %e, "failed to save config");
        eprintln!("specamp: failed to save config: {e}");
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::config::test_env::{EnvGuard, env_lock};

    #[test]
    fn invalid_config_is_left_untouched_on_quit() {
        let _lock = env_lock();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let body = "[audio]\ndecoder = \"avconv\"\nsample_rate = 0\nvolume_db = -12\n";
        fs::write(&path, body).unwrap();
        let _g = EnvGuard::set("SPECAMP_CONFIG_PATH", path.to_str().unwrap());

        let (mut settings, writable) = load_settings();
        assert!(!writable);
        assert_eq!(settings.audio.decoder, "ffmpeg");

        settings.audio.volume_db = -3.0;
        save_settings(&settings, writable);
        assert_eq!(fs::read_to_string(&path).unwrap(), body);
    }

    #[test]
    fn unparsable_config_is_left_untouched_on_quit() {
        let _lock = env_lock();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let body = "[audio\ndecoder = \"avconv\"\n";
        fs::write(&path, body).unwrap();
        let _g = EnvGuard::set("SPECAMP_CONFIG_PATH", path.to_str().unwrap());

        let (settings, writable) = load_settings();
        assert!(!writable);
        save_settings(&settings, writable);
        assert_eq!(fs::read_to_string(&path).unwrap(), body);
    }

    #[test]
    fn valid_config_keeps_user_sections_when_saved() {
        let _lock = env_lock();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[audio]\ndecoder = \"avconv\"\n\n[controls]\nseek_seconds = 9\n").unwrap();
        let _g = EnvGuard::set("SPECAMP_CONFIG_PATH", path.to_str().unwrap());

        let (mut settings, writable) = load_settings();
        assert!(writable);
        settings.audio.volume_db = -3.0;
        save_settings(&settings, writable);

        let (reloaded, _) = load_settings();
        assert_eq!(reloaded.audio.decoder, "avconv");
        assert_eq!(reloaded.controls.seek_seconds, 9);
        assert_eq!(reloaded.audio.volume_db, -3.0);
    }
}
