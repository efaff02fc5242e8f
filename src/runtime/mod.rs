use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use crate::app::App;
use crate::audio::{Playback, Player};
use crate::config::RepeatSetting;
use crate::library::Track;
use crate::playlist::Playlist;
use crate::spectrum::SpectrumConfig;

mod event_loop;
mod logging;
mod settings;
mod startup;
mod terminal;

#[derive(Parser, Debug)]
#[command(author, version, about = "Terminal music player with a live spectrum analyzer", long_about = None)]
pub struct Cli {
    /// Audio files or directories to play.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
    /// Start with shuffle enabled.
    #[arg(short, long)]
    pub shuffle: bool,
    /// Repeat mode for this session (overrides the config).
    #[arg(short, long, value_enum)]
    pub repeat: Option<RepeatSetting>,
}

pub fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    logging::init();

    let (mut settings, writable) = settings::load_settings();
    if cli.shuffle {
        settings.playback.shuffle = true;
    }
    if let Some(repeat) = cli.repeat {
        settings.playback.repeat = repeat;
    }

    let files = startup::collect_files(&cli.paths, &settings.library)?;
    if files.is_empty() {
        return Err(format!(
            "no playable files found (supported: {})",
            settings.library.extensions.join(", ")
        )
        .into());
    }
    info!(tracks = files.len(), "starting");

    let mut playlist = Playlist::new();
    playlist.add(files.iter().map(Track::from_path));

    let mut player = Player::new(&settings.audio, SpectrumConfig::default().window)?;
    let mut app = App::new(playlist, &settings);
    startup::apply_playback_defaults(&mut app, &mut player, &settings);

    let mut terminal = terminal::setup()?;
    let run_result = event_loop::run(&mut terminal, &settings, &mut app, &mut player);
    let restored = terminal::restore(&mut terminal);

    startup::store_session(&mut settings, &app, &player);
    player.close();
    settings::save_settings(&settings, writable);

    run_result?;
    Ok(restored?)
}
