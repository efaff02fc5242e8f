use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::debug;

use crate::app::{App, Focus};
use crate::audio::Playback;
use crate::config;
use crate::ui;

use super::terminal::Tui;

/// Main terminal event loop: draws, dispatches keys and ticks playback on a
/// fixed interval. Returns `Ok(())` when the user quits.
pub fn run<P: Playback>(
    terminal: &mut Tui,
    settings: &config::Settings,
    app: &mut App,
    player: &mut P,
) -> Result<(), Box<dyn std::error::Error>> {
    let tick = Duration::from_millis(settings.ui.tick_ms.max(1));
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui::draw(f, app, &*player))?;

        let timeout = tick.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key_event(key, app, player);
                }
            }
        }
        if app.quitting {
            debug!("quit requested");
            return Ok(());
        }

        if last_tick.elapsed() >= tick {
            app.tick(player);
            last_tick = Instant::now();
        }
    }
}

pub fn handle_key_event<P: Playback + ?Sized>(key: KeyEvent, app: &mut App, player: &mut P) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quitting = true;
        return;
    }

    if app.search.is_some() {
        match key.code {
            KeyCode::Esc => app.cancel_search(),
            KeyCode::Enter => app.commit_search(player),
            KeyCode::Up => app.move_search_cursor(-1),
            KeyCode::Down => app.move_search_cursor(1),
            KeyCode::Backspace => app.pop_search_char(),
            KeyCode::Char(c) if !c.is_control() => app.push_search_char(c),
            _ => {}
        }
        return;
    }

    let eq_focus = app.focus == Focus::Eq;
    match key.code {
        KeyCode::Char('q') => app.quitting = true,
        KeyCode::Char(' ') => app.toggle_play(player),
        KeyCode::Char('s') => app.stop(player),
        KeyCode::Char('>') | KeyCode::Char('.') => app.next_track(player),
        KeyCode::Char('<') | KeyCode::Char(',') => app.prev_track(player),
        KeyCode::Left if eq_focus => app.move_eq_cursor(-1),
        KeyCode::Right if eq_focus => app.move_eq_cursor(1),
        KeyCode::Left => app.seek(player, false),
        KeyCode::Right => app.seek(player, true),
        KeyCode::Up | KeyCode::Char('k') if eq_focus => app.change_eq_band(player, true),
        KeyCode::Down | KeyCode::Char('j') if eq_focus => app.change_eq_band(player, false),
        KeyCode::Up | KeyCode::Char('k') => app.move_cursor(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_cursor(1),
        KeyCode::Enter if !eq_focus => app.play_selected(player),
        KeyCode::Char('+') | KeyCode::Char('=') => app.change_volume(player, true),
        KeyCode::Char('-') => app.change_volume(player, false),
        KeyCode::Char('r') => app.playlist.cycle_repeat(),
        KeyCode::Char('z') => app.playlist.toggle_shuffle(),
        KeyCode::Tab => app.toggle_focus(),
        KeyCode::Char('h') if eq_focus => app.move_eq_cursor(-1),
        KeyCode::Char('l') if eq_focus => app.move_eq_cursor(1),
        KeyCode::Char('e') => app.next_preset(player),
        KeyCode::Char('a') if !eq_focus => app.toggle_queue_selected(),
        KeyCode::Char('/') => app.start_search(),
        _ => {}
    }
}
