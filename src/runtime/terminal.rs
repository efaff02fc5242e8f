use std::io::{self, Stdout};

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Switch to raw mode and the alternate screen. If any step after raw mode
/// fails the shell is handed back in its normal state.
pub fn setup() -> io::Result<Tui> {
    enable_raw_mode()?;
    undo_on_error(enter_screen, || {
        let _ = leave();
    })
}

/// Undo [`setup`].
pub fn restore(terminal: &mut Tui) -> io::Result<()> {
    leave()?;
    terminal.show_cursor()
}

fn enter_screen() -> io::Result<Tui> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

fn leave() -> io::Result<()> {
    let raw = disable_raw_mode();
    execute!(io::stdout(), LeaveAlternateScreen)?;
    raw
}

fn undo_on_error<T>(step: impl FnOnce() -> io::Result<T>, undo: impl FnOnce()) -> io::Result<T> {
    let result = step();
    if result.is_err() {
        undo();
    }
    result
}
