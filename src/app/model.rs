//! Application model: playlist, cursor, focus, search and visualizer state.

use crate::audio::{EQ_BANDS, PRESETS};
use crate::config::{ControlsSettings, Settings};
use crate::playlist::Playlist;
use crate::spectrum::{SpectrumAnalyzer, SpectrumConfig};

/// Which panel receives directional keys.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Playlist,
    Eq,
}

/// Incremental search over the playlist.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Search {
    pub query: String,
    /// Matching track indices, in playlist order.
    pub results: Vec<usize>,
    /// Index into `results`.
    pub cursor: usize,
}

/// The main application model.
#[derive(Debug)]
pub struct App {
    pub playlist: Playlist,
    pub analyzer: SpectrumAnalyzer,
    pub controls: ControlsSettings,

    /// Highlighted row in the playlist panel (a track index).
    pub cursor: usize,
    /// First visible playlist row.
    pub scroll: usize,
    /// Playlist rows that fit on screen, updated by the renderer.
    pub visible_rows: usize,

    pub focus: Focus,
    pub eq_cursor: usize,
    /// Active preset, `None` once a band was edited by hand.
    pub preset: Option<usize>,

    pub search: Option<Search>,
    pub error: Option<String>,
    pub quitting: bool,
}

impl App {
    pub fn new(playlist: Playlist, settings: &Settings) -> Self {
        let analyzer = SpectrumAnalyzer::new(SpectrumConfig {
            sample_rate: settings.audio.sample_rate,
            ..SpectrumConfig::default()
        });

        Self {
            playlist,
            analyzer,
            controls: settings.controls.clone(),
            cursor: 0,
            scroll: 0,
            visible_rows: 10,
            focus: Focus::Playlist,
            eq_cursor: 0,
            preset: None,
            search: None,
            error: None,
            quitting: false,
        }
    }

    /// Name shown next to the EQ and saved to the config.
    pub fn preset_name(&self) -> &'static str {
        self.preset
            .and_then(|i| PRESETS.get(i))
            .map_or("Custom", |p| p.name)
    }

    /// Current smoothed spectrum levels.
    pub fn levels(&self) -> &[f64] {
        self.analyzer.levels()
    }

    pub fn has_tracks(&self) -> bool {
        !self.playlist.is_empty()
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Playlist => Focus::Eq,
            Focus::Eq => Focus::Playlist,
        };
    }

    /// Move the playlist cursor by `delta` rows, clamped to the list.
    pub fn move_cursor(&mut self, delta: isize) {
        if self.playlist.is_empty() {
            return;
        }
        let last = self.playlist.len() - 1;
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
        self.adjust_scroll();
    }

    /// Put the cursor on `index` and scroll it into view.
    pub fn select(&mut self, index: usize) {
        if index < self.playlist.len() {
            self.cursor = index;
            self.adjust_scroll();
        }
    }

    /// Keep the cursor inside the visible window.
    pub fn adjust_scroll(&mut self) {
        let rows = self.visible_rows.max(1);
        if self.cursor < self.scroll {
            self.scroll = self.cursor;
        }
        if self.cursor >= self.scroll + rows {
            self.scroll = self.cursor + 1 - rows;
        }
    }

    pub fn move_eq_cursor(&mut self, delta: isize) {
        self.eq_cursor = self.eq_cursor.saturating_add_signed(delta).min(EQ_BANDS - 1);
    }

    /// Queue the highlighted track, or take it off the queue if already there.
    pub fn toggle_queue_selected(&mut self) {
        if !self.playlist.dequeue(self.cursor) {
            self.playlist.queue(self.cursor);
        }
    }

    pub fn start_search(&mut self) {
        self.search = Some(Search::default());
    }

    pub fn cancel_search(&mut self) {
        self.search = None;
    }

    pub fn push_search_char(&mut self, c: char) {
        if let Some(search) = &mut self.search {
            search.query.push(c);
        }
        self.update_search();
    }

    pub fn pop_search_char(&mut self) {
        if let Some(search) = &mut self.search {
            search.query.pop();
        }
        self.update_search();
    }

    pub fn move_search_cursor(&mut self, delta: isize) {
        if let Some(search) = &mut self.search {
            let last = search.results.len().saturating_sub(1);
            search.cursor = search.cursor.saturating_add_signed(delta).min(last);
        }
    }

    /// Track index under the search cursor.
    pub fn search_selection(&self) -> Option<usize> {
        let search = self.search.as_ref()?;
        search.results.get(search.cursor).copied()
    }

    fn update_search(&mut self) {
        let Some(search) = &mut self.search else {
            return;
        };
        search.cursor = 0;
        search.results.clear();
        if search.query.is_empty() {
            return;
        }
        search.results = self
            .playlist
            .tracks()
            .iter()
            .enumerate()
            .filter(|(_, t)| fuzzy_match_positions(&t.display_name(), &search.query).is_some())
            .map(|(i, _)| i)
            .collect();
    }
}

/// Fuzzy/subsequence match: return the character positions in `title`
/// that match `query` (ignoring ASCII case), or `None` if not matched.
pub fn fuzzy_match_positions(title: &str, query: &str) -> Option<Vec<usize>> {
    if query.is_empty() {
        return Some(Vec::new());
    }

    let mut positions: Vec<usize> = Vec::new();
    let mut title_iter = title.chars().enumerate();

    for qc in query.chars() {
        let qc_low = qc.to_ascii_lowercase();
        loop {
            match title_iter.next() {
                Some((ti, tc)) if tc.to_ascii_lowercase() == qc_low => {
                    positions.push(ti);
                    break;
                }
                Some(_) => continue,
                None => return None,
            }
        }
    }

    Some(positions)
}
