//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};

use crate::app::{App, Focus, fuzzy_match_positions};
use crate::audio::{EQ_FREQS, MAX_VOLUME_DB, MIN_VOLUME_DB, Playback, PlaybackState};

const CONTROLS: [(&str, &str); 14] = [
    ("space", "play/pause"),
    ("s", "stop"),
    ("</>", "prev/next"),
    ("←/→", "seek"),
    ("j/k", "up/down"),
    ("enter", "play selected"),
    ("+/-", "volume"),
    ("tab", "focus EQ"),
    ("e", "preset"),
    ("a", "queue"),
    ("r", "repeat"),
    ("z", "shuffle"),
    ("/", "search"),
    ("q", "quit"),
];

/// Render the controls help text.
fn controls_text() -> String {
    CONTROLS
        .iter()
        .map(|(k, v)| format!("[{k}] {v}"))
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn format_freq(hz: f64) -> String {
    if hz >= 1000.0 {
        format!("{}k", hz / 1000.0)
    } else {
        format!("{hz}")
    }
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn padded(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 1,
            top: 0,
            bottom: 0,
        })
}

/// Render the entire UI into `frame`. Records how many playlist rows fit so
/// the cursor can be kept in view.
pub fn draw<P: Playback + ?Sized>(frame: &mut Frame, app: &mut App, player: &P) {
    let error_height = if app.error.is_some() { 1 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(9),
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(3),
            Constraint::Length(error_height),
            Constraint::Length(4),
        ])
        .split(frame.area());

    draw_now_playing(frame, chunks[0], app, player);
    draw_spectrum(frame, chunks[1], app);
    draw_seek(frame, chunks[2], player);
    draw_controls(frame, chunks[3], app, player);

    app.visible_rows = chunks[4].height.saturating_sub(2).max(1) as usize;
    app.adjust_scroll();
    draw_playlist(frame, chunks[4], app);

    if let Some(err) = &app.error {
        let line = Paragraph::new(format!("ERR: {err}")).style(Style::default().fg(Color::Red));
        frame.render_widget(line, chunks[5]);
    }

    let footer = Paragraph::new(controls_text())
        .block(padded(" keys "))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[6]);

    if app.search.is_some() {
        draw_search(frame, chunks[4], app);
    }
}

fn draw_now_playing<P: Playback + ?Sized>(frame: &mut Frame, area: Rect, app: &App, player: &P) {
    let name = app
        .playlist
        .current()
        .map(|(_, t)| t.display_name())
        .unwrap_or_else(|| "No track loaded".to_string());

    let state = match player.state() {
        PlaybackState::Playing => "▶ Playing",
        PlaybackState::Paused => "⏸ Paused",
        PlaybackState::Stopped => "■ Stopped",
    };
    let status = format!(
        "{state}  {} / {}",
        format_mmss(player.position()),
        format_mmss(player.duration())
    );

    let text = vec![
        Line::from(Span::styled(name, Style::default().add_modifier(Modifier::BOLD))),
        Line::from(status),
    ];
    let par = Paragraph::new(text).block(padded(" specamp ").title_alignment(Alignment::Center));
    frame.render_widget(par, area);
}

fn draw_spectrum(frame: &mut Frame, area: Rect, app: &App) {
    let edges = &app.analyzer.config().edges;
    let bars: Vec<Bar> = app
        .levels()
        .iter()
        .enumerate()
        .map(|(i, level)| {
            let value = (level.clamp(0.0, 1.0) * 100.0).round() as u64;
            let color = if *level >= 0.6 {
                Color::Red
            } else if *level >= 0.3 {
                Color::Yellow
            } else {
                Color::Green
            };
            Bar::default()
                .value(value)
                .text_value(String::new())
                .label(Line::from(edges.get(i).map(|hz| format_freq(*hz)).unwrap_or_default()))
                .style(Style::default().fg(color))
        })
        .collect();

    let inner_width = area.width.saturating_sub(2);
    let count = bars.len().max(1) as u16;
    let bar_width = (inner_width / count).saturating_sub(1).max(1);

    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(" spectrum "))
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1)
        .max(100);
    frame.render_widget(chart, area);
}

fn draw_seek<P: Playback + ?Sized>(frame: &mut Frame, area: Rect, player: &P) {
    let total = player.duration().as_secs_f64();
    let ratio = if total > 0.0 {
        (player.position().as_secs_f64() / total).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(ratio)
        .label(format!(
            "{} / {}",
            format_mmss(player.position()),
            format_mmss(player.duration())
        ));
    frame.render_widget(gauge, area);
}

fn draw_controls<P: Playback + ?Sized>(frame: &mut Frame, area: Rect, app: &App, player: &P) {
    let volume = player.volume();
    let filled = ((volume - MIN_VOLUME_DB) / (MAX_VOLUME_DB - MIN_VOLUME_DB) * 20.0).round() as usize;
    let vol_line = Line::from(vec![
        Span::raw("VOL "),
        Span::styled("█".repeat(filled.min(20)), Style::default().fg(Color::Green)),
        Span::raw("░".repeat(20 - filled.min(20))),
        Span::raw(format!(" {volume:+.1} dB")),
    ]);

    let mut eq_spans = vec![Span::raw("EQ  ")];
    for (band, gain) in player.eq_bands().iter().enumerate() {
        let text = format!("{}:{:+.0} ", format_freq(EQ_FREQS[band]), gain);
        let style = if app.focus == Focus::Eq && band == app.eq_cursor {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        eq_spans.push(Span::styled(text, style));
    }
    eq_spans.push(Span::styled(
        format!("[{}]", app.preset_name()),
        Style::default().fg(Color::DarkGray),
    ));

    let title = if app.focus == Focus::Eq { " controls (EQ) " } else { " controls " };
    let par = Paragraph::new(vec![vol_line, Line::from(eq_spans)])
        .block(padded(title))
        .wrap(Wrap { trim: true });
    frame.render_widget(par, area);
}

fn draw_playlist(frame: &mut Frame, area: Rect, app: &App) {
    let current = app.playlist.index();
    let total = app.playlist.len();
    let start = app.scroll.min(total);
    let end = (start + app.visible_rows).min(total);

    let items: Vec<ListItem> = (start..end)
        .filter_map(|i| app.playlist.track(i).map(|t| (i, t)))
        .map(|(i, track)| {
            let marker = if Some(i) == current { "▶ " } else { "  " };
            let queued = match app.playlist.queue_position(i) {
                0 => String::new(),
                n => format!(" [Q{n}]"),
            };
            ListItem::new(format!("{marker}{:>3}. {}{queued}", i + 1, track.display_name()))
        })
        .collect();

    let title = format!(
        " playlist ({}) • repeat: {} • shuffle: {} • queued: {} ",
        total,
        app.playlist.repeat(),
        if app.playlist.shuffled() { "on" } else { "off" },
        app.playlist.queue_len()
    );
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    if total > 0 && app.focus == Focus::Playlist {
        state.select(Some(app.cursor.saturating_sub(start)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_search(frame: &mut Frame, area: Rect, app: &App) {
    let Some(search) = &app.search else {
        return;
    };
    let popup = centered_rect_sized(72, 12, area);
    frame.render_widget(Clear, popup);

    let items: Vec<ListItem> = search
        .results
        .iter()
        .filter_map(|&i| app.playlist.track(i))
        .map(|track| {
            let title = track.display_name();
            let Some(positions) = fuzzy_match_positions(&title, &search.query) else {
                return ListItem::new(title);
            };
            // Upper-case the matched characters.
            let mut rendered = String::new();
            let mut pos_iter = positions.into_iter();
            let mut next_pos = pos_iter.next();
            for (ci, ch) in title.chars().enumerate() {
                if next_pos == Some(ci) {
                    rendered.extend(ch.to_uppercase());
                    next_pos = pos_iter.next();
                } else {
                    rendered.push(ch);
                }
            }
            ListItem::new(rendered)
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" search: {}_ ", search.query)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !search.results.is_empty() {
        state.select(Some(search.cursor));
    }
    frame.render_stateful_widget(list, popup, &mut state);
}
