//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

use crate::app::{App, LoadState};
use crate::audio::PlaybackInfo;
use crate::catalog::Track;
use crate::config::{ControlsSettings, UiSettings};
use crate::gateway::GatewayResolver;

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("j/k".to_string(), "up/down".to_string());
    map.insert("gg/G".to_string(), "top/bottom".to_string());
    map.insert("enter".to_string(), "play selected track".to_string());
    map.insert("space/p".to_string(), "play/pause".to_string());
    map.insert("h/l".to_string(), "prev/next track".to_string());
    // H/L and +/- are filled dynamically from config.
    map.insert("/".to_string(), "search".to_string());
    map.insert("K".to_string(), "metadata".to_string());
    map.insert("q".to_string(), "quit".to_string());
    map
});

/// Render the controls help text, incorporating seek and volume steps.
fn controls_text(controls: &ControlsSettings) -> String {
    let order = [
        "j/k", "h/l", "H/L", "+/-", "enter", "space/p", "gg/G", "K", "/", "q",
    ];
    order
        .iter()
        .filter_map(|k| match *k {
            "H/L" => Some(format!("[H/L] seek -/+{}s", controls.seek_seconds)),
            "+/-" => Some(format!(
                "[+/-] volume +/-{}%",
                (controls.volume_step * 100.0).round() as i64
            )),
            _ => CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v)),
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `m:ss`.
fn format_mss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// `m:ss`, or `--:--` when the length is unknown.
fn format_length(d: Option<Duration>) -> String {
    d.map(format_mss).unwrap_or_else(|| "--:--".to_string())
}

/// Fraction of `total` covered by `elapsed`, bounded to `[0, 1]`.
fn progress_ratio(elapsed: Duration, total: Option<Duration>) -> f64 {
    match total {
        Some(t) if !t.is_zero() => (elapsed.as_secs_f64() / t.as_secs_f64()).clamp(0.0, 1.0),
        _ => 0.0,
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

fn left_padded() -> Padding {
    Padding {
        left: 1,
        right: 0,
        top: 0,
        bottom: 0,
    }
}

/// Gateway URL for `locator`, or `-` when it does not resolve.
fn resolved_or_dash(gateway: &GatewayResolver, locator: Option<&str>) -> String {
    match gateway.resolve(locator) {
        url if url.is_empty() => "-".to_string(),
        url => url,
    }
}

fn metadata_text(track: &Track, gateway: &GatewayResolver) -> String {
    let or_dash = |v: Option<&str>| v.filter(|s| !s.is_empty()).unwrap_or("-").to_string();
    let size = track
        .file_size_bytes
        .map(|b| format!("{:.1} MB", b as f64 / 1_048_576.0))
        .unwrap_or_else(|| "-".to_string());

    format!(
        "Title: {}\nArtist: {}\nDuration: {}\nToken: {} #{}\nArtist address: {}\nType: {}  Size: {}\nMinted: {}  Added: {}\nAudio: {}\nArtwork: {}\n\n{}",
        track.title,
        track.artist,
        format_length(track.duration_hint),
        or_dash(track.contract_address.as_deref()),
        or_dash(track.token_id.as_deref()),
        or_dash(track.artist_address.as_deref()),
        or_dash(track.mime_type.as_deref()),
        size,
        or_dash(track.minted_at.as_deref()),
        or_dash(track.inserted_at.as_deref()),
        resolved_or_dash(gateway, Some(track.audio_uri.as_str())),
        resolved_or_dash(gateway, track.thumbnail_uri.as_deref()),
        track.description.as_deref().unwrap_or(""),
    )
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    playback: &PlaybackInfo,
    volume: f32,
    gateway: &GatewayResolver,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
            Constraint::Length(4),
        ])
        .split(frame.area());

    draw_search(frame, app, ui_settings, chunks[0]);
    draw_list(frame, app, chunks[1]);
    draw_transport(frame, app, playback, volume, chunks[2]);

    // Overlay metadata popup (keeps list visible under it)
    if app.metadata_window {
        let popup_area = centered_rect_sized(76, 16, chunks[1]);
        frame.render_widget(Clear, popup_area);

        let meta = app
            .cursor_track()
            .map(|track| metadata_text(track, gateway))
            .unwrap_or_else(|| "No track selected".to_string());
        let meta_paragraph = Paragraph::new(meta)
            .block(
                Block::default()
                    .padding(left_padded())
                    .borders(Borders::ALL)
                    .title(" metadata (K closes) "),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(meta_paragraph, popup_area);
    }

    let footer = Paragraph::new(controls_text(controls_settings))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(left_padded()),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}

fn draw_search(frame: &mut Frame, app: &App, ui: &UiSettings, area: Rect) {
    let (text, style) = if app.search_term.is_empty() && !app.search_mode {
        (
            ui.search_placeholder.clone(),
            Style::default().add_modifier(Modifier::DIM),
        )
    } else if app.search_mode {
        (format!("/{}_", app.search_term), Style::default())
    } else {
        (format!("/{}", app.search_term), Style::default())
    };

    let search = Paragraph::new(text).style(style).block(
        Block::default()
            .borders(Borders::ALL)
            .title(ui.header_text.as_str())
            .title_alignment(Alignment::Center)
            .padding(left_padded()),
    );
    frame.render_widget(search, area);
}

fn draw_list(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" tracks ");

    let message = match &app.load_state {
        LoadState::Loading => Some("Loading tracks...".to_string()),
        LoadState::Failed(msg) => Some(format!("Error: {msg}")),
        LoadState::Ready if app.filtered.is_empty() => Some("No tracks found.".to_string()),
        LoadState::Ready => None,
    };
    if let Some(message) = message {
        let p = Paragraph::new(message)
            .alignment(Alignment::Center)
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(p, area);
        return;
    }

    // Center the cursor when possible; only build ListItems for the visible window.
    let view = app.view();
    let total = view.len();
    let list_height = area.height.saturating_sub(2) as usize;
    let cursor = app.cursor.min(total.saturating_sub(1));
    let (start, end, cursor_in_visible) = if total <= list_height || list_height == 0 {
        (0, total, cursor)
    } else {
        let half = list_height / 2;
        let mut start = cursor.saturating_sub(half);
        if start + list_height > total {
            start = total - list_height;
        }
        (start, start + list_height, cursor - start)
    };
    let current_id = app.current_track().map(|t| t.id);

    let visible_items: Vec<ListItem> = view[start..end]
        .iter()
        .map(|track| {
            let is_current = Some(track.id) == current_id;
            let marker = if is_current { "♪ " } else { "  " };
            let line = format!(
                "{}{}  {}",
                marker,
                track.display(),
                format_length(track.duration_hint)
            );
            if is_current {
                ListItem::new(line).style(Style::default().add_modifier(Modifier::BOLD))
            } else {
                ListItem::new(line)
            }
        })
        .collect();

    let list = List::new(visible_items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if total > 0 {
        state.select(Some(cursor_in_visible));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_transport(frame: &mut Frame, app: &App, playback: &PlaybackInfo, volume: f32, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(Block::default().borders(Borders::ALL).inner(area));
    frame.render_widget(
        Block::default().borders(Borders::ALL).title(" now playing "),
        area,
    );

    let current = app.current_track();
    let state = if playback.loading && app.is_playing() {
        "Loading"
    } else if playback.playing {
        "Playing"
    } else {
        "Paused"
    };
    let info = match current {
        Some(track) => format!(
            " {} • {} • Vol {}%",
            track.display(),
            state,
            (volume * 100.0).round() as i64
        ),
        None => format!(" Stopped • Vol {}%", (volume * 100.0).round() as i64),
    };
    frame.render_widget(Paragraph::new(info), rows[0]);

    let (elapsed, total) = match current {
        Some(track) => (
            playback.elapsed,
            playback.duration.or(track.duration_hint),
        ),
        None => (Duration::ZERO, None),
    };
    let elapsed = total.map_or(elapsed, |t| elapsed.min(t));
    let gauge = Gauge::default()
        .gauge_style(Style::default().add_modifier(Modifier::BOLD))
        .ratio(progress_ratio(elapsed, total))
        .label(format!("{} / {}", format_mss(elapsed), format_length(total)));
    frame.render_widget(gauge, rows[1]);
}
