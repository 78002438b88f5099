use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::debug;

use crate::app::{App, LoadState};
use crate::audio::{AudioEvent, AudioOutput, AudioPlayer};
use crate::config;
use crate::gateway::GatewayResolver;
use crate::ui;

use super::loader::CatalogResult;

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
}

/// What the loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    Quit,
}

/// Main terminal event loop: handles input, catalog arrival, audio events
/// and drawing. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    audio_player: &mut AudioPlayer,
    gateway: &GatewayResolver,
    catalog_rx: &Receiver<CatalogResult>,
    state: &mut EventLoopState,
) -> anyhow::Result<()> {
    let playback_handle = audio_player.playback_handle();

    loop {
        if app.load_state == LoadState::Loading {
            match catalog_rx.try_recv() {
                Ok(result) => app.finish_loading(result),
                Err(TryRecvError::Disconnected) => {
                    app.finish_loading(Err("catalog loader stopped unexpectedly".into()))
                }
                Err(TryRecvError::Empty) => {}
            }
        }

        for audio_event in audio_player.poll_events() {
            apply_audio_event(app, audio_event);
        }

        app.sync(gateway, audio_player);

        let playback = playback_handle
            .lock()
            .map(|info| info.clone())
            .unwrap_or_default();
        let volume = audio_player.volume();
        terminal.draw(|f| {
            ui::draw(
                f,
                app,
                &playback,
                volume,
                gateway,
                &settings.ui,
                &settings.controls,
            )
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, audio_player, state) == KeyOutcome::Quit {
                    audio_player
                        .quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));
                    return Ok(());
                }
                app.sync(gateway, audio_player);
            }
        }
    }
}

pub(super) fn apply_audio_event(app: &mut App, audio_event: AudioEvent) {
    match audio_event {
        AudioEvent::Ended { source } => app.on_track_ended(&source),
        AudioEvent::PlayFailed { source, error } => app.on_play_failure(&source, &error),
        AudioEvent::MetadataLoaded { source, duration } => {
            debug!(%source, ?duration, "source metadata loaded");
        }
    }
}

pub(super) fn handle_key_event<O: AudioOutput + ?Sized>(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    output: &mut O,
    state: &mut EventLoopState,
) -> KeyOutcome {
    if key.code == KeyCode::Char('q') && !app.search_mode {
        return KeyOutcome::Quit;
    }
    // Nothing to select or play until the catalog is in.
    if !app.is_ready() {
        state.pending_gg = false;
        return KeyOutcome::Continue;
    }

    if app.search_mode {
        state.pending_gg = false;
        match key.code {
            KeyCode::Esc => app.clear_search(),
            KeyCode::Enter => app.exit_search_mode(),
            KeyCode::Backspace => app.pop_search_char(),
            KeyCode::Down => app.cursor_down(),
            KeyCode::Up => app.cursor_up(),
            KeyCode::Char('j') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.cursor_down()
            }
            KeyCode::Char('k') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.cursor_up()
            }
            KeyCode::Char(c) if !c.is_control() => app.push_search_char(c),
            _ => {}
        }
        return KeyOutcome::Continue;
    }

    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }

    match key.code {
        KeyCode::Char('/') => app.enter_search_mode(),
        KeyCode::Esc => app.clear_search(),
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.cursor_top();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => app.cursor_bottom(),
        KeyCode::Char('j') | KeyCode::Down => app.cursor_down(),
        KeyCode::Char('k') | KeyCode::Up => app.cursor_up(),
        KeyCode::Enter => {
            app.select_at_cursor();
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => app.toggle_play_pause(),
        KeyCode::Char('l') => app.next(),
        KeyCode::Char('h') => app.previous(),
        KeyCode::Char('L') => seek_by(app, output, settings.controls.seek_seconds, true),
        KeyCode::Char('H') => seek_by(app, output, settings.controls.seek_seconds, false),
        KeyCode::Char('+') | KeyCode::Char('=') => {
            output.set_volume((output.volume() + settings.controls.volume_step).clamp(0.0, 1.0))
        }
        KeyCode::Char('-') => {
            output.set_volume((output.volume() - settings.controls.volume_step).clamp(0.0, 1.0))
        }
        KeyCode::Char('K') => app.toggle_metadata_window(),
        _ => {}
    }

    KeyOutcome::Continue
}

/// Seek relative to the current position, bounded by the source length.
fn seek_by<O: AudioOutput + ?Sized>(app: &App, output: &mut O, secs: u64, forward: bool) {
    if app.current_track().is_none() {
        return;
    }
    let step = Duration::from_secs(secs);
    let position = output.position();
    let target = if forward {
        let target = position.saturating_add(step);
        output.duration().map_or(target, |d| target.min(d))
    } else {
        position.saturating_sub(step)
    };
    output.seek(target);
}
