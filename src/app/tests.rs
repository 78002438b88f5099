use std::time::Duration;

use super::*;
use crate::audio::{AudioOutput, PlayError};
use crate::catalog::{Track, TrackRecord, normalize_records};
use crate::gateway::GatewayResolver;

fn tracks(rows: &[(i64, &str, &str)]) -> Vec<Track> {
    normalize_records(
        rows.iter()
            .map(|&(id, title, artist)| TrackRecord {
                id,
                track_title: Some(title.into()),
                artist_name: Some(artist.into()),
                audio_ipfs_uri: Some(format!("ipfs://cid{id}/a.mp3")),
                ..Default::default()
            })
            .collect(),
    )
}

fn ready_app() -> App {
    let mut app = App::new();
    app.finish_loading(Ok(tracks(&[
        (1, "Alpha", "Ann"),
        (2, "Beta", "Bob"),
        (3, "Gamma", "Ann"),
    ])));
    app
}

fn gateway() -> GatewayResolver {
    GatewayResolver::new("https://gw.example/ipfs/", "ipfs://")
}

fn url(id: i64) -> String {
    format!("https://gw.example/ipfs/cid{id}/a.mp3")
}

#[derive(Default)]
struct NullOutput {
    source: Option<String>,
    playing: bool,
}

impl AudioOutput for NullOutput {
    fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
    fn set_source(&mut self, url: String) {
        self.source = Some(url);
    }
    fn clear_source(&mut self) {
        self.source = None;
    }
    fn play(&mut self) -> Result<(), PlayError> {
        self.playing = true;
        Ok(())
    }
    fn pause(&mut self) {
        self.playing = false;
    }
    fn seek(&mut self, _position: Duration) {}
    fn set_volume(&mut self, _volume: f32) {}
    fn volume(&self) -> f32 {
        1.0
    }
    fn position(&self) -> Duration {
        Duration::ZERO
    }
    fn duration(&self) -> Option<Duration> {
        None
    }
}

#[test]
fn starts_loading_with_empty_view() {
    let app = App::new();
    assert_eq!(app.load_state, LoadState::Loading);
    assert!(!app.is_ready());
    assert!(app.view().is_empty());
    assert!(app.current_track().is_none());
}

#[test]
fn transport_is_inert_while_loading() {
    let mut app = App::new();
    app.toggle_play_pause();
    app.next();
    app.previous();
    assert!(!app.select_at_cursor());
    assert!(!app.is_playing());
    assert_eq!(app.controller.selected_id(), None);
}

#[test]
fn finishing_load_publishes_catalog() {
    let app = ready_app();
    assert!(app.is_ready());
    assert_eq!(app.filtered, vec![0, 1, 2]);
    assert_eq!(app.cursor_track().map(|t| t.id), Some(1));
}

#[test]
fn failed_load_keeps_empty_list() {
    let mut app = App::new();
    app.finish_loading(Err("track backend returned 500: boom".into()));
    assert_eq!(
        app.load_state,
        LoadState::Failed("track backend returned 500: boom".into())
    );
    assert!(app.view().is_empty());
}

#[test]
fn search_narrows_view_in_catalog_order() {
    let mut app = ready_app();
    app.enter_search_mode();
    app.push_search_char('a');
    app.push_search_char('n');
    app.push_search_char('n');
    let ids: Vec<_> = app.view().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 3]);

    app.pop_search_char();
    app.pop_search_char();
    app.pop_search_char();
    assert_eq!(app.filtered, vec![0, 1, 2]);
}

#[test]
fn clearing_search_leaves_search_mode() {
    let mut app = ready_app();
    app.enter_search_mode();
    app.set_search_term("beta");
    assert_eq!(app.filtered, vec![1]);

    app.clear_search();
    assert!(!app.search_mode);
    assert!(app.search_term.is_empty());
    assert_eq!(app.filtered.len(), 3);
}

#[test]
fn exiting_search_mode_keeps_term() {
    let mut app = ready_app();
    app.enter_search_mode();
    app.set_search_term("gam");
    app.exit_search_mode();
    assert!(!app.search_mode);
    assert_eq!(app.search_term, "gam");
    assert_eq!(app.filtered, vec![2]);
}

#[test]
fn cursor_wraps_and_jumps() {
    let mut app = ready_app();
    app.cursor_up();
    assert_eq!(app.cursor, 2);
    app.cursor_down();
    assert_eq!(app.cursor, 0);
    app.cursor_bottom();
    assert_eq!(app.cursor, 2);
    app.cursor_top();
    assert_eq!(app.cursor, 0);
}

#[test]
fn cursor_is_clamped_when_view_shrinks() {
    let mut app = ready_app();
    app.cursor_bottom();
    app.set_search_term("alpha");
    assert_eq!(app.cursor, 0);
    assert_eq!(app.cursor_track().map(|t| t.id), Some(1));
}

#[test]
fn select_at_cursor_plays_highlighted_track() {
    let mut app = ready_app();
    app.cursor_down();
    assert!(app.select_at_cursor());
    assert!(app.is_playing());
    assert_eq!(app.current_track().map(|t| t.id), Some(2));
}

#[test]
fn next_moves_cursor_with_current_track() {
    let mut app = ready_app();
    app.select_at_cursor();
    app.next();
    assert_eq!(app.current_track().map(|t| t.id), Some(2));
    assert_eq!(app.cursor, 1);

    app.previous();
    app.previous();
    assert_eq!(app.current_track().map(|t| t.id), Some(3));
    assert_eq!(app.cursor, 2);
}

#[test]
fn track_end_advances_within_filtered_view() {
    let gateway = gateway();
    let mut out = NullOutput::default();
    let mut app = ready_app();
    app.set_search_term("ann");
    app.select_at_cursor();
    app.sync(&gateway, &mut out);

    app.on_track_ended(&url(1));
    app.sync(&gateway, &mut out);
    assert_eq!(app.current_track().map(|t| t.id), Some(3));

    app.on_track_ended(&url(3));
    assert_eq!(app.current_track().map(|t| t.id), Some(1));
}

#[test]
fn end_of_a_replaced_source_does_not_skip_the_new_track() {
    let gateway = gateway();
    let mut out = NullOutput::default();
    let mut app = ready_app();
    app.select_at_cursor();
    app.sync(&gateway, &mut out);
    app.next();
    app.sync(&gateway, &mut out);

    app.on_track_ended(&url(1));
    assert_eq!(app.current_track().map(|t| t.id), Some(2));
    assert!(app.is_playing());
}

#[test]
fn cursor_follows_current_track_across_filter_changes() {
    let mut app = ready_app();
    app.cursor_bottom();
    app.select_at_cursor();
    app.set_search_term("a");
    app.set_search_term("");
    assert_eq!(app.cursor, 2);
}

#[test]
fn play_failure_drops_intent() {
    let gateway = gateway();
    let mut out = NullOutput::default();
    let mut app = ready_app();
    app.select_at_cursor();
    app.sync(&gateway, &mut out);

    app.on_play_failure(&url(1), &PlayError::Fetch("404".into()));
    assert!(!app.is_playing());
    assert_eq!(app.current_track().map(|t| t.id), Some(1));

    app.sync(&gateway, &mut out);
    assert!(!out.playing);
}

#[test]
fn failure_of_a_replaced_source_keeps_the_new_track_playing() {
    let gateway = gateway();
    let mut out = NullOutput::default();
    let mut app = ready_app();
    app.select_at_cursor();
    app.sync(&gateway, &mut out);
    app.next();
    app.sync(&gateway, &mut out);

    app.on_play_failure(&url(1), &PlayError::Fetch("404 Not Found".into()));
    assert!(app.is_playing());

    app.sync(&gateway, &mut out);
    assert_eq!(out.source.as_deref(), Some(url(2).as_str()));
    assert!(out.playing);
}

#[test]
fn events_before_any_sync_are_ignored() {
    let mut app = ready_app();
    app.select_at_cursor();
    app.on_play_failure(&url(1), &PlayError::Decode("bad header".into()));
    app.on_track_ended(&url(1));
    assert!(app.is_playing());
    assert_eq!(app.current_track().map(|t| t.id), Some(1));
}

#[test]
fn sync_drives_output_from_view() {
    let gateway = gateway();
    let mut out = NullOutput::default();
    let mut app = ready_app();

    app.select_at_cursor();
    app.sync(&gateway, &mut out);
    assert_eq!(
        out.source.as_deref(),
        Some("https://gw.example/ipfs/cid1/a.mp3")
    );
    assert!(out.playing);

    app.set_search_term("beta");
    app.sync(&gateway, &mut out);
    assert_eq!(out.source, None);
    assert!(!out.playing);
}

#[test]
fn metadata_window_toggles() {
    let mut app = ready_app();
    assert!(!app.metadata_window);
    app.toggle_metadata_window();
    assert!(app.metadata_window);
    app.toggle_metadata_window();
    assert!(!app.metadata_window);
}
