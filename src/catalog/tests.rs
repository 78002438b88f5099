use std::cell::RefCell;
use std::time::Duration;

use reqwest::StatusCode;

use super::rest::{error_from_body, page_query};
use super::*;
use crate::config::BackendSettings;

fn rec(id: TrackId, title: Option<&str>, artist: Option<&str>, audio: Option<&str>) -> TrackRecord {
    TrackRecord {
        id,
        track_title: title.map(Into::into),
        artist_name: artist.map(Into::into),
        audio_ipfs_uri: audio.map(Into::into),
        ..TrackRecord::default()
    }
}

fn playable(id: TrackId) -> TrackRecord {
    let title = format!("Song {id}");
    let audio = format!("ipfs://cid{id}");
    rec(id, Some(title.as_str()), Some("Artist"), Some(audio.as_str()))
}

/// Serves pre-scripted pages and records every request it sees.
struct ScriptedSource {
    pages: Vec<Result<Vec<TrackRecord>, String>>,
    requests: RefCell<Vec<PageRequest>>,
}

impl ScriptedSource {
    fn new(pages: Vec<Result<Vec<TrackRecord>, String>>) -> Self {
        Self {
            pages,
            requests: RefCell::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl RecordSource for ScriptedSource {
    fn fetch_page(&self, request: &PageRequest) -> Result<Vec<TrackRecord>, CatalogError> {
        let n = self.calls();
        self.requests.borrow_mut().push(request.clone());
        match self.pages.get(n) {
            Some(Ok(rows)) => Ok(rows.clone()),
            Some(Err(message)) => Err(CatalogError::Backend {
                message: message.clone(),
            }),
            None => Ok(Vec::new()),
        }
    }
}

fn query(page_size: usize) -> CatalogQuery {
    CatalogQuery {
        table: "music_nfts".into(),
        columns: "*".into(),
        order_column: "id".into(),
        direction: SortDirection::Descending,
        page_size,
    }
}

#[test]
fn two_full_pages_then_short_page_makes_three_calls() {
    let source = ScriptedSource::new(vec![
        Ok(vec![playable(9), playable(8)]),
        Ok(vec![playable(7), playable(6)]),
        Ok(vec![playable(5)]),
        Ok(vec![playable(4)]),
    ]);

    let tracks = load_catalog(&source, &query(2)).unwrap();

    assert_eq!(source.calls(), 3);
    let ids: Vec<TrackId> = tracks.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![9, 8, 7, 6, 5]);
}

#[test]
fn pages_are_contiguous_ranges_in_descending_id_order() {
    let source = ScriptedSource::new(vec![
        Ok(vec![playable(3), playable(2)]),
        Ok(vec![playable(1)]),
    ]);

    load_catalog(&source, &query(2)).unwrap();

    let requests = source.requests.borrow();
    assert_eq!((requests[0].from, requests[0].to), (0, 1));
    assert_eq!((requests[1].from, requests[1].to), (2, 3));
    for r in requests.iter() {
        assert_eq!(r.table, "music_nfts");
        assert_eq!(r.order_column, "id");
        assert_eq!(r.direction, SortDirection::Descending);
    }
}

#[test]
fn exact_multiple_of_page_size_stops_on_empty_page() {
    let source = ScriptedSource::new(vec![
        Ok(vec![playable(2), playable(1)]),
        Ok(Vec::new()),
    ]);

    let tracks = load_catalog(&source, &query(2)).unwrap();
    assert_eq!(source.calls(), 2);
    assert_eq!(tracks.len(), 2);
}

#[test]
fn empty_backend_yields_empty_catalog_after_one_call() {
    let source = ScriptedSource::new(vec![Ok(Vec::new())]);
    let tracks = load_catalog(&source, &query(1000)).unwrap();
    assert_eq!(source.calls(), 1);
    assert!(tracks.is_empty());
}

#[test]
fn page_error_aborts_the_whole_load() {
    let source = ScriptedSource::new(vec![
        Ok(vec![playable(4), playable(3)]),
        Err("permission denied for table music_nfts".into()),
        Ok(vec![playable(1)]),
    ]);

    let err = load_catalog(&source, &query(2)).unwrap_err();
    assert_eq!(source.calls(), 2);
    assert_eq!(err.to_string(), "permission denied for table music_nfts");
}

#[test]
fn records_without_audio_are_dropped() {
    let tracks = normalize_records(vec![
        rec(3, Some("A"), Some("X"), None),
        rec(2, Some("B"), Some("Y"), Some("")),
        rec(1, Some("C"), Some("Z"), Some("ipfs://c")),
    ]);

    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].id, 1);
}

#[test]
fn missing_title_and_artist_get_placeholders() {
    let tracks = normalize_records(vec![
        rec(2, None, None, Some("ipfs://a")),
        rec(1, Some(""), Some("Someone"), Some("ipfs://b")),
    ]);

    assert_eq!(tracks[0].title, UNTITLED_TRACK);
    assert_eq!(tracks[0].artist, UNKNOWN_ARTIST);
    assert_eq!(tracks[1].title, UNTITLED_TRACK);
    assert_eq!(tracks[1].artist, "Someone");
}

#[test]
fn duplicates_are_case_insensitive_and_first_seen_wins() {
    let tracks = normalize_records(vec![
        rec(30, Some("Night Drive"), Some("Neon"), Some("ipfs://newest")),
        rec(20, Some("NIGHT DRIVE"), Some("neon"), Some("ipfs://older")),
        rec(10, Some("Night Drive"), Some("Other"), Some("ipfs://other")),
    ]);

    let ids: Vec<TrackId> = tracks.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![30, 10]);
    assert_eq!(tracks[0].audio_uri, "ipfs://newest");
}

#[test]
fn placeholder_records_dedup_against_each_other() {
    let tracks = normalize_records(vec![
        rec(2, None, None, Some("ipfs://a")),
        rec(1, Some("untitled track"), Some("UNKNOWN ARTIST"), Some("ipfs://b")),
    ]);
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].id, 2);
}

#[test]
fn dropped_record_does_not_shadow_a_later_duplicate() {
    let tracks = normalize_records(vec![
        rec(2, Some("A"), Some("X"), None),
        rec(1, Some("A"), Some("X"), Some("ipfs://a")),
    ]);
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].id, 1);
}

#[test]
fn records_deserialize_from_backend_rows() {
    let body = r#"[
        {
            "id": 42,
            "contract_address": "KT1abc",
            "token_id": 7,
            "track_title": "Song",
            "artist_address": "tz1xyz",
            "artist_name": null,
            "audio_ipfs_uri": "ipfs://audio",
            "thumbnail_ipfs_uri": "ipfs://thumb",
            "mime_type": "audio/mpeg",
            "duration_seconds": 185.5,
            "file_size_bytes": 123456,
            "description": null,
            "minted_at": "2024-01-01T00:00:00Z",
            "inserted_at": "2024-01-02T00:00:00Z",
            "extra_column": true
        }
    ]"#;

    let records: Vec<TrackRecord> = serde_json::from_str(body).unwrap();
    let tracks = normalize_records(records);
    let t = &tracks[0];
    assert_eq!(t.id, 42);
    assert_eq!(t.title, "Song");
    assert_eq!(t.artist, UNKNOWN_ARTIST);
    assert_eq!(t.thumbnail_uri.as_deref(), Some("ipfs://thumb"));
    assert_eq!(t.token_id.as_deref(), Some("7"));
    assert_eq!(t.duration_hint, Some(Duration::from_secs_f64(185.5)));
    assert_eq!(t.display(), "Song - Unknown Artist");
}

#[test]
fn invalid_duration_hint_is_ignored() {
    let mut r = playable(1);
    r.duration_seconds = Some(-3.0);
    let t = Track::from_record(r).unwrap();
    assert_eq!(t.duration_hint, None);
}

#[test]
fn page_query_encodes_projection_order_and_range() {
    let request = PageRequest {
        table: "music_nfts".into(),
        columns: "*".into(),
        order_column: "id".into(),
        direction: SortDirection::Descending,
        from: 1000,
        to: 1999,
    };

    assert_eq!(
        page_query(&request),
        vec![
            ("select", "*".to_string()),
            ("order", "id.desc".to_string()),
            ("offset", "1000".to_string()),
            ("limit", "1000".to_string()),
        ]
    );
}

#[test]
fn configured_ascending_order_reaches_the_query_string() {
    let settings = BackendSettings {
        order_column: "inserted_at".into(),
        order_direction: SortDirection::Ascending,
        page_size: 50,
        ..BackendSettings::default()
    };
    let source = ScriptedSource::new(vec![Ok(vec![playable(1)])]);

    load_catalog(&source, &CatalogQuery::from_settings(&settings)).unwrap();

    let requests = source.requests.borrow();
    assert_eq!(requests[0].direction, SortDirection::Ascending);
    assert!(page_query(&requests[0]).contains(&("order", "inserted_at.asc".to_string())));
}

#[test]
fn rest_endpoint_targets_the_table() {
    let settings = BackendSettings {
        url: "https://project.supabase.co/".into(),
        ..BackendSettings::default()
    };
    let client = RestClient::new(&settings).unwrap();
    assert_eq!(
        client.endpoint("music_nfts"),
        "https://project.supabase.co/rest/v1/music_nfts"
    );
}

#[test]
fn backend_error_body_message_is_surfaced() {
    let err = error_from_body(
        StatusCode::BAD_REQUEST,
        r#"{"code":"42703","message":"column music_nfts.foo does not exist"}"#,
    );
    assert_eq!(err.to_string(), "column music_nfts.foo does not exist");

    let err = error_from_body(StatusCode::BAD_GATEWAY, "");
    assert_eq!(err.to_string(), "track backend returned 502: Bad Gateway");

    let err = error_from_body(StatusCode::SERVICE_UNAVAILABLE, "upstream down");
    assert_eq!(err.to_string(), "track backend returned 503: upstream down");
}
