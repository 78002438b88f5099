use std::time::Duration;

use serde::Deserialize;

pub type TrackId = i64;

/// Title used when a record has no usable title.
pub const UNTITLED_TRACK: &str = "Untitled Track";
/// Artist used when a record has no usable artist name.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// A raw row of the track table as returned by the backend.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackRecord {
    pub id: TrackId,
    #[serde(default)]
    pub contract_address: Option<String>,
    /// Numeric or string depending on the column type; only displayed.
    #[serde(default)]
    pub token_id: Option<serde_json::Value>,
    #[serde(default)]
    pub track_title: Option<String>,
    #[serde(default)]
    pub artist_address: Option<String>,
    #[serde(default)]
    pub artist_name: Option<String>,
    #[serde(default)]
    pub audio_ipfs_uri: Option<String>,
    #[serde(default)]
    pub thumbnail_ipfs_uri: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    pub file_size_bytes: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub minted_at: Option<String>,
    #[serde(default)]
    pub inserted_at: Option<String>,
}

/// A playable catalog entry: a record with an audio locator and display
/// fields filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    pub audio_uri: String,
    pub thumbnail_uri: Option<String>,
    /// Backend hint only; the decoded media is authoritative.
    pub duration_hint: Option<Duration>,
    pub contract_address: Option<String>,
    pub token_id: Option<String>,
    pub artist_address: Option<String>,
    pub mime_type: Option<String>,
    pub file_size_bytes: Option<i64>,
    pub description: Option<String>,
    pub minted_at: Option<String>,
    pub inserted_at: Option<String>,
}

impl Track {
    /// Build a track from a record, or `None` when it has no audio locator.
    pub fn from_record(record: TrackRecord) -> Option<Self> {
        let audio_uri = non_blank(record.audio_ipfs_uri)?;

        Some(Self {
            id: record.id,
            title: non_blank(record.track_title).unwrap_or_else(|| UNTITLED_TRACK.to_string()),
            artist: non_blank(record.artist_name).unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
            audio_uri,
            thumbnail_uri: non_blank(record.thumbnail_ipfs_uri),
            duration_hint: record
                .duration_seconds
                .and_then(|s| Duration::try_from_secs_f64(s).ok()),
            contract_address: record.contract_address,
            token_id: record.token_id.map(|v| match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            }),
            artist_address: record.artist_address,
            mime_type: record.mime_type,
            file_size_bytes: record.file_size_bytes,
            description: record.description,
            minted_at: record.minted_at,
            inserted_at: record.inserted_at,
        })
    }

    /// Lowercased `(title, artist)` pair used to detect duplicate uploads.
    pub fn dedup_key(&self) -> (String, String) {
        (self.title.to_lowercase(), self.artist.to_lowercase())
    }

    /// `Title - Artist`, as shown in the list.
    pub fn display(&self) -> String {
        format!("{} - {}", self.title, self.artist)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
