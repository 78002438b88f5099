use std::path::PathBuf;

use serde::Deserialize;

use crate::catalog::SortDirection;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/ipfs-radio/config.toml` or
/// `~/.config/ipfs-radio/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `IPFS_RADIO__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub backend: BackendSettings,
    pub gateway: GatewaySettings,
    pub audio: AudioSettings,
    pub controls: ControlsSettings,
    pub ui: UiSettings,
    pub logging: LoggingSettings,
}

/// Connection to the REST backend that stores the track table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Project URL, without the `/rest/v1` suffix.
    pub url: String,
    /// Public (anon) API key sent as `apikey` and bearer token.
    pub anon_key: String,
    /// Table holding the track records.
    pub table: String,
    /// Column projection passed as `select=`.
    pub select: String,
    /// Column giving the stable page order.
    pub order_column: String,
    /// `desc` lists the newest tracks first.
    pub order_direction: SortDirection,
    /// Rows per request. Should match the backend's max-rows setting.
    pub page_size: usize,
    /// Per-request timeout (seconds).
    pub timeout_secs: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            url: "https://hxerlgynhtwbxqwkghog.supabase.co".to_string(),
            anon_key: String::new(),
            table: "music_nfts".to_string(),
            select: "*".to_string(),
            order_column: "id".to_string(),
            order_direction: SortDirection::Descending,
            page_size: 1000,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewaySettings {
    /// HTTP(S) gateway prefix the content id is appended to.
    pub base_url: String,
    /// Locator scheme stripped before appending to `base_url`.
    pub scheme: String,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            base_url: "https://ipfs.io/ipfs/".to_string(),
            scheme: "ipfs://".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Output volume at startup, in `[0.0, 1.0]`.
    pub initial_volume: f32,
    /// Fade-out duration when quitting (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
    /// Timeout for downloading a track from the gateway (seconds).
    pub fetch_timeout_secs: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            initial_volume: 1.0,
            quit_fade_out_ms: 300,
            fetch_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to seek when pressing `H` / `L`.
    pub seek_seconds: u64,
    /// Volume change per `+` / `-` press.
    pub volume_step: f32,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            seek_seconds: 5,
            volume_step: 0.05,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// Hint shown in the search box while it is empty.
    pub search_placeholder: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " Radio ".to_string(),
            search_placeholder: "Filter tracks...".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is not set.
    pub level: String,
    /// Log file path. Defaults to `$XDG_STATE_HOME/ipfs-radio/ipfs-radio.log`.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
