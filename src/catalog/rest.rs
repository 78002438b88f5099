use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::BackendSettings;

use super::error::CatalogError;
use super::model::TrackRecord;
use super::source::{PageRequest, RecordSource};

/// PostgREST-style table client (the REST face of a Supabase project).
///
/// Built once at startup and shared by reference with the loader.
pub struct RestClient {
    client: Client,
    base_url: String,
    api_key: String,
}

/// Error body returned by PostgREST on failed queries.
#[derive(Deserialize)]
struct BackendErrorBody {
    message: Option<String>,
}

impl RestClient {
    pub fn new(settings: &BackendSettings) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.url.trim_end_matches('/').to_string(),
            api_key: settings.anon_key.clone(),
        })
    }

    pub(super) fn endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }
}

/// Query string for a ranged, ordered read of `request.table`.
pub(super) fn page_query(request: &PageRequest) -> Vec<(&'static str, String)> {
    vec![
        ("select", request.columns.clone()),
        (
            "order",
            format!("{}.{}", request.order_column, request.direction.as_str()),
        ),
        ("offset", request.from.to_string()),
        ("limit", request.row_count().to_string()),
    ]
}

/// Turn a failed response into the backend's own message when it sent one.
pub(super) fn error_from_body(status: StatusCode, body: &str) -> CatalogError {
    match serde_json::from_str::<BackendErrorBody>(body) {
        Ok(BackendErrorBody {
            message: Some(message),
        }) if !message.is_empty() => CatalogError::Backend { message },
        _ => CatalogError::Status {
            status: status.as_u16(),
            message: match body.trim() {
                "" => status.canonical_reason().unwrap_or_default().to_string(),
                text => text.to_string(),
            },
        },
    }
}

impl RecordSource for RestClient {
    fn fetch_page(&self, request: &PageRequest) -> Result<Vec<TrackRecord>, CatalogError> {
        debug!(
            table = %request.table,
            from = request.from,
            to = request.to,
            "fetching track page"
        );

        let resp = self
            .client
            .get(self.endpoint(&request.table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Range-Unit", "items")
            .header("Range", format!("{}-{}", request.from, request.to))
            .query(&page_query(request))
            .send()?;

        let status = resp.status();
        let body = resp.text()?;
        if !status.is_success() {
            return Err(error_from_body(status, &body));
        }

        let records: Vec<TrackRecord> = serde_json::from_str(&body)?;
        Ok(records)
    }
}
