use std::collections::HashSet;

use tracing::{debug, info};

use crate::config::BackendSettings;

use super::error::CatalogError;
use super::model::{Track, TrackRecord};
use super::source::{PageRequest, RecordSource, SortDirection};

/// What to read from the backend and how to page through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub table: String,
    pub columns: String,
    pub order_column: String,
    pub direction: SortDirection,
    pub page_size: usize,
}

impl CatalogQuery {
    pub fn from_settings(settings: &BackendSettings) -> Self {
        Self {
            table: settings.table.clone(),
            columns: settings.select.clone(),
            order_column: settings.order_column.clone(),
            direction: settings.order_direction,
            page_size: settings.page_size.max(1),
        }
    }

    fn rows_per_page(&self) -> usize {
        self.page_size.max(1)
    }

    fn page(&self, page: usize) -> PageRequest {
        let from = page * self.rows_per_page();
        PageRequest {
            table: self.table.clone(),
            columns: self.columns.clone(),
            order_column: self.order_column.clone(),
            direction: self.direction,
            from,
            to: from + self.rows_per_page() - 1,
        }
    }
}

/// Fetch every record page by page and build the canonical track list.
///
/// Paging stops at the first short (or empty) page. Any page error aborts the
/// whole load; no partial list is returned.
pub fn load_catalog<S: RecordSource>(
    source: &S,
    query: &CatalogQuery,
) -> Result<Vec<Track>, CatalogError> {
    let mut records: Vec<TrackRecord> = Vec::new();
    let mut page = 0;

    loop {
        let request = query.page(page);
        let batch = source.fetch_page(&request)?;
        let fetched = batch.len();
        debug!(page, fetched, "track page received");

        records.extend(batch);
        page += 1;

        if fetched < query.rows_per_page() {
            break;
        }
    }

    let raw = records.len();
    let tracks = normalize_records(records);
    info!(pages = page, raw, kept = tracks.len(), "catalog loaded");
    Ok(tracks)
}

/// Drop records without audio, fill in placeholder titles/artists and remove
/// case-insensitive `(title, artist)` duplicates, keeping the first seen.
pub fn normalize_records(records: Vec<TrackRecord>) -> Vec<Track> {
    let mut seen: HashSet<(String, String)> = HashSet::new();

    records
        .into_iter()
        .filter_map(Track::from_record)
        .filter(|track| seen.insert(track.dedup_key()))
        .collect()
}
