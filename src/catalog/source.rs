use serde::Deserialize;

use super::error::CatalogError;
use super::model::TrackRecord;

/// Page order over `order_column`; `asc` or `desc` in config.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Ascending,
    /// Newest first.
    #[default]
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

/// One ranged read of the track table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub table: String,
    /// Column projection, e.g. `*`.
    pub columns: String,
    pub order_column: String,
    pub direction: SortDirection,
    /// First row, inclusive.
    pub from: usize,
    /// Last row, inclusive.
    pub to: usize,
}

impl PageRequest {
    pub fn row_count(&self) -> usize {
        self.to + 1 - self.from
    }
}

/// A paginated record store.
pub trait RecordSource {
    /// Fetch the rows `request.from..=request.to` in the requested order.
    fn fetch_page(&self, request: &PageRequest) -> Result<Vec<TrackRecord>, CatalogError>;
}

impl<T: RecordSource + ?Sized> RecordSource for &T {
    fn fetch_page(&self, request: &PageRequest) -> Result<Vec<TrackRecord>, CatalogError> {
        (**self).fetch_page(request)
    }
}
