//! Track catalog: backend records, the paginated loader and normalization.
//!
//! The loader talks to the backend only through [`RecordSource`], so the
//! pagination and dedup rules can be exercised without a network.

mod error;
mod loader;
mod model;
mod rest;
mod source;

pub use error::CatalogError;
pub use loader::{CatalogQuery, load_catalog, normalize_records};
pub use model::*;
pub use rest::RestClient;
pub use source::{PageRequest, RecordSource, SortDirection};

#[cfg(test)]
mod tests;
