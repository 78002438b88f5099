//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the loaded catalog, the
//! search view, the list cursor and play intent.

mod model;

pub use model::*;

#[cfg(test)]
mod tests;
