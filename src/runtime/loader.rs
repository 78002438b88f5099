use std::sync::mpsc::{self, Receiver};
use std::thread;

use anyhow::Context;
use tracing::{error, info};

use crate::catalog::{CatalogError, CatalogQuery, RestClient, Track, load_catalog};
use crate::config::{BackendSettings, Settings};

/// Outcome of the catalog load as seen by the UI: the tracks, or a message
/// to show in their place.
pub type CatalogResult = Result<Vec<Track>, String>;

/// Start the catalog load, or report straight away why it cannot run.
///
/// Settings that fail validation never reach the backend; the reason is
/// delivered as the load result so the list shows it.
pub fn start_catalog_load(settings: &Settings) -> anyhow::Result<Receiver<CatalogResult>> {
    match settings.validate() {
        Ok(()) => spawn_catalog_load(&settings.backend),
        Err(message) => {
            error!(%message, "catalog load skipped");
            Ok(failed_load(message))
        }
    }
}

fn failed_load(message: String) -> Receiver<CatalogResult> {
    let (tx, rx) = mpsc::channel();
    // `rx` is alive here, so the send cannot fail.
    let _ = tx.send(Err(message));
    rx
}

/// Start the one catalog load of this session on its own thread.
fn spawn_catalog_load(settings: &BackendSettings) -> anyhow::Result<Receiver<CatalogResult>> {
    let (tx, rx) = mpsc::channel();
    let settings = settings.clone();

    thread::Builder::new()
        .name("catalog-load".into())
        .spawn(move || {
            let result = fetch_catalog(&settings).map_err(|e| {
                error!(error = %e, "failed to load catalog");
                e.to_string()
            });
            // The receiver is gone when the user quit before the load finished.
            let _ = tx.send(result);
        })
        .context("failed to spawn catalog loader")?;

    Ok(rx)
}

fn fetch_catalog(settings: &BackendSettings) -> Result<Vec<Track>, CatalogError> {
    info!(url = %settings.url, table = %settings.table, "loading catalog");
    let client = RestClient::new(settings)?;
    load_catalog(&client, &CatalogQuery::from_settings(settings))
}
