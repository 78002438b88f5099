//! Background download of gateway URLs.
//!
//! Each `Load` spawns one worker; results are tagged with the load's
//! generation so the audio thread can discard downloads that were superseded.

use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

use reqwest::blocking::Client;
use tracing::debug;

use super::types::PlayError;

pub(super) struct Fetched {
    pub generation: u64,
    pub result: Result<Arc<[u8]>, PlayError>,
}

pub(super) fn spawn_fetch<M>(client: &Client, url: String, generation: u64, tx: Sender<M>)
where
    M: From<Fetched> + Send + 'static,
{
    let client = client.clone();
    thread::spawn(move || {
        debug!(%url, generation, "fetching audio");
        let result = download(&client, &url);
        // The audio thread may already be gone on shutdown.
        let _ = tx.send(M::from(Fetched { generation, result }));
    });
}

fn download(client: &Client, url: &str) -> Result<Arc<[u8]>, PlayError> {
    let bytes = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.bytes())
        .map_err(|e| PlayError::Fetch(e.to_string()))?;
    Ok(Arc::from(bytes.as_ref()))
}
