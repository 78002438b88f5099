//! Utilities for creating `rodio` sinks from downloaded audio.
//!
//! The helper here decodes an in-memory copy of the source and prepares a
//! paused `Sink` at the requested start position.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use super::types::PlayError;

/// Create a paused `Sink` for `bytes` that starts playback at `start_at`.
///
/// Also returns the total duration reported by the decoder, if any.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    bytes: &Arc<[u8]>,
    start_at: Duration,
    volume: f32,
) -> Result<(Sink, Option<Duration>), PlayError> {
    let source =
        Decoder::new(Cursor::new(bytes.clone())).map_err(|e| PlayError::Decode(e.to_string()))?;
    let total = source.total_duration();

    let sink = Sink::connect_new(stream.mixer());
    sink.set_volume(volume);
    // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
    sink.append(source.skip_duration(start_at));
    sink.pause();
    Ok((sink, total))
}
