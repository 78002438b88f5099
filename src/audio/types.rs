//! Audio-related small types and handles.
//!
//! This module defines the [`AudioOutput`] seam the playback controller
//! drives, the commands and events exchanged with the audio thread, and the
//! shared playback info read by the UI.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;

/// Why a play request did not result in audible playback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayError {
    /// A newer source, pause or clear replaced the request before it started.
    /// Expected while skipping quickly through tracks.
    #[error("play request superseded by a newer request")]
    Superseded,
    /// Nothing to play: no source is set, or it resolved to an empty URL.
    #[error("no playable source")]
    NoSource,
    /// The source could not be downloaded from the gateway.
    #[error("could not fetch audio: {0}")]
    Fetch(String),
    /// The downloaded bytes are not a format the decoder understands.
    #[error("could not decode audio: {0}")]
    Decode(String),
    /// No usable audio output device.
    #[error("audio output unavailable: {0}")]
    Output(String),
}

/// A single media element: one source, play/pause, seek and volume.
///
/// `play` may also fail later; such failures are reported by the
/// implementation out of band (see [`AudioEvent::PlayFailed`]).
pub trait AudioOutput {
    /// The source currently loaded, if any.
    fn source(&self) -> Option<&str>;
    /// Replace the source. Playback stops until `play` is called.
    fn set_source(&mut self, url: String);
    /// Drop the current source.
    fn clear_source(&mut self);
    /// Start or resume playback of the current source.
    fn play(&mut self) -> Result<(), PlayError>;
    fn pause(&mut self);
    /// Jump to an absolute position in the current source.
    fn seek(&mut self, position: Duration);
    /// Set the output volume; values are clamped to `[0.0, 1.0]`.
    fn set_volume(&mut self, volume: f32);
    fn volume(&self) -> f32;
    /// Playback position within the current source.
    fn position(&self) -> Duration;
    /// Decoded duration of the current source, once known.
    fn duration(&self) -> Option<Duration>;
}

#[derive(Debug)]
pub enum AudioCmd {
    /// Fetch and prepare `url`, replacing whatever was loaded.
    Load(String),
    /// Drop the current source.
    Clear,
    /// Start or resume playback.
    Play,
    Pause,
    /// Seek to an absolute position.
    Seek(Duration),
    SetVolume(f32),
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

/// Notifications emitted by the audio thread.
///
/// Each event carries the URL of the source it is about, so a consumer can
/// drop events for a source it already moved away from.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioEvent {
    /// The source was decoded; `duration` is `None` when the container does
    /// not say.
    MetadataLoaded {
        source: String,
        duration: Option<Duration>,
    },
    /// The source played to its natural end.
    Ended { source: String },
    /// A play request failed after it was accepted.
    PlayFailed { source: String, error: PlayError },
}

#[derive(Debug, Clone, Default)]
/// Runtime playback information shared with the UI.
pub struct PlaybackInfo {
    /// URL of the loaded source, if any.
    pub source: Option<String>,
    /// Elapsed playback time for the current source.
    pub elapsed: Duration,
    /// Decoded duration of the current source.
    pub duration: Option<Duration>,
    /// Whether audio is currently being produced.
    pub playing: bool,
    /// Whether the source is still being downloaded.
    pub loading: bool,
}

pub type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;
