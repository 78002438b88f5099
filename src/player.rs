//! Playback control: what should be playing, and keeping the audio output in
//! line with it.
//!
//! The controller stores the selected track's identity, never its position,
//! so a changing filtered view can't leave it pointing at the wrong track.

mod controller;
mod reconcile;

pub use controller::PlaybackController;
pub use reconcile::{DesiredPlayback, ReconcileOutcome, Reconciler};
