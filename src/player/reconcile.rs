use tracing::{debug, warn};

use crate::audio::{AudioOutput, PlayError};
use crate::catalog::TrackId;

/// The state the audio output should be in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesiredPlayback {
    /// The current track, `None` when nothing is current.
    pub track: Option<TrackId>,
    /// Resolved URL of the current track.
    pub source: Option<String>,
    pub playing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Desired state matched the last applied one; the output was not touched.
    Unchanged,
    Applied,
    /// The output refused to start; the caller should drop its play intent.
    PlaybackRejected(PlayError),
}

/// Diff-and-apply from a [`DesiredPlayback`] onto an [`AudioOutput`].
///
/// The reconciler is the only writer of source and play state on the output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciler {
    last: Option<DesiredPlayback>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source of the last applied desired state, if any.
    pub fn applied_source(&self) -> Option<&str> {
        self.last.as_ref()?.source.as_deref()
    }

    /// Bring `output` in line with `desired`.
    ///
    /// Calling this again with the same desired state is a no-op, so it is
    /// safe to run after every event. A different track that shares the
    /// loaded URL is played without reloading the source.
    pub fn reconcile<O: AudioOutput + ?Sized>(
        &mut self,
        desired: &DesiredPlayback,
        output: &mut O,
    ) -> ReconcileOutcome {
        if self.last.as_ref() == Some(desired) {
            return ReconcileOutcome::Unchanged;
        }
        self.last = Some(desired.clone());

        let Some(source) = desired.source.as_deref() else {
            output.pause();
            output.clear_source();
            return ReconcileOutcome::Applied;
        };

        // Re-setting an identical source would restart the track.
        if output.source() != Some(source) {
            output.set_source(source.to_string());
        }

        if !desired.playing {
            output.pause();
            return ReconcileOutcome::Applied;
        }

        match output.play() {
            Ok(()) => ReconcileOutcome::Applied,
            Err(PlayError::Superseded) => {
                debug!(%source, "play request superseded");
                ReconcileOutcome::Applied
            }
            Err(e) => {
                warn!(%source, error = %e, "playback failed to start");
                ReconcileOutcome::PlaybackRejected(e)
            }
        }
    }
}
