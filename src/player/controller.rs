use tracing::{debug, info, warn};

use crate::audio::{AudioOutput, PlayError};
use crate::catalog::{Track, TrackId};
use crate::gateway::GatewayResolver;

use super::reconcile::{DesiredPlayback, ReconcileOutcome, Reconciler};

/// Play intent over the current filtered view.
///
/// Every transition takes the view it should act on; the current position is
/// always derived by looking the selected id up in that view, and a selected
/// track that is filtered out counts as "no current track".
#[derive(Debug, Clone, Default)]
pub struct PlaybackController {
    selected: Option<TrackId>,
    is_playing: bool,
    reconciler: Reconciler,
}

impl PlaybackController {
    pub fn new() -> Self {
        Self {
            selected: None,
            is_playing: false,
            reconciler: Reconciler::new(),
        }
    }

    pub fn selected_id(&self) -> Option<TrackId> {
        self.selected
    }

    /// Play intent; may differ from what the output is actually doing while
    /// a source is loading.
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Position of the selected track in `view`.
    pub fn current_index(&self, view: &[&Track]) -> Option<usize> {
        let id = self.selected?;
        view.iter().position(|t| t.id == id)
    }

    pub fn current<'a>(&self, view: &[&'a Track]) -> Option<&'a Track> {
        self.current_index(view).map(|i| view[i])
    }

    /// Select `track_id` and start playing it. Ids not in `view` are ignored.
    pub fn select(&mut self, track_id: TrackId, view: &[&Track]) -> bool {
        if !view.iter().any(|t| t.id == track_id) {
            return false;
        }
        self.selected = Some(track_id);
        self.is_playing = true;
        true
    }

    /// Flip play/pause, or start the first track when nothing is current.
    pub fn toggle_play_pause(&mut self, view: &[&Track]) {
        if self.current_index(view).is_some() {
            self.is_playing = !self.is_playing;
        } else if let Some(first) = view.first() {
            self.selected = Some(first.id);
            self.is_playing = true;
        }
    }

    /// Advance to the next track, wrapping to the start. Also used when a
    /// track plays to its end.
    pub fn next(&mut self, view: &[&Track]) {
        self.step(view, 1);
    }

    /// Go back one track, wrapping to the end.
    pub fn previous(&mut self, view: &[&Track]) {
        self.step(view, view.len().saturating_sub(1));
    }

    fn step(&mut self, view: &[&Track], offset: usize) {
        let Some(pos) = self.current_index(view) else {
            return;
        };
        let target = view[(pos + offset) % view.len()];
        self.selected = Some(target.id);
        self.is_playing = true;
    }

    /// Apply the failure policy to a play request that failed after it was
    /// accepted by the output.
    pub fn on_play_failure(&mut self, error: &PlayError) {
        match error {
            PlayError::Superseded => debug!("play request superseded"),
            other => {
                warn!(error = %other, "playback failed");
                self.is_playing = false;
            }
        }
    }

    /// What the output should be doing for `view`.
    pub fn desired(&self, view: &[&Track], gateway: &GatewayResolver) -> DesiredPlayback {
        match self.current(view) {
            Some(track) => DesiredPlayback {
                track: Some(track.id),
                source: Some(gateway.resolve(Some(&track.audio_uri))),
                playing: self.is_playing,
            },
            None => DesiredPlayback::default(),
        }
    }

    /// URL last pushed to the output; events about any other source are stale.
    pub fn applied_source(&self) -> Option<&str> {
        self.reconciler.applied_source()
    }

    /// Reconcile `output` with the current intent. Run after every transition.
    pub fn sync<O: AudioOutput + ?Sized>(
        &mut self,
        view: &[&Track],
        gateway: &GatewayResolver,
        output: &mut O,
    ) -> ReconcileOutcome {
        let desired = self.desired(view, gateway);
        let outcome = self.reconciler.reconcile(&desired, output);

        match &outcome {
            ReconcileOutcome::PlaybackRejected(_) => self.is_playing = false,
            ReconcileOutcome::Applied => {
                if let Some(track) = self.current(view) {
                    info!(
                        id = track.id,
                        title = %track.title,
                        artist = %track.artist,
                        playing = self.is_playing,
                        "playback updated"
                    );
                }
            }
            ReconcileOutcome::Unchanged => {}
        }
        outcome
    }
}
