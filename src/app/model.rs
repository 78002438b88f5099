//! Application model types: `App` and `LoadState`.
//!
//! The `App` struct holds the canonical catalog, the search-derived view of
//! it, the list cursor and the playback controller used by the UI and runtime.

use tracing::debug;

use crate::audio::{AudioOutput, PlayError};
use crate::catalog::Track;
use crate::filter::filter_indices;
use crate::gateway::GatewayResolver;
use crate::player::{PlaybackController, ReconcileOutcome};

/// Catalog lifecycle. There is exactly one load per session.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Loading,
    Ready,
    Failed(String),
}

/// The main application model.
pub struct App {
    pub load_state: LoadState,
    /// Canonical list, replaced wholesale when the load resolves.
    pub tracks: Vec<Track>,
    /// Indices into `tracks` matching `search_term`, in catalog order.
    pub filtered: Vec<usize>,
    pub search_term: String,
    /// Whether keystrokes currently edit the search term.
    pub search_mode: bool,
    /// Highlighted row in the filtered view.
    pub cursor: usize,
    pub controller: PlaybackController,
    pub metadata_window: bool,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Materialize the filtered view from its parts, so callers can borrow the
/// controller mutably at the same time.
fn view_of<'a>(tracks: &'a [Track], filtered: &[usize]) -> Vec<&'a Track> {
    filtered.iter().filter_map(|&i| tracks.get(i)).collect()
}

impl App {
    /// Create an empty `App` waiting for the catalog.
    pub fn new() -> Self {
        Self {
            load_state: LoadState::Loading,
            tracks: Vec::new(),
            filtered: Vec::new(),
            search_term: String::new(),
            search_mode: false,
            cursor: 0,
            controller: PlaybackController::new(),
            metadata_window: false,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.load_state == LoadState::Ready
    }

    /// Install the result of the catalog load.
    pub fn finish_loading(&mut self, result: Result<Vec<Track>, String>) {
        match result {
            Ok(tracks) => {
                self.tracks = tracks;
                self.load_state = LoadState::Ready;
            }
            Err(message) => {
                self.tracks.clear();
                self.load_state = LoadState::Failed(message);
            }
        }
        self.refilter();
    }

    /// The filtered list, as track references.
    pub fn view(&self) -> Vec<&Track> {
        view_of(&self.tracks, &self.filtered)
    }

    /// Recompute the filtered view from scratch.
    fn refilter(&mut self) {
        self.filtered = filter_indices(&self.tracks, &self.search_term);
        self.ensure_cursor_visible();
    }

    /// Keep the cursor on the playing track when it is visible, otherwise
    /// inside the view.
    fn ensure_cursor_visible(&mut self) {
        if let Some(pos) = self.current_index() {
            self.cursor = pos;
        } else if self.cursor >= self.filtered.len() {
            self.cursor = 0;
        }
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.refilter();
    }

    /// Enter search mode: keystrokes edit the term.
    pub fn enter_search_mode(&mut self) {
        self.search_mode = true;
    }
    /// Leave search mode and keep the current term.
    pub fn exit_search_mode(&mut self) {
        self.search_mode = false;
    }
    /// Clear the search term and leave search mode.
    pub fn clear_search(&mut self) {
        self.search_mode = false;
        self.set_search_term(String::new());
    }
    /// Append a character to the search term and refresh the view.
    pub fn push_search_char(&mut self, c: char) {
        self.search_term.push(c);
        self.refilter();
    }
    /// Remove the last character from the search term and refresh the view.
    pub fn pop_search_char(&mut self) {
        self.search_term.pop();
        self.refilter();
    }

    pub fn cursor_track(&self) -> Option<&Track> {
        self.filtered.get(self.cursor).and_then(|&i| self.tracks.get(i))
    }

    /// Move the cursor down, wrapping to the first row.
    pub fn cursor_down(&mut self) {
        if !self.filtered.is_empty() {
            self.cursor = (self.cursor + 1) % self.filtered.len();
        }
    }

    /// Move the cursor up, wrapping to the last row.
    pub fn cursor_up(&mut self) {
        let len = self.filtered.len();
        if len > 0 {
            self.cursor = (self.cursor + len - 1) % len;
        }
    }

    pub fn cursor_top(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_bottom(&mut self) {
        self.cursor = self.filtered.len().saturating_sub(1);
    }

    pub fn current_index(&self) -> Option<usize> {
        self.controller.current_index(&self.view())
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.controller.current(&self.view())
    }

    pub fn is_playing(&self) -> bool {
        self.controller.is_playing()
    }

    /// Play the track under the cursor.
    pub fn select_at_cursor(&mut self) -> bool {
        let Some(id) = self.cursor_track().map(|t| t.id) else {
            return false;
        };
        let view = view_of(&self.tracks, &self.filtered);
        self.controller.select(id, &view)
    }

    pub fn toggle_play_pause(&mut self) {
        let view = view_of(&self.tracks, &self.filtered);
        self.controller.toggle_play_pause(&view);
        self.follow_current();
    }

    pub fn next(&mut self) {
        let view = view_of(&self.tracks, &self.filtered);
        self.controller.next(&view);
        self.follow_current();
    }

    pub fn previous(&mut self) {
        let view = view_of(&self.tracks, &self.filtered);
        self.controller.previous(&view);
        self.follow_current();
    }

    /// Whether an audio event about `source` still concerns the current track.
    fn is_applied_source(&self, source: &str) -> bool {
        self.controller.applied_source() == Some(source)
    }

    /// The output played `source` to the end.
    pub fn on_track_ended(&mut self, source: &str) {
        if !self.is_applied_source(source) {
            debug!(%source, "ignoring end of a replaced source");
            return;
        }
        self.next();
    }

    /// A play request for `source` failed after the output accepted it.
    pub fn on_play_failure(&mut self, source: &str, error: &PlayError) {
        if !self.is_applied_source(source) {
            debug!(%source, error = %error, "ignoring failure of a replaced source");
            return;
        }
        self.controller.on_play_failure(error);
    }

    /// Push the current play intent to `output`.
    pub fn sync<O: AudioOutput + ?Sized>(
        &mut self,
        gateway: &GatewayResolver,
        output: &mut O,
    ) -> ReconcileOutcome {
        let view = view_of(&self.tracks, &self.filtered);
        self.controller.sync(&view, gateway, output)
    }

    fn follow_current(&mut self) {
        if let Some(pos) = self.current_index() {
            self.cursor = pos;
        }
    }

    pub fn toggle_metadata_window(&mut self) {
        self.metadata_window = !self.metadata_window;
    }
}
