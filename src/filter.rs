//! Search filtering over the canonical track list.

use crate::catalog::Track;

/// Indices of the tracks whose title or artist contains `term`,
/// case-insensitively. An empty term keeps everything.
///
/// The result is an order-preserving subsequence of `tracks`.
pub fn filter_indices(tracks: &[Track], term: &str) -> Vec<usize> {
    if term.is_empty() {
        return (0..tracks.len()).collect();
    }

    let needle = term.to_lowercase();
    tracks
        .iter()
        .enumerate()
        .filter(|(_, t)| matches(t, &needle))
        .map(|(i, _)| i)
        .collect()
}

fn matches(track: &Track, needle_lower: &str) -> bool {
    track.title.to_lowercase().contains(needle_lower)
        || track.artist.to_lowercase().contains(needle_lower)
}
