//! Batch hydration and the full library fan-out
//!
//! Hydration turns bare identifiers into full records by asking the owning
//! store. Unknown ids are omitted from results, never errored; a failed
//! call propagates a typed error so "nothing found" stays distinguishable
//! from "could not ask". The full-library fan-out hydrates playlists in
//! parallel under a concurrency cap, and one playlist's failure never
//! aborts its siblings.

use std::collections::HashSet;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use uuid::Uuid;

use moodify_common::models::{Playlist, Song};
use moodify_common::{Error, Result};

use super::{Aggregator, HydrationStrategy};

/// One playlist in a library overview, hydrated as far as possible.
///
/// `error` is set when this playlist's hydration failed; its siblings are
/// unaffected. Dangling song references are dropped silently, so
/// `songs.len()` may be less than `playlist.song_ids.len()`.
#[derive(Debug, Clone, Serialize)]
pub struct PlaylistView {
    #[serde(flatten)]
    pub playlist: Playlist,
    pub songs: Vec<Song>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A user's fully hydrated library
#[derive(Debug, Clone, Serialize)]
pub struct LibraryOverview {
    pub songs: Vec<Song>,
    pub playlists: Vec<PlaylistView>,
}

impl Aggregator {
    /// Hydrate song ids into full records with freshly signed playback URLs.
    ///
    /// Empty input short-circuits without a network call. The result
    /// contains at most one record per requested id; unknown ids are
    /// omitted.
    pub async fn hydrate_songs(&self, ids: &[Uuid]) -> Result<Vec<Song>> {
        let unique = dedupe(ids);
        if unique.is_empty() {
            return Ok(Vec::new());
        }

        let songs = match self.strategy {
            HydrationStrategy::Batched => {
                let requested: HashSet<Uuid> = unique.iter().copied().collect();
                let mut songs = self.catalog.songs_by_ids(&unique).await?;
                // result must stay within the requested id set
                songs.retain(|s| requested.contains(&s.id));
                songs
            }
            HydrationStrategy::PerItem => {
                let fetches = stream::iter(unique)
                    .map(|id| self.catalog.song(id))
                    .buffer_unordered(self.concurrency)
                    .collect::<Vec<_>>()
                    .await;
                collect_found(fetches)?
            }
        };

        Ok(songs)
    }

    /// Hydrate playlist ids into playlist records (join rows not included).
    pub async fn hydrate_playlists(&self, ids: &[Uuid]) -> Result<Vec<Playlist>> {
        let unique = dedupe(ids);
        if unique.is_empty() {
            return Ok(Vec::new());
        }

        let playlists = match self.strategy {
            HydrationStrategy::Batched => {
                let requested: HashSet<Uuid> = unique.iter().copied().collect();
                let mut playlists = self.collection.playlists_by_ids(&unique).await?;
                playlists.retain(|p| requested.contains(&p.id));
                playlists
            }
            HydrationStrategy::PerItem => {
                let fetches = stream::iter(unique)
                    .map(|id| self.collection.playlist(id))
                    .buffer_unordered(self.concurrency)
                    .collect::<Vec<_>>()
                    .await;
                collect_found(fetches)?
            }
        };

        Ok(playlists)
    }

    /// Hydrate one playlist with its member songs.
    ///
    /// Join rows referencing deleted songs are tolerated: the song is
    /// dropped from `songs` while its id remains in `song_ids`.
    pub async fn playlist_with_songs(&self, playlist_id: Uuid) -> Result<PlaylistView> {
        let mut playlist = self.collection.playlist(playlist_id).await?;
        playlist.song_ids = self.collection.song_ids(playlist_id).await?;

        let songs = self.hydrate_songs(&playlist.song_ids).await?;
        if songs.len() < playlist.song_ids.len() {
            tracing::debug!(
                playlist_id = %playlist_id,
                members = playlist.song_ids.len(),
                resolved = songs.len(),
                "Dropped dangling song references during hydration"
            );
        }

        Ok(PlaylistView {
            playlist,
            songs,
            error: None,
        })
    }

    /// Hydrate the user's entire library: songs plus every playlist with its
    /// members, fanned out under the concurrency cap.
    ///
    /// A single playlist's hydration failure is recorded in its `error` slot
    /// and does not abort the sibling playlists. Failures of the library
    /// resolution or the song hydration themselves still propagate, since
    /// without them there is no partial result worth returning.
    pub async fn library_overview(&self, user_id: Uuid) -> Result<LibraryOverview> {
        let ids = self.resolve_library(user_id).await?;

        let song_ids: Vec<Uuid> = ids.songs.iter().copied().collect();
        let songs = self.hydrate_songs(&song_ids).await?;

        let playlist_ids: Vec<Uuid> = ids.playlists.iter().copied().collect();
        let playlists = stream::iter(playlist_ids)
            .map(move |playlist_id| async move {
                match self.playlist_with_songs(playlist_id).await {
                    Ok(view) => view,
                    Err(e) => {
                        tracing::warn!(
                            playlist_id = %playlist_id,
                            error = %e,
                            "Playlist hydration failed; continuing with siblings"
                        );
                        PlaylistView {
                            playlist: Playlist {
                                id: playlist_id,
                                name: String::new(),
                                description: None,
                                song_ids: Vec::new(),
                            },
                            songs: Vec::new(),
                            error: Some(e.to_string()),
                        }
                    }
                }
            })
            .buffer_unordered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        Ok(LibraryOverview { songs, playlists })
    }
}

/// Deduplicate ids, preserving first-seen order
fn dedupe(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Keep found records, drop per-item not-found, propagate the first real
/// failure. The per-item fallback path's partial-tolerance policy.
fn collect_found<T>(results: Vec<Result<T>>) -> Result<Vec<T>> {
    let mut found = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(record) => found.push(record),
            Err(Error::NotFound(_)) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedupe_preserves_first_occurrence() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(dedupe(&[a, b, a, b, a]), vec![a, b]);
        assert!(dedupe(&[]).is_empty());
    }

    #[test]
    fn collect_found_drops_not_found_only() {
        let results: Vec<Result<u32>> = vec![
            Ok(1),
            Err(Error::NotFound("gone".to_string())),
            Ok(2),
        ];
        assert_eq!(collect_found(results).unwrap(), vec![1, 2]);

        let results: Vec<Result<u32>> = vec![
            Ok(1),
            Err(Error::Validation("bad".to_string())),
        ];
        assert!(collect_found(results).is_err());
    }
}
