//! Cross-store library aggregation
//!
//! The [`Aggregator`] answers "what are this user's songs and playlists,
//! fully hydrated" by composing the Library, Catalog, and Collection Stores,
//! and performs the multi-step mutations (create-then-link, ordered deletes)
//! that no single store can do alone. No transaction spans the stores;
//! partial failures are surfaced as typed errors with enough detail for the
//! caller to retry just the failed step.

use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use moodify_common::models::{NewPlaylist, NewSong, Playlist, Song};
use moodify_common::{EntityKind, Error, Result};

use crate::stores::{CatalogStore, CollectionStore, LibraryStore};

mod hydrate;

pub use hydrate::{LibraryOverview, PlaylistView};

/// How batch hydration reaches the owning store.
///
/// Batched is preferred whenever the store offers a batch endpoint; PerItem
/// falls back to capped-concurrency single-item fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationStrategy {
    Batched,
    PerItem,
}

/// A user's library as bare identifiers, deduplicated and unordered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryIds {
    pub songs: HashSet<Uuid>,
    pub playlists: HashSet<Uuid>,
}

/// Composes the three data-owning stores into hydrated library views
pub struct Aggregator {
    catalog: Arc<dyn CatalogStore>,
    library: Arc<dyn LibraryStore>,
    collection: Arc<dyn CollectionStore>,
    strategy: HydrationStrategy,
    concurrency: usize,
}

impl Aggregator {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        library: Arc<dyn LibraryStore>,
        collection: Arc<dyn CollectionStore>,
    ) -> Self {
        Self {
            catalog,
            library,
            collection,
            strategy: HydrationStrategy::Batched,
            concurrency: 4,
        }
    }

    /// Use per-item fallback hydration instead of batch calls
    pub fn with_strategy(mut self, strategy: HydrationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Cap for the parallel fan-out (per-playlist hydration, per-item
    /// fetches). Clamped to at least 1.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    // ========================================
    // Identifier resolution
    // ========================================

    /// Resolve the user's library to bare song and playlist ids.
    ///
    /// Unknown users yield empty sets. A Library Store failure propagates as
    /// a typed upstream error so callers can tell "empty library" from
    /// "could not ask".
    pub async fn resolve_library(&self, user_id: Uuid) -> Result<LibraryIds> {
        let songs = self.library.song_ids_for_user(user_id).await?;
        let playlists = self.library.playlist_ids_for_user(user_id).await?;

        let ids = LibraryIds {
            songs: songs.into_iter().collect(),
            playlists: playlists.into_iter().collect(),
        };
        tracing::debug!(
            user_id = %user_id,
            songs = ids.songs.len(),
            playlists = ids.playlists.len(),
            "Resolved library ids"
        );
        Ok(ids)
    }

    /// The whole catalog, each record with a freshly signed playback URL.
    /// Backs the browse page; not scoped to any user's library.
    pub async fn browse_catalog(&self) -> Result<Vec<Song>> {
        self.catalog.all_songs().await
    }

    // ========================================
    // Library mutation
    // ========================================

    /// Add a song to the user's library. Idempotent.
    pub async fn add_song_to_library(&self, user_id: Uuid, song_id: Uuid) -> Result<()> {
        self.library.add_song(user_id, song_id).await
    }

    /// Remove a song from the user's library. No-op if absent.
    pub async fn remove_song_from_library(&self, user_id: Uuid, song_id: Uuid) -> Result<()> {
        self.library.remove_song(user_id, song_id).await
    }

    /// Add a playlist to the user's library. Idempotent.
    pub async fn add_playlist_to_library(&self, user_id: Uuid, playlist_id: Uuid) -> Result<()> {
        self.library.add_playlist(user_id, playlist_id).await
    }

    /// Remove a playlist from the user's library. No-op if absent.
    pub async fn remove_playlist_from_library(&self, user_id: Uuid, playlist_id: Uuid) -> Result<()> {
        self.library.remove_playlist(user_id, playlist_id).await
    }

    /// Repeat only the link step of a failed create-then-link, given the
    /// entity id reported by the partial-link error.
    pub async fn retry_link(&self, user_id: Uuid, entity: EntityKind, id: Uuid) -> Result<()> {
        match entity {
            EntityKind::Song => self.library.add_song(user_id, id).await,
            EntityKind::Playlist => self.library.add_playlist(user_id, id).await,
        }
    }

    // ========================================
    // Two-step create-then-link
    // ========================================

    /// Create a song record in the Catalog Store, then link it into the
    /// user's library.
    ///
    /// If the link step fails the song still exists and is reachable by id;
    /// the returned `PartialLink` error carries that id so the caller can
    /// retry the link without recreating the record.
    pub async fn register_song_for_user(&self, user_id: Uuid, song: NewSong) -> Result<Song> {
        if song.title.trim().is_empty() {
            return Err(Error::Validation("song title is required".to_string()));
        }

        let created = self.catalog.create_song(song).await?;

        if let Err(e) = self.library.add_song(user_id, created.id).await {
            tracing::warn!(
                user_id = %user_id,
                song_id = %created.id,
                error = %e,
                "Song created but library link failed"
            );
            return Err(Error::PartialLink {
                entity: EntityKind::Song,
                id: created.id,
                message: e.to_string(),
            });
        }

        Ok(created)
    }

    /// Create a playlist, seed its initial songs, then link it into the
    /// user's library.
    ///
    /// Either follow-up failure leaves the playlist created; the
    /// `PartialLink` error carries its id for a retry of the failed step.
    pub async fn create_playlist_for_user(
        &self,
        user_id: Uuid,
        playlist: NewPlaylist,
        initial_song_ids: &[Uuid],
    ) -> Result<Playlist> {
        if playlist.name.trim().is_empty() {
            return Err(Error::Validation("playlist name is required".to_string()));
        }

        let created = self.collection.create_playlist(playlist).await?;

        if !initial_song_ids.is_empty() {
            if let Err(e) = self.collection.add_songs(created.id, initial_song_ids).await {
                return Err(Error::PartialLink {
                    entity: EntityKind::Playlist,
                    id: created.id,
                    message: format!("seeding initial songs failed: {}", e),
                });
            }
        }

        if let Err(e) = self.library.add_playlist(user_id, created.id).await {
            tracing::warn!(
                user_id = %user_id,
                playlist_id = %created.id,
                error = %e,
                "Playlist created but library link failed"
            );
            return Err(Error::PartialLink {
                entity: EntityKind::Playlist,
                id: created.id,
                message: e.to_string(),
            });
        }

        Ok(created)
    }

    // ========================================
    // Playlist-song membership
    // ========================================

    /// Add songs to a playlist's join table. Rejects an empty list.
    pub async fn add_songs_to_playlist(&self, playlist_id: Uuid, song_ids: &[Uuid]) -> Result<()> {
        if song_ids.is_empty() {
            return Err(Error::Validation("no songs provided".to_string()));
        }
        self.collection.add_songs(playlist_id, song_ids).await
    }

    /// Remove one song from a playlist. No-op if absent.
    pub async fn remove_song_from_playlist(&self, playlist_id: Uuid, song_id: Uuid) -> Result<()> {
        self.collection.remove_song(playlist_id, song_id).await
    }

    // ========================================
    // Ordered deletes (no automatic cascade in the stores)
    // ========================================

    /// Delete a playlist: join rows first, then the playlist row, then any
    /// user-library references. Each step's failure is surfaced with the
    /// step named, since a partial failure leaves the playlist either
    /// songless-looking or still visible.
    pub async fn delete_playlist(&self, playlist_id: Uuid) -> Result<()> {
        self.collection
            .clear_songs(playlist_id)
            .await
            .map_err(|e| step_failed(e, "clearing playlist songs"))?;

        self.collection
            .delete_playlist(playlist_id)
            .await
            .map_err(|e| step_failed(e, "deleting playlist row"))?;

        self.library
            .purge_playlist(playlist_id)
            .await
            .map_err(|e| step_failed(e, "purging library references"))?;

        tracing::info!(playlist_id = %playlist_id, "Deleted playlist and its memberships");
        Ok(())
    }

    /// Delete a song with explicit cascade: purge its playlist join rows and
    /// user-library rows, then delete the catalog record.
    ///
    /// Memberships are purged even when the catalog row is already gone, so
    /// a dangling id can be cleaned up by calling this again; the unknown id
    /// is still reported as not-found.
    pub async fn delete_song(&self, song_id: Uuid) -> Result<()> {
        self.collection
            .purge_song(song_id)
            .await
            .map_err(|e| step_failed(e, "purging playlist memberships"))?;

        self.library
            .purge_song(song_id)
            .await
            .map_err(|e| step_failed(e, "purging library memberships"))?;

        let song = self.catalog.song(song_id).await?;
        self.catalog
            .delete_song(&song.storage_path)
            .await
            .map_err(|e| step_failed(e, "deleting catalog record"))?;

        tracing::info!(song_id = %song_id, "Deleted song and its memberships");
        Ok(())
    }
}

/// Name the failed step of a multi-step mutation without losing the
/// underlying error kind.
fn step_failed(err: Error, step: &str) -> Error {
    match err {
        Error::Upstream {
            store,
            status,
            message,
        } => Error::Upstream {
            store,
            status,
            message: format!("{}: {}", step, message),
        },
        other => other,
    }
}
