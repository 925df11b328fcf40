//! Store capability traits and their HTTP implementations
//!
//! One trait per owning store. The traits are object-safe and injected into
//! the [`Aggregator`](crate::aggregate::Aggregator) at construction, so
//! tests substitute the in-memory fakes and production wires up the reqwest
//! clients in this module.

use async_trait::async_trait;
use uuid::Uuid;

use moodify_common::models::{NewPlaylist, NewSong, Playlist, SessionToken, Song, User};
use moodify_common::Result;

mod catalog;
mod collection;
mod http;
mod identity;
mod library;

pub use catalog::HttpCatalogStore;
pub use collection::HttpCollectionStore;
pub use identity::HttpIdentityStore;
pub use library::HttpLibraryStore;

/// Catalog Store: owns song records and issues signed playback URLs at read
/// time.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Single-song lookup. Unknown id is `Error::NotFound`.
    async fn song(&self, id: Uuid) -> Result<Song>;

    /// Batch lookup. Returns full records for exactly the subset of `ids`
    /// that exist; unknown ids are omitted, never errored. Rejects an empty
    /// id list with `Error::Validation` before any network call.
    async fn songs_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Song>>;

    /// All songs in the catalog, each with a freshly signed playback URL.
    async fn all_songs(&self) -> Result<Vec<Song>>;

    /// Create a song record (the binary object is already in storage).
    async fn create_song(&self, song: NewSong) -> Result<Song>;

    /// Delete a song record by its storage path.
    async fn delete_song(&self, storage_path: &str) -> Result<()>;
}

/// Library Store: owns the per-user song and playlist membership relations.
#[async_trait]
pub trait LibraryStore: Send + Sync {
    /// Song ids in the user's library. Unknown user yields an empty list.
    async fn song_ids_for_user(&self, user_id: Uuid) -> Result<Vec<Uuid>>;

    /// Playlist ids in the user's library. Unknown user yields an empty list.
    async fn playlist_ids_for_user(&self, user_id: Uuid) -> Result<Vec<Uuid>>;

    /// Add a (user, song) membership pair. Idempotent: re-adding an existing
    /// pair is a no-op, never a duplicate row.
    async fn add_song(&self, user_id: Uuid, song_id: Uuid) -> Result<()>;

    /// Remove a (user, song) membership pair. No-op if absent.
    async fn remove_song(&self, user_id: Uuid, song_id: Uuid) -> Result<()>;

    /// Add a (user, playlist) membership pair. Idempotent.
    async fn add_playlist(&self, user_id: Uuid, playlist_id: Uuid) -> Result<()>;

    /// Remove a (user, playlist) membership pair. No-op if absent.
    async fn remove_playlist(&self, user_id: Uuid, playlist_id: Uuid) -> Result<()>;

    /// Remove every membership row referencing `song_id`, across all users.
    /// Used by the song-delete cascade.
    async fn purge_song(&self, song_id: Uuid) -> Result<()>;

    /// Remove every membership row referencing `playlist_id`, across all
    /// users. Used by the playlist-delete cascade.
    async fn purge_playlist(&self, playlist_id: Uuid) -> Result<()>;
}

/// Collection Store: owns playlists and the playlist-song join relation.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Create a playlist record.
    async fn create_playlist(&self, playlist: NewPlaylist) -> Result<Playlist>;

    /// Single-playlist lookup, without join rows. Unknown id is
    /// `Error::NotFound`.
    async fn playlist(&self, id: Uuid) -> Result<Playlist>;

    /// Batch lookup; unknown ids omitted. Rejects an empty id list.
    async fn playlists_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Playlist>>;

    /// Member song ids for one playlist (the join rows, unordered).
    async fn song_ids(&self, playlist_id: Uuid) -> Result<Vec<Uuid>>;

    /// Add join rows for one playlist. Re-adding an existing pair is a
    /// no-op. Rejects an empty song list.
    async fn add_songs(&self, playlist_id: Uuid, song_ids: &[Uuid]) -> Result<()>;

    /// Remove one join row. No-op if absent.
    async fn remove_song(&self, playlist_id: Uuid, song_id: Uuid) -> Result<()>;

    /// Remove all join rows for one playlist. Distinct from
    /// [`delete_playlist`](CollectionStore::delete_playlist) so the caller
    /// can order the two steps and surface which one failed.
    async fn clear_songs(&self, playlist_id: Uuid) -> Result<()>;

    /// Delete the playlist row itself (join rows must already be cleared).
    async fn delete_playlist(&self, playlist_id: Uuid) -> Result<()>;

    /// Remove every join row referencing `song_id`, across all playlists.
    /// Used by the song-delete cascade.
    async fn purge_song(&self, song_id: Uuid) -> Result<()>;
}

/// Identity Store: owns credentials and session issuance/validation.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Create an account and open a session.
    async fn register(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<(User, SessionToken)>;

    /// Open a session for an existing account.
    async fn login(&self, email: &str, password: &str) -> Result<(User, SessionToken)>;

    /// Resolve a session token to its user. Invalid or expired tokens are
    /// `Error::Unauthorized`.
    async fn verify(&self, token: &SessionToken) -> Result<User>;

    /// Invalidate a session.
    async fn logout(&self, token: &SessionToken) -> Result<()>;
}
