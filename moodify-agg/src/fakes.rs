//! In-memory fake stores for testing
//!
//! Each fake enforces the same contracts as the HTTP clients: membership
//! pairs are unique sets, batch lookups omit unknown ids, empty id lists
//! are rejected before any work, and signed URLs are derived at read time.
//! Failure flags let tests drive the upstream-failure and partial-link
//! paths without a network.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use moodify_common::models::{NewPlaylist, NewSong, Playlist, SessionToken, Song, User};
use moodify_common::{Error, Result, StoreKind};

use crate::stores::{CatalogStore, CollectionStore, IdentityStore, LibraryStore};

fn unavailable(store: StoreKind) -> Error {
    Error::upstream(store, 503, "injected failure")
}

// ========================================
// Catalog
// ========================================

#[derive(Default)]
struct CatalogState {
    songs: HashMap<Uuid, Song>,
    missing_objects: HashSet<String>,
}

/// In-memory Catalog Store
#[derive(Default)]
pub struct FakeCatalog {
    state: Mutex<CatalogState>,
    batch_calls: AtomicUsize,
    fail_requests: AtomicBool,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a song record directly, returning its id
    pub fn seed_song(&self, title: &str, artist: &str, mood: moodify_common::Mood) -> Song {
        let id = Uuid::new_v4();
        let song = Song {
            id,
            title: title.to_string(),
            artist: artist.to_string(),
            mood,
            storage_path: format!("songs/{}.mp3", id),
            content_type: "audio/mpeg".to_string(),
            signed_url: None,
        };
        self.state
            .lock()
            .unwrap()
            .songs
            .insert(id, song.clone());
        song
    }

    /// Mark a storage object as missing; reads of that song get a null
    /// signed URL instead of failing
    pub fn mark_object_missing(&self, storage_path: &str) {
        self.state
            .lock()
            .unwrap()
            .missing_objects
            .insert(storage_path.to_string());
    }

    pub fn set_fail_requests(&self, fail: bool) {
        self.fail_requests.store(fail, Ordering::SeqCst);
    }

    /// How many batch lookups have been issued (empty-input short-circuit
    /// assertions)
    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.state.lock().unwrap().songs.contains_key(&id)
    }

    fn check_available(&self) -> Result<()> {
        if self.fail_requests.load(Ordering::SeqCst) {
            return Err(unavailable(StoreKind::Catalog));
        }
        Ok(())
    }

    fn signed(state: &CatalogState, song: &Song) -> Song {
        let mut song = song.clone();
        song.signed_url = if state.missing_objects.contains(&song.storage_path) {
            None
        } else {
            Some(format!(
                "https://storage.test/{}?expires=3600",
                song.storage_path
            ))
        };
        song
    }
}

#[async_trait]
impl CatalogStore for FakeCatalog {
    async fn song(&self, id: Uuid) -> Result<Song> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        state
            .songs
            .get(&id)
            .map(|s| Self::signed(&state, s))
            .ok_or_else(|| Error::NotFound(format!("song {}", id)))
    }

    async fn songs_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Song>> {
        if ids.is_empty() {
            return Err(Error::Validation("no song ids provided".to_string()));
        }
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let state = self.state.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| state.songs.get(id).map(|s| Self::signed(&state, s)))
            .collect())
    }

    async fn all_songs(&self) -> Result<Vec<Song>> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .songs
            .values()
            .map(|s| Self::signed(&state, s))
            .collect())
    }

    async fn create_song(&self, song: NewSong) -> Result<Song> {
        self.check_available()?;
        let created = Song {
            id: Uuid::new_v4(),
            title: song.title,
            artist: song.artist,
            mood: song.mood,
            storage_path: song.storage_path,
            content_type: song.content_type,
            signed_url: None,
        };
        self.state
            .lock()
            .unwrap()
            .songs
            .insert(created.id, created.clone());
        Ok(created)
    }

    async fn delete_song(&self, storage_path: &str) -> Result<()> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();
        state.songs.retain(|_, s| s.storage_path != storage_path);
        Ok(())
    }
}

// ========================================
// Library
// ========================================

#[derive(Default)]
struct LibraryState {
    user_songs: HashSet<(Uuid, Uuid)>,
    user_playlists: HashSet<(Uuid, Uuid)>,
}

/// In-memory Library Store (per-user membership pairs)
#[derive(Default)]
pub struct FakeLibrary {
    state: Mutex<LibraryState>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FakeLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Fail only mutations; reads keep working. Drives the partial-link
    /// path where the entity is created but the link step fails.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn song_row_count(&self, song_id: Uuid) -> usize {
        self.state
            .lock()
            .unwrap()
            .user_songs
            .iter()
            .filter(|(_, s)| *s == song_id)
            .count()
    }

    pub fn playlist_row_count(&self, playlist_id: Uuid) -> usize {
        self.state
            .lock()
            .unwrap()
            .user_playlists
            .iter()
            .filter(|(_, p)| *p == playlist_id)
            .count()
    }

    fn check_read(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(unavailable(StoreKind::Library));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(unavailable(StoreKind::Library));
        }
        Ok(())
    }
}

#[async_trait]
impl LibraryStore for FakeLibrary {
    async fn song_ids_for_user(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        self.check_read()?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .user_songs
            .iter()
            .filter(|(u, _)| *u == user_id)
            .map(|(_, s)| *s)
            .collect())
    }

    async fn playlist_ids_for_user(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        self.check_read()?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .user_playlists
            .iter()
            .filter(|(u, _)| *u == user_id)
            .map(|(_, p)| *p)
            .collect())
    }

    async fn add_song(&self, user_id: Uuid, song_id: Uuid) -> Result<()> {
        self.check_write()?;
        // HashSet insert: duplicate add converges to one row
        self.state
            .lock()
            .unwrap()
            .user_songs
            .insert((user_id, song_id));
        Ok(())
    }

    async fn remove_song(&self, user_id: Uuid, song_id: Uuid) -> Result<()> {
        self.check_write()?;
        self.state
            .lock()
            .unwrap()
            .user_songs
            .remove(&(user_id, song_id));
        Ok(())
    }

    async fn add_playlist(&self, user_id: Uuid, playlist_id: Uuid) -> Result<()> {
        self.check_write()?;
        self.state
            .lock()
            .unwrap()
            .user_playlists
            .insert((user_id, playlist_id));
        Ok(())
    }

    async fn remove_playlist(&self, user_id: Uuid, playlist_id: Uuid) -> Result<()> {
        self.check_write()?;
        self.state
            .lock()
            .unwrap()
            .user_playlists
            .remove(&(user_id, playlist_id));
        Ok(())
    }

    async fn purge_song(&self, song_id: Uuid) -> Result<()> {
        self.check_write()?;
        self.state
            .lock()
            .unwrap()
            .user_songs
            .retain(|(_, s)| *s != song_id);
        Ok(())
    }

    async fn purge_playlist(&self, playlist_id: Uuid) -> Result<()> {
        self.check_write()?;
        self.state
            .lock()
            .unwrap()
            .user_playlists
            .retain(|(_, p)| *p != playlist_id);
        Ok(())
    }
}

// ========================================
// Collection
// ========================================

#[derive(Default)]
struct CollectionState {
    playlists: HashMap<Uuid, Playlist>,
    playlist_songs: HashSet<(Uuid, Uuid)>,
}

/// In-memory Collection Store (playlists + playlist-song join rows)
#[derive(Default)]
pub struct FakeCollection {
    state: Mutex<CollectionState>,
    fail_requests: AtomicBool,
    fail_delete_row: AtomicBool,
}

impl FakeCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_requests(&self, fail: bool) {
        self.fail_requests.store(fail, Ordering::SeqCst);
    }

    /// Fail only the playlist-row delete, so tests can observe the ordered
    /// two-step delete surfacing which step failed
    pub fn set_fail_delete_row(&self, fail: bool) {
        self.fail_delete_row.store(fail, Ordering::SeqCst);
    }

    pub fn contains(&self, playlist_id: Uuid) -> bool {
        self.state
            .lock()
            .unwrap()
            .playlists
            .contains_key(&playlist_id)
    }

    pub fn membership_count(&self, playlist_id: Uuid) -> usize {
        self.state
            .lock()
            .unwrap()
            .playlist_songs
            .iter()
            .filter(|(p, _)| *p == playlist_id)
            .count()
    }

    fn check_available(&self) -> Result<()> {
        if self.fail_requests.load(Ordering::SeqCst) {
            return Err(unavailable(StoreKind::Collection));
        }
        Ok(())
    }
}

#[async_trait]
impl CollectionStore for FakeCollection {
    async fn create_playlist(&self, playlist: NewPlaylist) -> Result<Playlist> {
        self.check_available()?;
        if playlist.name.trim().is_empty() {
            return Err(Error::Validation("playlist name is required".to_string()));
        }
        let created = Playlist {
            id: Uuid::new_v4(),
            name: playlist.name,
            description: playlist.description,
            song_ids: Vec::new(),
        };
        self.state
            .lock()
            .unwrap()
            .playlists
            .insert(created.id, created.clone());
        Ok(created)
    }

    async fn playlist(&self, id: Uuid) -> Result<Playlist> {
        self.check_available()?;
        self.state
            .lock()
            .unwrap()
            .playlists
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("playlist {}", id)))
    }

    async fn playlists_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Playlist>> {
        if ids.is_empty() {
            return Err(Error::Validation("no playlist ids provided".to_string()));
        }
        self.check_available()?;
        let state = self.state.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| state.playlists.get(id).cloned())
            .collect())
    }

    async fn song_ids(&self, playlist_id: Uuid) -> Result<Vec<Uuid>> {
        self.check_available()?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .playlist_songs
            .iter()
            .filter(|(p, _)| *p == playlist_id)
            .map(|(_, s)| *s)
            .collect())
    }

    async fn add_songs(&self, playlist_id: Uuid, song_ids: &[Uuid]) -> Result<()> {
        if song_ids.is_empty() {
            return Err(Error::Validation("no songs provided".to_string()));
        }
        self.check_available()?;
        let mut state = self.state.lock().unwrap();
        for song_id in song_ids {
            state.playlist_songs.insert((playlist_id, *song_id));
        }
        Ok(())
    }

    async fn remove_song(&self, playlist_id: Uuid, song_id: Uuid) -> Result<()> {
        self.check_available()?;
        self.state
            .lock()
            .unwrap()
            .playlist_songs
            .remove(&(playlist_id, song_id));
        Ok(())
    }

    async fn clear_songs(&self, playlist_id: Uuid) -> Result<()> {
        self.check_available()?;
        self.state
            .lock()
            .unwrap()
            .playlist_songs
            .retain(|(p, _)| *p != playlist_id);
        Ok(())
    }

    async fn delete_playlist(&self, playlist_id: Uuid) -> Result<()> {
        self.check_available()?;
        if self.fail_delete_row.load(Ordering::SeqCst) {
            return Err(unavailable(StoreKind::Collection));
        }
        self.state.lock().unwrap().playlists.remove(&playlist_id);
        Ok(())
    }

    async fn purge_song(&self, song_id: Uuid) -> Result<()> {
        self.check_available()?;
        self.state
            .lock()
            .unwrap()
            .playlist_songs
            .retain(|(_, s)| *s != song_id);
        Ok(())
    }
}

// ========================================
// Identity
// ========================================

#[derive(Default)]
struct IdentityState {
    users: HashMap<Uuid, User>,
    credentials: HashMap<String, (Uuid, String)>,
    sessions: HashMap<String, Uuid>,
}

/// In-memory Identity Store
#[derive(Default)]
pub struct FakeIdentity {
    state: Mutex<IdentityState>,
}

impl FakeIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a user with an open session, for tests that skip the
    /// register/login flow
    pub fn seed_session(&self, username: &str, email: &str) -> (User, SessionToken) {
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
        };
        let token = format!("session-{}", Uuid::new_v4());
        let mut state = self.state.lock().unwrap();
        state.users.insert(user.id, user.clone());
        state.sessions.insert(token.clone(), user.id);
        (user, SessionToken(token))
    }
}

#[async_trait]
impl IdentityStore for FakeIdentity {
    async fn register(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<(User, SessionToken)> {
        let mut state = self.state.lock().unwrap();
        if state.credentials.contains_key(email) {
            return Err(Error::Validation("user already exists".to_string()));
        }
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
        };
        let token = format!("session-{}", Uuid::new_v4());
        state
            .credentials
            .insert(email.to_string(), (user.id, password.to_string()));
        state.users.insert(user.id, user.clone());
        state.sessions.insert(token.clone(), user.id);
        Ok((user, SessionToken(token)))
    }

    async fn login(&self, email: &str, password: &str) -> Result<(User, SessionToken)> {
        let mut state = self.state.lock().unwrap();
        let (user_id, stored) = state
            .credentials
            .get(email)
            .cloned()
            .ok_or_else(|| Error::Unauthorized("invalid email or password".to_string()))?;
        if stored != password {
            return Err(Error::Unauthorized("invalid email or password".to_string()));
        }
        let user = state.users[&user_id].clone();
        let token = format!("session-{}", Uuid::new_v4());
        state.sessions.insert(token.clone(), user_id);
        Ok((user, SessionToken(token)))
    }

    async fn verify(&self, token: &SessionToken) -> Result<User> {
        let state = self.state.lock().unwrap();
        let user_id = state
            .sessions
            .get(token.as_str())
            .ok_or_else(|| Error::Unauthorized("invalid session".to_string()))?;
        Ok(state.users[user_id].clone())
    }

    async fn logout(&self, token: &SessionToken) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.sessions.remove(token.as_str());
        Ok(())
    }
}
