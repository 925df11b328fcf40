//! HTTP client for the Library Store
//!
//! REST surface:
//! - `GET /users/{id}/songs` → list of song ids
//! - `GET /users/{id}/playlists` → list of playlist ids
//! - `POST/DELETE /users/{id}/songs/{songId}`
//! - `POST/DELETE /users/{id}/playlists/{playlistId}`
//! - `DELETE /songs/{songId}`, `DELETE /playlists/{playlistId}` — purge a
//!   reference across all users (delete cascades)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use uuid::Uuid;

use moodify_common::{Result, StoreKind};

use super::http::StoreClient;
use super::LibraryStore;

pub struct HttpLibraryStore {
    client: StoreClient,
}

impl HttpLibraryStore {
    pub fn new(base_url: &str, timeout: Duration, service_token: Option<String>) -> Result<Self> {
        Ok(Self {
            client: StoreClient::new(StoreKind::Library, base_url, timeout, service_token)?,
        })
    }

    async fn id_list(&self, path: &str) -> Result<Vec<Uuid>> {
        let request = self.client.request(Method::GET, path);
        let response = self.client.send(request).await?;
        let response = self.client.expect_success(response).await?;
        self.client.json(response).await
    }
}

#[async_trait]
impl LibraryStore for HttpLibraryStore {
    async fn song_ids_for_user(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        self.id_list(&format!("/users/{}/songs", user_id)).await
    }

    async fn playlist_ids_for_user(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        self.id_list(&format!("/users/{}/playlists", user_id)).await
    }

    async fn add_song(&self, user_id: Uuid, song_id: Uuid) -> Result<()> {
        let request = self
            .client
            .request(Method::POST, &format!("/users/{}/songs/{}", user_id, song_id));
        let response = self.client.send(request).await?;
        // Duplicate pair reported by the store is an idempotent no-op
        self.client.expect_success_or_conflict(response).await?;
        Ok(())
    }

    async fn remove_song(&self, user_id: Uuid, song_id: Uuid) -> Result<()> {
        let request = self
            .client
            .request(Method::DELETE, &format!("/users/{}/songs/{}", user_id, song_id));
        let response = self.client.send(request).await?;
        self.client.expect_success(response).await?;
        Ok(())
    }

    async fn add_playlist(&self, user_id: Uuid, playlist_id: Uuid) -> Result<()> {
        let request = self.client.request(
            Method::POST,
            &format!("/users/{}/playlists/{}", user_id, playlist_id),
        );
        let response = self.client.send(request).await?;
        self.client.expect_success_or_conflict(response).await?;
        Ok(())
    }

    async fn remove_playlist(&self, user_id: Uuid, playlist_id: Uuid) -> Result<()> {
        let request = self.client.request(
            Method::DELETE,
            &format!("/users/{}/playlists/{}", user_id, playlist_id),
        );
        let response = self.client.send(request).await?;
        self.client.expect_success(response).await?;
        Ok(())
    }

    async fn purge_song(&self, song_id: Uuid) -> Result<()> {
        let request = self
            .client
            .request(Method::DELETE, &format!("/songs/{}", song_id));
        let response = self.client.send(request).await?;
        self.client.expect_success(response).await?;
        Ok(())
    }

    async fn purge_playlist(&self, playlist_id: Uuid) -> Result<()> {
        let request = self
            .client
            .request(Method::DELETE, &format!("/playlists/{}", playlist_id));
        let response = self.client.send(request).await?;
        self.client.expect_success(response).await?;
        Ok(())
    }
}
