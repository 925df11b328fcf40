//! HTTP client for the Collection Store
//!
//! REST surface:
//! - `POST /playlists` — create
//! - `GET /playlists/{id}`, `GET /playlists?ids=<comma-separated>`
//! - `GET /playlists/{id}/songs` — join rows
//! - `POST /playlists/{id}/add-songs`
//! - `DELETE /playlists/{id}/remove-song/{songId}`
//! - `DELETE /playlists/{id}/songs` — clear all join rows
//! - `DELETE /playlists/{id}` — delete the row
//! - `DELETE /playlists/purge-song/{songId}` — drop a song from every
//!   playlist (song-delete cascade)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use uuid::Uuid;

use moodify_common::models::{NewPlaylist, Playlist};
use moodify_common::{Error, Result, StoreKind};

use super::http::{ids_param, StoreClient};
use super::CollectionStore;

pub struct HttpCollectionStore {
    client: StoreClient,
}

impl HttpCollectionStore {
    pub fn new(base_url: &str, timeout: Duration, service_token: Option<String>) -> Result<Self> {
        Ok(Self {
            client: StoreClient::new(StoreKind::Collection, base_url, timeout, service_token)?,
        })
    }
}

#[async_trait]
impl CollectionStore for HttpCollectionStore {
    async fn create_playlist(&self, playlist: NewPlaylist) -> Result<Playlist> {
        if playlist.name.trim().is_empty() {
            return Err(Error::Validation("playlist name is required".to_string()));
        }

        let request = self
            .client
            .request(Method::POST, "/playlists")
            .json(&playlist);
        let response = self.client.send(request).await?;
        let response = self.client.expect_success(response).await?;
        let created: Playlist = self.client.json(response).await?;

        tracing::info!(playlist_id = %created.id, name = %created.name, "Created playlist");
        Ok(created)
    }

    async fn playlist(&self, id: Uuid) -> Result<Playlist> {
        let request = self
            .client
            .request(Method::GET, &format!("/playlists/{}", id));
        let response = self.client.send(request).await?;
        let response = self
            .client
            .expect_found(response, &format!("playlist {}", id))
            .await?;
        self.client.json(response).await
    }

    async fn playlists_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Playlist>> {
        if ids.is_empty() {
            return Err(Error::Validation("no playlist ids provided".to_string()));
        }

        let request = self
            .client
            .request(Method::GET, "/playlists")
            .query(&[("ids", ids_param(ids))]);
        let response = self.client.send(request).await?;
        let response = self.client.expect_success(response).await?;
        self.client.json(response).await
    }

    async fn song_ids(&self, playlist_id: Uuid) -> Result<Vec<Uuid>> {
        let request = self
            .client
            .request(Method::GET, &format!("/playlists/{}/songs", playlist_id));
        let response = self.client.send(request).await?;
        let response = self.client.expect_success(response).await?;
        self.client.json(response).await
    }

    async fn add_songs(&self, playlist_id: Uuid, song_ids: &[Uuid]) -> Result<()> {
        if song_ids.is_empty() {
            return Err(Error::Validation("no songs provided".to_string()));
        }

        let request = self
            .client
            .request(Method::POST, &format!("/playlists/{}/add-songs", playlist_id))
            .json(&song_ids);
        let response = self.client.send(request).await?;
        self.client.expect_success_or_conflict(response).await?;
        Ok(())
    }

    async fn remove_song(&self, playlist_id: Uuid, song_id: Uuid) -> Result<()> {
        let request = self.client.request(
            Method::DELETE,
            &format!("/playlists/{}/remove-song/{}", playlist_id, song_id),
        );
        let response = self.client.send(request).await?;
        self.client.expect_success(response).await?;
        Ok(())
    }

    async fn clear_songs(&self, playlist_id: Uuid) -> Result<()> {
        let request = self
            .client
            .request(Method::DELETE, &format!("/playlists/{}/songs", playlist_id));
        let response = self.client.send(request).await?;
        self.client.expect_success(response).await?;
        Ok(())
    }

    async fn delete_playlist(&self, playlist_id: Uuid) -> Result<()> {
        let request = self
            .client
            .request(Method::DELETE, &format!("/playlists/{}", playlist_id));
        let response = self.client.send(request).await?;
        self.client.expect_success(response).await?;
        Ok(())
    }

    async fn purge_song(&self, song_id: Uuid) -> Result<()> {
        let request = self.client.request(
            Method::DELETE,
            &format!("/playlists/purge-song/{}", song_id),
        );
        let response = self.client.send(request).await?;
        self.client.expect_success(response).await?;
        Ok(())
    }
}
