//! HTTP client for the Catalog Store
//!
//! REST surface:
//! - `GET /songs?ids=<comma-separated>` — batch lookup
//! - `GET /songs` — full catalog
//! - `GET /songs/{id}` — single lookup
//! - `POST /songs` — create record
//! - `DELETE /songs/{storagePath}` — delete record
//!
//! Signed playback URLs are issued by the store at read time; this client
//! never caches them.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use uuid::Uuid;

use moodify_common::models::{NewSong, Song};
use moodify_common::{Error, Result, StoreKind};

use super::http::{ids_param, StoreClient};
use super::CatalogStore;

pub struct HttpCatalogStore {
    client: StoreClient,
}

impl HttpCatalogStore {
    pub fn new(base_url: &str, timeout: Duration, service_token: Option<String>) -> Result<Self> {
        Ok(Self {
            client: StoreClient::new(StoreKind::Catalog, base_url, timeout, service_token)?,
        })
    }
}

#[async_trait]
impl CatalogStore for HttpCatalogStore {
    async fn song(&self, id: Uuid) -> Result<Song> {
        let request = self.client.request(Method::GET, &format!("/songs/{}", id));
        let response = self.client.send(request).await?;
        let response = self
            .client
            .expect_found(response, &format!("song {}", id))
            .await?;
        self.client.json(response).await
    }

    async fn songs_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Song>> {
        if ids.is_empty() {
            return Err(Error::Validation("no song ids provided".to_string()));
        }

        let request = self
            .client
            .request(Method::GET, "/songs")
            .query(&[("ids", ids_param(ids))]);
        let response = self.client.send(request).await?;
        let response = self.client.expect_success(response).await?;
        let songs: Vec<Song> = self.client.json(response).await?;

        tracing::debug!(
            requested = ids.len(),
            returned = songs.len(),
            "Batch song lookup"
        );
        Ok(songs)
    }

    async fn all_songs(&self) -> Result<Vec<Song>> {
        let request = self.client.request(Method::GET, "/songs");
        let response = self.client.send(request).await?;
        let response = self.client.expect_success(response).await?;
        self.client.json(response).await
    }

    async fn create_song(&self, song: NewSong) -> Result<Song> {
        let request = self.client.request(Method::POST, "/songs").json(&song);
        let response = self.client.send(request).await?;
        let response = self.client.expect_success(response).await?;
        let created: Song = self.client.json(response).await?;

        tracing::info!(song_id = %created.id, title = %created.title, "Created song record");
        Ok(created)
    }

    async fn delete_song(&self, storage_path: &str) -> Result<()> {
        let request = self
            .client
            .request(Method::DELETE, &format!("/songs/{}", storage_path));
        let response = self.client.send(request).await?;
        self.client.expect_success(response).await?;
        Ok(())
    }
}
