//! Song endpoints
//!
//! Records only; the binary upload happens at the Catalog Store boundary.
//! Deletion cascades through every membership table before the catalog row
//! goes away.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use uuid::Uuid;

use moodify_common::api::MessageResponse;
use moodify_common::models::{NewSong, Song, User};
use moodify_common::Error;

use crate::AppState;

use super::ApiError;

/// GET /api/songs — browse the whole catalog
pub async fn browse(State(state): State<AppState>) -> Result<Json<Vec<Song>>, ApiError> {
    let songs = state.agg.browse_catalog().await?;
    Ok(Json(songs))
}

/// POST /api/songs — create the record and link it to the caller's library
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(body): Json<NewSong>,
) -> Result<Json<Song>, ApiError> {
    if body.title.trim().is_empty() || body.storage_path.trim().is_empty() {
        return Err(Error::Validation("title and storage path are required".to_string()).into());
    }

    let song = state.agg.register_song_for_user(user.id, body).await?;
    Ok(Json(song))
}

/// DELETE /api/songs/:song_id — cascading delete
pub async fn delete(
    State(state): State<AppState>,
    Path(song_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.agg.delete_song(song_id).await?;
    Ok(Json(MessageResponse {
        message: "song deleted".to_string(),
    }))
}
