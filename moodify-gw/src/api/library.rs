//! Per-user library endpoints
//!
//! Reads return hydrated records; a failed hydration is an explicit error
//! response, never a silently empty list, so the UI can tell "no songs"
//! from "could not ask".

use axum::extract::{Path, State};
use axum::{Extension, Json};
use uuid::Uuid;

use moodify_agg::{LibraryOverview, PlaylistView};
use moodify_common::api::MessageResponse;
use moodify_common::models::{Song, User};

use crate::AppState;

use super::ApiError;

/// GET /api/library
pub async fn get_overview(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<LibraryOverview>, ApiError> {
    let overview = state.agg.library_overview(user.id).await?;
    Ok(Json(overview))
}

/// GET /api/library/songs
pub async fn get_songs(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<Song>>, ApiError> {
    let ids = state.agg.resolve_library(user.id).await?;
    let song_ids: Vec<Uuid> = ids.songs.into_iter().collect();
    let songs = state.agg.hydrate_songs(&song_ids).await?;
    Ok(Json(songs))
}

/// GET /api/library/playlists
pub async fn get_playlists(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<PlaylistView>>, ApiError> {
    let overview = state.agg.library_overview(user.id).await?;
    Ok(Json(overview.playlists))
}

/// POST /api/library/songs/:song_id
pub async fn add_song(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(song_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.agg.add_song_to_library(user.id, song_id).await?;
    Ok(Json(MessageResponse {
        message: "song added to library".to_string(),
    }))
}

/// DELETE /api/library/songs/:song_id
pub async fn remove_song(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(song_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.agg.remove_song_from_library(user.id, song_id).await?;
    Ok(Json(MessageResponse {
        message: "song removed from library".to_string(),
    }))
}

/// POST /api/library/playlists/:playlist_id
pub async fn add_playlist(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(playlist_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.agg.add_playlist_to_library(user.id, playlist_id).await?;
    Ok(Json(MessageResponse {
        message: "playlist added to library".to_string(),
    }))
}

/// DELETE /api/library/playlists/:playlist_id
pub async fn remove_playlist(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(playlist_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .agg
        .remove_playlist_from_library(user.id, playlist_id)
        .await?;
    Ok(Json(MessageResponse {
        message: "playlist removed from library".to_string(),
    }))
}
