//! Playlist endpoints
//!
//! Creation is the two-step create-then-link: a link failure comes back as
//! a partial-link error carrying the new playlist id, so the caller retries
//! the link instead of creating a duplicate.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use uuid::Uuid;

use moodify_agg::PlaylistView;
use moodify_common::api::{CreatePlaylistRequest, MessageResponse};
use moodify_common::models::{NewPlaylist, Playlist, User};
use moodify_common::Error;

use crate::AppState;

use super::ApiError;

/// POST /api/playlists
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(body): Json<CreatePlaylistRequest>,
) -> Result<Json<Playlist>, ApiError> {
    if body.name.trim().is_empty() {
        return Err(Error::Validation("playlist name is required".to_string()).into());
    }

    let playlist = state
        .agg
        .create_playlist_for_user(
            user.id,
            NewPlaylist {
                name: body.name,
                description: body.description,
            },
            &body.song_ids,
        )
        .await?;
    Ok(Json(playlist))
}

/// GET /api/playlists/:playlist_id
pub async fn get(
    State(state): State<AppState>,
    Path(playlist_id): Path<Uuid>,
) -> Result<Json<PlaylistView>, ApiError> {
    let view = state.agg.playlist_with_songs(playlist_id).await?;
    Ok(Json(view))
}

/// POST /api/playlists/:playlist_id/add-songs
pub async fn add_songs(
    State(state): State<AppState>,
    Path(playlist_id): Path<Uuid>,
    Json(song_ids): Json<Vec<Uuid>>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.agg.add_songs_to_playlist(playlist_id, &song_ids).await?;
    Ok(Json(MessageResponse {
        message: "songs added".to_string(),
    }))
}

/// DELETE /api/playlists/:playlist_id/remove-song/:song_id
pub async fn remove_song(
    State(state): State<AppState>,
    Path((playlist_id, song_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .agg
        .remove_song_from_playlist(playlist_id, song_id)
        .await?;
    Ok(Json(MessageResponse {
        message: "song removed".to_string(),
    }))
}

/// DELETE /api/playlists/:playlist_id
pub async fn delete(
    State(state): State<AppState>,
    Path(playlist_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.agg.delete_playlist(playlist_id).await?;
    Ok(Json(MessageResponse {
        message: "playlist deleted".to_string(),
    }))
}
