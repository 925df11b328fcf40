//! moodify-gw library - Aggregation Gateway
//!
//! Thin HTTP gateway over the four Moodify stores. Every request is
//! authenticated against the Identity Store, then answered by the
//! aggregation layer; the gateway itself keeps no state between requests.

use std::sync::Arc;

use axum::Router;

use moodify_agg::stores::IdentityStore;
use moodify_agg::Aggregator;

pub mod api;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Cross-store aggregation layer
    pub agg: Arc<Aggregator>,
    /// Identity Store used by the auth middleware and /auth routes
    pub identity: Arc<dyn IdentityStore>,
}

impl AppState {
    pub fn new(agg: Arc<Aggregator>, identity: Arc<dyn IdentityStore>) -> Self {
        Self { agg, identity }
    }
}

/// Build application router
///
/// Everything under `/api` requires a valid session; `/health` and the
/// `/auth` routes do not.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{delete, get, post};

    let protected = Router::new()
        .route("/api/library", get(api::library::get_overview))
        .route("/api/library/songs", get(api::library::get_songs))
        .route("/api/library/playlists", get(api::library::get_playlists))
        .route(
            "/api/library/songs/:song_id",
            post(api::library::add_song).delete(api::library::remove_song),
        )
        .route(
            "/api/library/playlists/:playlist_id",
            post(api::library::add_playlist).delete(api::library::remove_playlist),
        )
        .route("/api/songs", get(api::songs::browse).post(api::songs::create))
        .route("/api/songs/:song_id", delete(api::songs::delete))
        .route("/api/playlists", post(api::playlists::create))
        .route(
            "/api/playlists/:playlist_id",
            get(api::playlists::get).delete(api::playlists::delete),
        )
        .route(
            "/api/playlists/:playlist_id/add-songs",
            post(api::playlists::add_songs),
        )
        .route(
            "/api/playlists/:playlist_id/remove-song/:song_id",
            delete(api::playlists::remove_song),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth::auth_middleware,
        ));

    let public = Router::new()
        .route("/health", get(api::health::health_check))
        .route("/auth/register", post(api::auth::register))
        .route("/auth/login", post(api::auth::login))
        .route("/auth/logout", post(api::auth::logout));

    Router::new().merge(protected).merge(public).with_state(state)
}
