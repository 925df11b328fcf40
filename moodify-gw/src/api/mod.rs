//! HTTP API handlers for moodify-gw

pub mod auth;
pub mod error;
pub mod health;
pub mod library;
pub mod playlists;
pub mod songs;

pub use error::ApiError;
