//! # Moodify Common Library
//!
//! Shared code for the Moodify aggregation services:
//! - Entity models (User, Song, Playlist, memberships)
//! - Error taxonomy shared by the store clients and the gateway
//! - Gateway configuration loading
//! - API request/response types

pub mod api;
pub mod config;
pub mod error;
pub mod models;

pub use error::{EntityKind, Error, Result, StoreKind};
pub use models::{Mood, NewPlaylist, NewSong, Playlist, SessionToken, Song, User};
