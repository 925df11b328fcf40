//! Common error types for the Moodify services
//!
//! One taxonomy is shared by the store clients, the aggregation layer, and
//! the gateway so that callers can always distinguish "nothing found" from
//! "could not ask".

use thiserror::Error;
use uuid::Uuid;

/// Common result type for Moodify operations
pub type Result<T> = std::result::Result<T, Error>;

/// The four backing stores, named so upstream failures identify their origin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Catalog,
    Identity,
    Library,
    Collection,
}

impl std::fmt::Display for StoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StoreKind::Catalog => "catalog",
            StoreKind::Identity => "identity",
            StoreKind::Library => "library",
            StoreKind::Collection => "collection",
        };
        write!(f, "{}", name)
    }
}

/// Entity kinds involved in two-step create-then-link operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Song,
    Playlist,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Song => "song",
            EntityKind::Playlist => "playlist",
        };
        write!(f, "{}", name)
    }
}

/// Common error types across the Moodify services
#[derive(Error, Debug)]
pub enum Error {
    /// Caller input malformed (empty name, empty id list, missing field)
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Requested entity does not exist (single-entity lookups only)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or invalid session credential
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The owning store did not respond successfully.
    ///
    /// `status` is `None` for transport-level failures (timeout, refused
    /// connection) where no HTTP status was received.
    #[error("{store} store unavailable (status {status:?}): {message}")]
    Upstream {
        store: StoreKind,
        status: Option<u16>,
        message: String,
    },

    /// An entity was created in its owning store but the library-membership
    /// link step failed. Carries the created id so the caller can retry the
    /// link without recreating the entity.
    #[error("{entity} {id} created but not linked to library: {message}")]
    PartialLink {
        entity: EntityKind,
        id: Uuid,
        message: String,
    },

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Shorthand for an upstream failure with an HTTP status
    pub fn upstream(store: StoreKind, status: u16, message: impl Into<String>) -> Self {
        Error::Upstream {
            store,
            status: Some(status),
            message: message.into(),
        }
    }

    /// Shorthand for a transport-level upstream failure (no status received)
    pub fn transport(store: StoreKind, message: impl Into<String>) -> Self {
        Error::Upstream {
            store,
            status: None,
            message: message.into(),
        }
    }

    /// Stable discriminant string used in JSON error bodies
    pub fn discriminant(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation",
            Error::NotFound(_) => "not_found",
            Error::Unauthorized(_) => "unauthorized",
            Error::Upstream { .. } => "upstream_unavailable",
            Error::PartialLink { .. } => "partial_link",
            Error::Config(_) => "config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_display_names_the_store() {
        let err = Error::upstream(StoreKind::Library, 503, "connection reset");
        let text = err.to_string();
        assert!(text.contains("library"), "got: {}", text);
        assert!(text.contains("503"), "got: {}", text);
    }

    #[test]
    fn partial_link_carries_the_created_id() {
        let id = Uuid::new_v4();
        let err = Error::PartialLink {
            entity: EntityKind::Playlist,
            id,
            message: "library store timed out".to_string(),
        };
        assert!(err.to_string().contains(&id.to_string()));
        assert_eq!(err.discriminant(), "partial_link");
    }
}
