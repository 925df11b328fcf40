//! Shared API request/response types
//!
//! Types exchanged between the gateway and its callers, and between the
//! gateway and the backing stores. Kept here so the HTTP store clients and
//! the gateway handlers agree on the wire shapes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

/// JSON error body returned by the gateway on every failure path.
///
/// `error` is a stable discriminant string (`validation`, `not_found`,
/// `unauthorized`, `upstream_unavailable`, `partial_link`) so callers can
/// distinguish "empty" from "could not determine" and can retry a failed
/// link step without recreating the entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    /// Which backing store failed (upstream errors only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
    /// Entity kind for partial-link failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    /// Created-but-unlinked entity id for partial-link failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
}

impl ErrorBody {
    pub fn from_error(err: &Error) -> Self {
        let mut body = ErrorBody {
            error: err.discriminant().to_string(),
            message: err.to_string(),
            store: None,
            entity: None,
            id: None,
        };
        match err {
            Error::Upstream { store, .. } => {
                body.store = Some(store.to_string());
            }
            Error::PartialLink { entity, id, .. } => {
                body.entity = Some(entity.to_string());
                body.id = Some(*id);
            }
            _ => {}
        }
        body
    }
}

/// POST /auth/register body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub username: String,
}

/// POST /auth/login body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Register/login response: the user plus an opaque session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user: crate::models::User,
    pub token: String,
}

/// POST /api/playlists body.
///
/// `song_ids` seeds the new playlist's membership in the same request, as a
/// convenience over a create followed by an add-songs call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub song_ids: Vec<Uuid>,
}

/// Generic acknowledgement body for mutations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EntityKind, StoreKind};

    #[test]
    fn error_body_identifies_failed_store() {
        let err = Error::upstream(StoreKind::Catalog, 500, "boom");
        let body = ErrorBody::from_error(&err);
        assert_eq!(body.error, "upstream_unavailable");
        assert_eq!(body.store.as_deref(), Some("catalog"));
        assert!(body.id.is_none());
    }

    #[test]
    fn error_body_exposes_unlinked_entity_id() {
        let id = Uuid::new_v4();
        let err = Error::PartialLink {
            entity: EntityKind::Song,
            id,
            message: "link failed".to_string(),
        };
        let body = ErrorBody::from_error(&err);
        assert_eq!(body.error, "partial_link");
        assert_eq!(body.entity.as_deref(), Some("song"));
        assert_eq!(body.id, Some(id));
    }
}
