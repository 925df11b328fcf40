//! Error-to-response mapping
//!
//! Status codes keep the taxonomy distinguishable at the HTTP level, and
//! every body carries the stable `error` discriminant plus the detail a
//! caller needs to react (failed store, unlinked entity id).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use moodify_common::api::ErrorBody;
use moodify_common::Error;

/// Wrapper giving the common error taxonomy an HTTP rendering
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Upstream { .. } => StatusCode::BAD_GATEWAY,
            // entity created, link missing; the body carries the id to retry
            Error::PartialLink { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }

        (status, Json(ErrorBody::from_error(&self.0))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodify_common::StoreKind;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        let cases = [
            (Error::Validation("x".into()), StatusCode::BAD_REQUEST),
            (Error::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (Error::NotFound("x".into()), StatusCode::NOT_FOUND),
            (
                Error::upstream(StoreKind::Catalog, 500, "x"),
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (err, expected) in cases {
            let response = ApiError(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
