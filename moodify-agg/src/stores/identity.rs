//! HTTP client for the Identity Store
//!
//! REST surface:
//! - `POST /auth/register`, `POST /auth/login` → user + session token
//! - `GET /auth/verify` (bearer token) → current user or 401
//! - `POST /auth/logout`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};

use moodify_common::api::{LoginRequest, RegisterRequest, SessionResponse};
use moodify_common::models::{SessionToken, User};
use moodify_common::{Error, Result, StoreKind};

use super::http::StoreClient;
use super::IdentityStore;

pub struct HttpIdentityStore {
    client: StoreClient,
}

impl HttpIdentityStore {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        // Identity calls carry the end-user credential, not the service one
        Ok(Self {
            client: StoreClient::new(StoreKind::Identity, base_url, timeout, None)?,
        })
    }

    async fn session(&self, path: &str, body: &impl serde::Serialize) -> Result<(User, SessionToken)> {
        let request = self.client.request(Method::POST, path).json(body);
        let response = self.client.send(request).await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::BAD_REQUEST {
            let message = response.text().await.unwrap_or_default();
            return Err(credential_error(status, message));
        }

        let response = self.client.expect_success(response).await?;
        let session: SessionResponse = self.client.json(response).await?;
        Ok((session.user, SessionToken(session.token)))
    }
}

/// A 400 from the store means the request itself was malformed (duplicate
/// email, missing field); only a 401 means a bad credential.
fn credential_error(status: StatusCode, message: String) -> Error {
    if status == StatusCode::BAD_REQUEST {
        Error::Validation(message)
    } else {
        Error::Unauthorized(message)
    }
}

#[async_trait]
impl IdentityStore for HttpIdentityStore {
    async fn register(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<(User, SessionToken)> {
        let body = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            username: username.to_string(),
        };
        self.session("/auth/register", &body).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<(User, SessionToken)> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.session("/auth/login", &body).await
    }

    async fn verify(&self, token: &SessionToken) -> Result<User> {
        let request = self
            .client
            .request(Method::GET, "/auth/verify")
            .bearer_auth(token.as_str());
        let response = self.client.send(request).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized("invalid session".to_string()));
        }

        let response = self.client.expect_success(response).await?;
        self.client.json(response).await
    }

    async fn logout(&self, token: &SessionToken) -> Result<()> {
        let request = self
            .client
            .request(Method::POST, "/auth/logout")
            .bearer_auth(token.as_str());
        let response = self.client.send(request).await?;
        self.client.expect_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_maps_to_validation_not_unauthorized() {
        let err = credential_error(StatusCode::BAD_REQUEST, "user already exists".to_string());
        assert_eq!(err.discriminant(), "validation");

        let err = credential_error(StatusCode::UNAUTHORIZED, "invalid email or password".to_string());
        assert_eq!(err.discriminant(), "unauthorized");
    }
}
