//! Shared plumbing for the reqwest-backed store clients
//!
//! Every client gets a dedicated `reqwest::Client` with a finite timeout,
//! attaches the service credential as a bearer token, and maps transport
//! failures and non-success statuses into the common error taxonomy.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use uuid::Uuid;

use moodify_common::{Error, Result, StoreKind};

pub(crate) struct StoreClient {
    http: reqwest::Client,
    base_url: String,
    store: StoreKind,
    service_token: Option<String>,
}

impl StoreClient {
    pub(crate) fn new(
        store: StoreKind,
        base_url: &str,
        timeout: Duration,
        service_token: Option<String>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
            service_token,
        })
    }

    /// Build a request for `path` (leading slash) with the service
    /// credential attached.
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.http.request(method, url);
        match &self.service_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request, mapping transport failures (timeout, refused
    /// connection) to `Error::Upstream` with no status. The response status
    /// is not checked here.
    pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        builder.send().await.map_err(|e| {
            let message = if e.is_timeout() {
                format!("request timed out: {}", e)
            } else {
                e.to_string()
            };
            Error::transport(self.store, message)
        })
    }

    /// Require a success status; anything else is `Error::Upstream`.
    pub(crate) async fn expect_success(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::upstream(self.store, status.as_u16(), body))
    }

    /// Like [`expect_success`](StoreClient::expect_success), but 404 maps to
    /// `Error::NotFound`. For single-entity lookups only.
    pub(crate) async fn expect_found(&self, response: Response, what: &str) -> Result<Response> {
        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(what.to_string()));
        }
        self.expect_success(response).await
    }

    /// Like [`expect_success`](StoreClient::expect_success), but 409 is
    /// treated as success. Used by membership adds, where a duplicate pair
    /// is an idempotent no-op.
    pub(crate) async fn expect_success_or_conflict(&self, response: Response) -> Result<Response> {
        if response.status() == StatusCode::CONFLICT {
            return Ok(response);
        }
        self.expect_success(response).await
    }

    /// Decode a JSON body, reporting decode failures as upstream errors.
    pub(crate) async fn json<T: serde::de::DeserializeOwned>(&self, response: Response) -> Result<T> {
        response
            .json()
            .await
            .map_err(|e| Error::transport(self.store, format!("invalid response body: {}", e)))
    }
}

/// Comma-separated id list for batch query parameters
pub(crate) fn ids_param(ids: &[Uuid]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
