//! Backend API client
//!
//! Signs and sends conferencing API calls to a single backend and decodes
//! the reply into the response model.
//!
//! A call to `resource` with query string `query` goes to
//!
//! ```text
//! {host}/api/{resource}?{query}&checksum={sha256_hex(resource + query + secret)}
//! ```
//!
//! The transport headers of the HTTP response are carried on the decoded
//! [`Reply`].

use std::time::Duration;

use bytes::Bytes;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::backend::store::BackendState;
use crate::shared::bbb::{Reply, ResponseKind};
use crate::shared::DecodeError;

/// Failure of a single backend call
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend answered with HTTP {0}")]
    Status(u16),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Checksum authenticating an API call
pub fn checksum(resource: &str, query: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(resource.as_bytes());
    hasher.update(query.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Signed URL of an API call
pub fn api_url(host: &str, secret: &str, resource: &str, query: &str) -> String {
    let sum = checksum(resource, query, secret);
    let host = host.trim_end_matches('/');
    if query.is_empty() {
        format!("{}/api/{}?checksum={}", host, resource, sum)
    } else {
        format!("{}/api/{}?{}&checksum={}", host, resource, query, sum)
    }
}

/// HTTP client for backend API calls
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
}

impl BackendClient {
    /// Create a client whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    /// Wrap an existing `reqwest` client
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Call `kind` on `backend` with a GET request
    ///
    /// # Arguments
    ///
    /// * `backend` - Target backend; its host and secret sign the call
    /// * `kind` - API operation
    /// * `query` - URL encoded query string without checksum
    pub async fn call(
        &self,
        backend: &BackendState,
        kind: ResponseKind,
        query: &str,
    ) -> Result<Reply, ClientError> {
        let url = api_url(&backend.host, &backend.secret, kind.resource(), query);
        tracing::debug!(backend_id = %backend.id, resource = %kind, "Calling backend");

        let response = self.http.get(url).send().await?;
        decode_response(kind, response).await
    }

    /// Call `kind` on `backend` with a POST request carrying `body`
    ///
    /// Used by operations that upload documents (`setConfigXML`,
    /// `putRecordingTextTrack`).
    pub async fn post(
        &self,
        backend: &BackendState,
        kind: ResponseKind,
        query: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<Reply, ClientError> {
        let url = api_url(&backend.host, &backend.secret, kind.resource(), query);
        tracing::debug!(backend_id = %backend.id, resource = %kind, "Posting to backend");

        let response = self
            .http
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await?;
        decode_response(kind, response).await
    }
}

async fn decode_response(kind: ResponseKind, response: reqwest::Response) -> Result<Reply, ClientError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::Status(status.as_u16()));
    }

    let header = response.headers().clone();
    let body = response.bytes().await?;
    Ok(Reply::decode(kind, &body)?.with_header(header))
}
