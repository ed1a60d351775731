//! Typed HTTP client for the catalog API.
//!
//! Used by the dashboard forms ([`crate::forms`]), the integration tests and
//! operator tooling. Failures are classified by numeric status into
//! [`ErrorKind`]; the response text is kept for display only and is never
//! inspected.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use storedash_core::{EntityKind, ErrorKind, StoreId};

/// Errors that can occur while building a client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Base URL cannot carry a path.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// Token contains characters not allowed in a header.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// HTTP client failed to build.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A failed API call.
///
/// `status` is 0 when no response was received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status} {kind:?}: {message}")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub status: u16,
    pub message: String,
}

impl ApiError {
    /// A failure with no HTTP response (connection refused, bad JSON, ...).
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Internal,
            status: 0,
            message: message.into(),
        }
    }

    /// True for the 409 answer to a write on a locked row.
    #[must_use]
    pub fn is_lock_conflict(&self) -> bool {
        self.kind == ErrorKind::LockConflict
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::transport(e.to_string())
    }
}

/// Catalog mutations used by the dashboard forms.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// `POST /api/{storeId}/{entity}`
    async fn create(&self, kind: EntityKind, store: &StoreId, body: &Value)
    -> Result<Value, ApiError>;

    /// `PATCH /api/{storeId}/{entity}/{id}`
    async fn update(
        &self,
        kind: EntityKind,
        store: &StoreId,
        id: &str,
        body: &Value,
    ) -> Result<Value, ApiError>;

    /// `DELETE /api/{storeId}/{entity}/{id}`
    async fn delete(&self, kind: EntityKind, store: &StoreId, id: &str) -> Result<Value, ApiError>;
}

/// reqwest-backed catalog API client.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl CatalogClient {
    /// Create a client for `base_url`, optionally sending a caller token.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the URL cannot be a base or the HTTP client
    /// fails to build.
    pub fn new(base_url: &str, token: Option<&SecretString>) -> Result<Self, ClientError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ClientError::InvalidBaseUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
        }

        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| ClientError::InvalidToken(e.to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(CatalogClientInner { client, base_url }),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::transport("base URL cannot carry a path"))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    /// `GET /api/{storeId}/{entity}`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for non-2xx responses or transport failures.
    pub async fn list<T: DeserializeOwned>(
        &self,
        kind: EntityKind,
        store: &StoreId,
    ) -> Result<Vec<T>, ApiError> {
        let url = self.endpoint(&[store.as_str(), kind.segment()])?;
        let response = self.inner.client.get(url).send().await?;
        handle_response(response).await
    }

    /// `GET /api/{storeId}/{entity}/{id}`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for non-2xx responses or transport failures.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        kind: EntityKind,
        store: &StoreId,
        id: &str,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(&[store.as_str(), kind.segment(), id])?;
        let response = self.inner.client.get(url).send().await?;
        handle_response(response).await
    }

    /// `POST /api/stores`
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for non-2xx responses or transport failures.
    pub async fn create_store<B, T>(&self, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(&["stores"])?;
        let response = self.inner.client.post(url).json(body).send().await?;
        handle_response(response).await
    }
}

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn create(
        &self,
        kind: EntityKind,
        store: &StoreId,
        body: &Value,
    ) -> Result<Value, ApiError> {
        let url = self.endpoint(&[store.as_str(), kind.segment()])?;
        let response = self.inner.client.post(url).json(body).send().await?;
        handle_response(response).await
    }

    async fn update(
        &self,
        kind: EntityKind,
        store: &StoreId,
        id: &str,
        body: &Value,
    ) -> Result<Value, ApiError> {
        let url = self.endpoint(&[store.as_str(), kind.segment(), id])?;
        let response = self.inner.client.patch(url).json(body).send().await?;
        handle_response(response).await
    }

    async fn delete(&self, kind: EntityKind, store: &StoreId, id: &str) -> Result<Value, ApiError> {
        let url = self.endpoint(&[store.as_str(), kind.segment(), id])?;
        let response = self.inner.client.delete(url).send().await?;
        handle_response(response).await
    }
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Parse a success body, or classify the failure by status.
async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status().as_u16();

    match ErrorKind::from_status(status) {
        None => response
            .json()
            .await
            .map_err(|e| ApiError::transport(format!("failed to parse response: {e}"))),
        Some(kind) => {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| kind.public_message().to_string());
            Err(ApiError {
                kind,
                status,
                message,
            })
        }
    }
}
