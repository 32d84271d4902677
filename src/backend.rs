use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, header};
use serde_json::Value;
use thiserror::Error;

use crate::{
    context::{REQUEST_ID_HEADER, RequestContext},
    endpoints::ENDPOINTS,
    models::{DataEnvelope, User},
};

/// BackendError
///
/// Everything that can go wrong while reading from the backend API.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned {status} for {path}")]
    Status { status: u16, path: String },

    #[error("backend response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

impl BackendError {
    /// The HTTP status the backend answered with, when it answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            BackendError::Transport(err) => err.status().map(|status| status.as_u16()),
            BackendError::Decode(_) => None,
        }
    }
}

/// Backend Trait
///
/// The read-only contract this front end needs from the backend API. Page
/// handlers and the preloader only see this trait, so tests swap the HTTP
/// client for an in-memory mock.
///
/// **Send + Sync + async_trait** make `Arc<dyn Backend>` shareable across
/// axum's task boundaries.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Issues `GET {path}?{query}` on behalf of the caller described by `ctx`
    /// and returns the decoded JSON body.
    async fn get_json(
        &self,
        path: &str,
        query: &[(String, String)],
        ctx: &RequestContext,
    ) -> Result<Value, BackendError>;

    /// Reads `GET /auth/me`. `Ok(None)` means the backend answered but knows no user.
    async fn current_user(&self, ctx: &RequestContext) -> Result<Option<User>, BackendError> {
        let body = self.get_json(ENDPOINTS.auth.me(), &[], ctx).await?;
        let envelope: DataEnvelope<Option<User>> = serde_json::from_value(body)?;
        Ok(envelope.data)
    }
}

/// BackendState
///
/// The concrete type used to share backend access across the application state.
pub type BackendState = Arc<dyn Backend>;

/// HttpBackend
///
/// The real implementation, talking to the backend API over HTTP with reqwest.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Builds the pooled HTTP client. `timeout` bounds each request end to end.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(5)))
            .user_agent(concat!("discussion-portal/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn get_json(
        &self,
        path: &str,
        query: &[(String, String)],
        ctx: &RequestContext,
    ) -> Result<Value, BackendError> {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json");
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(cookie) = &ctx.cookie {
            request = request.header(header::COOKIE, cookie);
        }
        if let Some(request_id) = &ctx.request_id {
            request = request.header(REQUEST_ID_HEADER, request_id);
        }

        tracing::debug!(%url, "backend read");
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
