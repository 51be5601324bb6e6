//! Request transport
//!
//! The [`Dispatcher`] trait is the seam between the authentication pipeline
//! and the network. It sends exactly what it is given and returns whatever
//! the server answered; any HTTP status, including 401, is a successful
//! transport result. Retrying and re-authenticating are the refresh
//! coordinator's business, never the dispatcher's.
//!
//! [`ReqwestDispatcher`] is the production implementation.

use std::time::Duration;

use url::Url;

use crate::error::{ClientError, Result};
use crate::http::request::{ApiRequest, ApiResponse};

/// Sends one request and returns the buffered response.
#[async_trait::async_trait]
pub trait Dispatcher: Send + Sync + std::fmt::Debug {
    /// Sends `request` as-is.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] or [`ClientError::Timeout`] when no
    /// response was received, and [`ClientError::InvalidRequest`] when the
    /// request could not be built.
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse>;
}

/// [`Dispatcher`] backed by a `reqwest` client.
///
/// Relative request paths are resolved against the API base URL; absolute
/// `http(s)://` paths are used unchanged. The timeout applies to each call
/// independently.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use unionsite::http::ReqwestDispatcher;
///
/// let dispatcher = ReqwestDispatcher::new("http://localhost:8080/api", Duration::from_secs(30))
///     .unwrap();
/// assert_eq!(
///     dispatcher.resolve("/auth/refresh-token").unwrap().as_str(),
///     "http://localhost:8080/api/auth/refresh-token"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestDispatcher {
    http: reqwest::Client,
    base_url: Url,
}

impl ReqwestDispatcher {
    /// Creates a dispatcher for `base_url` with a per-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the base URL does not parse or the
    /// HTTP client cannot be initialised.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Self::with_client(http, base_url)
    }

    /// Creates a dispatcher around an existing `reqwest` client.
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ClientError::Config(format!("Invalid API base URL {base_url:?}: {e}")))?;
        Ok(Self { http, base_url })
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves a request path against the base URL.
    ///
    /// The base URL's own path is kept: `/auth/me` against
    /// `https://host/api` yields `https://host/api/auth/me`.
    pub fn resolve(&self, path: &str) -> Result<Url> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Url::parse(path)
                .map_err(|e| ClientError::InvalidRequest(format!("invalid URL {path:?}: {e}")));
        }

        let base = self.base_url.as_str().trim_end_matches('/');
        let joined = format!("{}/{}", base, path.trim_start_matches('/'));
        Url::parse(&joined)
            .map_err(|e| ClientError::InvalidRequest(format!("invalid path {path:?}: {e}")))
    }
}

#[async_trait::async_trait]
impl Dispatcher for ReqwestDispatcher {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let url = self.resolve(&request.path)?;

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .headers(request.headers.clone());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        tracing::debug!(
            request_id = %request.id,
            method = %request.method,
            path = %request.path,
            attempt = ?request.attempt,
            "Dispatching request"
        );

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(request_id = %request.id, "Request failed: {}", e);
            ClientError::from(e)
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        tracing::debug!(request_id = %request.id, status = status.as_u16(), "Response received");

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}
