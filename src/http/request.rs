//! Request and response values passed through the client pipeline
//!
//! [`ApiRequest`] is a plain, cloneable description of one API call. It is
//! never mutated in place by the pipeline: the decorator produces a decorated
//! copy, and a replay is a fresh copy marked [`Attempt::Replay`]. This keeps
//! the "already retried" marker explicit instead of hiding it in shared state.

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{ClientError, Result};

/// Which authentication cycle a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Attempt {
    /// First dispatch; a 401 may trigger a session refresh.
    #[default]
    Initial,
    /// Re-sent after a refresh; a 401 is surfaced to the caller as-is.
    Replay,
}

impl Attempt {
    /// Returns `true` for [`Attempt::Replay`].
    pub fn is_replay(self) -> bool {
        matches!(self, Self::Replay)
    }
}

/// One outbound API call.
///
/// # Examples
///
/// ```
/// use unionsite::http::ApiRequest;
///
/// let request = ApiRequest::post("/news")
///     .json(&serde_json::json!({ "title": "Welcome week" }))
///     .unwrap()
///     .query("draft", "true");
///
/// assert_eq!(request.method.as_str(), "POST");
/// assert_eq!(request.path, "/news");
/// assert!(request.bearer_token().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// Identifier used to correlate log lines for this call and its replay.
    pub id: Uuid,
    /// HTTP method.
    pub method: Method,
    /// Path relative to the API base URL (or an absolute URL).
    pub path: String,
    /// Query string parameters, in order.
    pub query: Vec<(String, String)>,
    /// Request headers.
    pub headers: HeaderMap,
    /// Raw request body.
    pub body: Option<Bytes>,
    /// Authentication cycle marker.
    pub attempt: Attempt,
}

impl ApiRequest {
    /// Creates a request with no body, headers, or query parameters.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
            attempt: Attempt::Initial,
        }
    }

    /// `GET` request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// `POST` request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// `PUT` request.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// `PATCH` request.
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// `DELETE` request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Serializes `body` as JSON and sets `Content-Type: application/json`.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let bytes = serde_json::to_vec(body)?;
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.body = Some(Bytes::from(bytes));
        Ok(self)
    }

    /// Sets a raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Appends a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Sets a header, replacing any previous value.
    pub fn header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ClientError::InvalidRequest(format!("invalid header name {name:?}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ClientError::InvalidRequest(format!("invalid header value: {e}")))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Returns a copy marked as belonging to the given cycle.
    pub fn with_attempt(mut self, attempt: Attempt) -> Self {
        self.attempt = attempt;
        self
    }

    /// Returns the token carried in `Authorization: Bearer <token>`, if any.
    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
    }
}

/// A complete HTTP response with its body buffered.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Bytes,
}

impl ApiResponse {
    /// Creates a response with no headers.
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns `true` for `401 Unauthorized`.
    pub fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED
    }

    /// Body decoded as UTF-8 (lossy).
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body deserialized from JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Converts a non-2xx response into [`ClientError::Status`].
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ClientError::Status {
                status: self.status.as_u16(),
                body: self.text(),
            })
        }
    }
}
