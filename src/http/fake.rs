//! In-process fake dispatcher for unit tests
//!
//! [`FakeDispatcher`] answers every request with a scripted closure and
//! records what it was asked to send, in dispatch order. The record is taken
//! on the first poll of `send`, which is the moment a real transport would
//! start writing to the wire.

use std::sync::Mutex;
use std::time::Duration;

use reqwest::StatusCode;

use crate::error::Result;
use crate::http::dispatcher::Dispatcher;
use crate::http::refresh::REFRESH_PATH;
use crate::http::request::{ApiRequest, ApiResponse};

type Responder = Box<dyn Fn(&ApiRequest) -> Result<ApiResponse> + Send + Sync>;

/// Scripted [`Dispatcher`] recording every call.
pub struct FakeDispatcher {
    responder: Responder,
    calls: Mutex<Vec<ApiRequest>>,
    delays: Vec<(String, Duration)>,
}

impl std::fmt::Debug for FakeDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeDispatcher")
            .field("calls", &self.calls().len())
            .finish_non_exhaustive()
    }
}

impl FakeDispatcher {
    /// Creates a dispatcher answering with `responder`.
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&ApiRequest) -> Result<ApiResponse> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
            delays: Vec::new(),
        }
    }

    /// Holds every response for `path` back by `delay`.
    pub fn with_delay(mut self, path: impl Into<String>, delay: Duration) -> Self {
        self.delays.push((path.into(), delay));
        self
    }

    /// A server where `T2` is the only valid access token.
    ///
    /// The refresh endpoint always mints `T2`/`R2`; every other path answers
    /// `200` with `{"path": <path>}` for `Bearer T2` and `401` otherwise.
    pub fn token_server() -> Self {
        Self::new(|request| {
            if request.path == REFRESH_PATH {
                return Ok(ApiResponse::new(
                    StatusCode::OK,
                    r#"{"data":{"accessToken":"T2","refreshToken":"R2"}}"#,
                ));
            }
            if request.bearer_token() == Some("T2") {
                let body = serde_json::json!({ "path": request.path }).to_string();
                Ok(ApiResponse::new(StatusCode::OK, body))
            } else {
                Ok(ApiResponse::new(StatusCode::UNAUTHORIZED, "token expired"))
            }
        })
    }

    /// Every request sent so far, in dispatch order.
    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// The most recent request.
    pub fn last_call(&self) -> Option<ApiRequest> {
        self.calls().pop()
    }

    /// Number of requests sent to `path`.
    pub fn count(&self, path: &str) -> usize {
        self.calls().iter().filter(|c| c.path == path).count()
    }
}

#[async_trait::async_trait]
impl Dispatcher for FakeDispatcher {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.clone());
        }
        if let Some((_, delay)) = self.delays.iter().find(|(path, _)| *path == request.path) {
            tokio::time::sleep(*delay).await;
        }
        (self.responder)(request)
    }
}
