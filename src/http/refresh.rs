//! Single-flight session refresh
//!
//! When an authenticated request comes back `401 Unauthorized`, the access
//! token has expired. Many requests are usually in flight at once, and each
//! of them will see the same 401. [`RefreshCoordinator`] makes sure only one
//! refresh call is made for all of them:
//!
//! ```text
//!            401 (initial attempt)              refresh ok
//!   Idle ─────────────────────────▶ Refreshing ───────────────▶ Idle
//!                                     │  ▲        replay queue (FIFO)
//!                         401 while   │  │
//!                         refreshing  └──┘ enqueue
//!                                           refresh failed
//!                                   ───────────────────────────▶ Idle
//!                                     invalidate session, then fail queue
//! ```
//!
//! Every request that hits a 401, including the one that started the
//! refresh, becomes a [`PendingRequest`] holding a one-shot responder. The
//! refresh and the replays run on a spawned task, so a caller that gives up
//! cannot strand the machine in `Refreshing`.
//!
//! The check-and-set of the state happens under a `std::sync::Mutex` that is
//! never held across an `.await`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::oneshot;

use crate::auth::session::SessionInvalidator;
use crate::auth::store::CredentialStore;
use crate::auth::types::{Envelope, RefreshRequest, TokenPair};
use crate::error::{ClientError, Result};
use crate::http::decorator::RequestDecorator;
use crate::http::dispatcher::Dispatcher;
use crate::http::request::{ApiRequest, ApiResponse, Attempt};

/// Path of the refresh endpoint, relative to the API base URL.
pub const REFRESH_PATH: &str = "/auth/refresh-token";

/// Refresh machine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    /// No refresh in flight.
    Idle,
    /// A refresh call is in flight; 401s are queued.
    Refreshing,
}

/// A caller suspended until the in-flight refresh settles.
#[derive(Debug)]
pub struct PendingRequest {
    request: ApiRequest,
    responder: oneshot::Sender<Result<ApiResponse>>,
}

#[derive(Debug)]
struct Cycle {
    state: RefreshState,
    queue: Vec<PendingRequest>,
}

/// What a 401 handler decided to do under the lock.
enum Admission {
    /// Joined (or started) the refresh cycle; wait on the receiver.
    Queued {
        receiver: oneshot::Receiver<Result<ApiResponse>>,
        start: Option<String>,
    },
    /// A refresh already replaced the token this request was sent with.
    ReplayNow(String),
    /// Nothing to refresh with.
    NoRefreshToken,
}

/// Coordinates token refresh for one client.
///
/// Owned by one [`AuthClient`](crate::http::AuthClient) (and shared by its
/// clones); separate clients never share a refresh cycle.
#[derive(Debug)]
pub struct RefreshCoordinator {
    dispatcher: Arc<dyn Dispatcher>,
    decorator: RequestDecorator,
    store: CredentialStore,
    invalidator: SessionInvalidator,
    refresh_path: String,
    cycle: Mutex<Cycle>,
    refresh_calls: AtomicU64,
}

impl RefreshCoordinator {
    /// Creates a coordinator in the `Idle` state.
    pub fn new(
        dispatcher: Arc<dyn Dispatcher>,
        decorator: RequestDecorator,
        store: CredentialStore,
        invalidator: SessionInvalidator,
    ) -> Self {
        Self {
            dispatcher,
            decorator,
            store,
            invalidator,
            refresh_path: REFRESH_PATH.to_string(),
            cycle: Mutex::new(Cycle {
                state: RefreshState::Idle,
                queue: Vec::new(),
            }),
            refresh_calls: AtomicU64::new(0),
        }
    }

    /// Overrides the refresh endpoint path.
    pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    /// Current state.
    pub fn state(&self) -> RefreshState {
        self.lock_cycle().state
    }

    /// Number of requests waiting on the in-flight refresh.
    pub fn queued(&self) -> usize {
        self.lock_cycle().queue.len()
    }

    /// Number of refresh calls issued so far.
    pub fn refresh_calls(&self) -> u64 {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    /// Recovers a request that failed with 401 on its initial attempt.
    ///
    /// `sent_with` is the access token the failed request carried. Resolves
    /// with the replayed response, or with the refresh error when the session
    /// could not be refreshed.
    pub async fn recover(
        self: &Arc<Self>,
        request: ApiRequest,
        sent_with: Option<String>,
    ) -> Result<ApiResponse> {
        let admission = self.admit(request.clone(), sent_with.as_deref());

        match admission {
            Admission::ReplayNow(token) => {
                tracing::debug!(
                    request_id = %request.id,
                    "Token already refreshed since dispatch; replaying directly"
                );
                self.replay(request, &token).await
            }
            Admission::NoRefreshToken => {
                tracing::warn!(
                    request_id = %request.id,
                    "Received 401 with no refresh token stored; ending session"
                );
                self.invalidator.invalidate();
                Err(ClientError::MissingRefreshToken)
            }
            Admission::Queued { receiver, start } => {
                if let Some(refresh_token) = start {
                    let coordinator = Arc::clone(self);
                    tokio::spawn(async move {
                        coordinator.run_cycle(refresh_token).await;
                    });
                }
                receiver.await.map_err(|_| {
                    ClientError::Authentication("session refresh was abandoned".to_string())
                })?
            }
        }
    }

    /// Synchronous check-and-set. No `.await` may happen in here.
    fn admit(&self, request: ApiRequest, sent_with: Option<&str>) -> Admission {
        let mut cycle = self.lock_cycle();

        if cycle.state == RefreshState::Refreshing {
            let (responder, receiver) = oneshot::channel();
            tracing::debug!(
                request_id = %request.id,
                position = cycle.queue.len(),
                "Refresh in flight; queueing request"
            );
            cycle.queue.push(PendingRequest { request, responder });
            return Admission::Queued {
                receiver,
                start: None,
            };
        }

        let current = self.read_or_none(self.store.access_token(), "access token");
        if let Some(current) = current {
            if sent_with != Some(current.as_str()) {
                return Admission::ReplayNow(current);
            }
        }

        let Some(refresh_token) = self.read_or_none(self.store.refresh_token(), "refresh token")
        else {
            return Admission::NoRefreshToken;
        };

        let (responder, receiver) = oneshot::channel();
        cycle.state = RefreshState::Refreshing;
        cycle.queue.push(PendingRequest { request, responder });
        Admission::Queued {
            receiver,
            start: Some(refresh_token),
        }
    }

    async fn run_cycle(self: Arc<Self>, refresh_token: String) {
        tracing::info!("Access token rejected; refreshing session");

        match self.refresh(&refresh_token).await {
            Ok(Some(tokens)) => {
                let pending = self.settle();
                tracing::info!(replays = pending.len(), "Session refreshed; replaying requests");

                // join_all polls in order, so replays are initiated FIFO.
                let token = tokens.access_token;
                let replays = pending.into_iter().map(|pending| {
                    let token = token.as_str();
                    let coordinator = &self;
                    async move {
                        let result = coordinator.replay(pending.request, token).await;
                        // The caller may have stopped waiting; that is fine.
                        let _ = pending.responder.send(result);
                    }
                });
                futures::future::join_all(replays).await;
            }
            Ok(None) => {
                let pending = self.settle();
                tracing::info!(
                    waiting = pending.len(),
                    "Session ended during refresh; discarding new tokens"
                );
                let error =
                    ClientError::Authentication("session ended while refreshing".to_string());
                for pending in pending {
                    let _ = pending.responder.send(Err(error.clone()));
                }
            }
            Err(error) => {
                tracing::warn!("Session refresh failed: {}", error);
                // Credentials go before the state leaves Refreshing, so a 401
                // racing this arm queues up instead of refreshing with the
                // rejected token.
                self.invalidator.invalidate();
                let pending = self.settle();
                tracing::debug!(waiting = pending.len(), "Failing queued requests");
                for pending in pending {
                    let _ = pending.responder.send(Err(error.clone()));
                }
            }
        }
    }

    /// Calls the refresh endpoint and persists the new pair.
    ///
    /// Resolves to `None` when the session was ended or replaced while the
    /// call was in flight; the minted pair is discarded.
    async fn refresh(&self, refresh_token: &str) -> Result<Option<TokenPair>> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);

        let request = ApiRequest::post(self.refresh_path.as_str()).json(&RefreshRequest {
            refresh_token,
        })?;
        let request = self.decorator.decorate_anonymous(&request);

        let response = self.dispatcher.send(&request).await?.error_for_status()?;
        let envelope: Envelope<TokenPair> = response.json().map_err(|e| {
            ClientError::Authentication(format!("malformed refresh response: {}", e))
        })?;
        let tokens = envelope.data;
        if tokens.access_token.is_empty() {
            return Err(ClientError::Authentication(
                "refresh response carried an empty access token".to_string(),
            ));
        }

        // Save only if the session that was refreshed is still the stored one.
        self.invalidator.exclusive(|| -> Result<Option<TokenPair>> {
            if self.store.refresh_token()?.as_deref() != Some(refresh_token) {
                return Ok(None);
            }
            self.store.save_tokens(&tokens)?;
            Ok(Some(tokens))
        })
    }

    /// Re-sends `request` with `token`; a 401 here is final.
    async fn replay(&self, request: ApiRequest, token: &str) -> Result<ApiResponse> {
        let request = request.with_attempt(Attempt::Replay);
        let request = self.decorator.decorate_with_token(&request, Some(token));
        let response = self.dispatcher.send(&request).await?;
        if response.is_unauthorized() {
            tracing::warn!(
                request_id = %request.id,
                "Request rejected again after refresh; not retrying"
            );
        }
        response.error_for_status()
    }

    /// Drains the queue and returns to `Idle` in one step.
    fn settle(&self) -> Vec<PendingRequest> {
        let mut cycle = self.lock_cycle();
        cycle.state = RefreshState::Idle;
        std::mem::take(&mut cycle.queue)
    }

    fn lock_cycle(&self) -> MutexGuard<'_, Cycle> {
        // Nothing panics while holding the lock, but stay usable if it did.
        match self.cycle.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn read_or_none(&self, value: Result<Option<String>>, what: &str) -> Option<String> {
        value.unwrap_or_else(|e| {
            tracing::warn!("Could not read stored {}: {}", what, e);
            None
        })
    }
}
