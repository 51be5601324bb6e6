//! Session invalidation
//!
//! When a session cannot be recovered (the refresh call failed, or the user
//! logged out) every stored credential is removed and the application is sent
//! back to its login route. [`SessionInvalidator`] owns that transition; the
//! actual "go to the login screen" side effect is delegated to a
//! [`Navigator`] supplied by the embedding application.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::auth::store::CredentialStore;

/// Default route of the unauthenticated entry point.
pub const DEFAULT_LOGIN_ROUTE: &str = "/login";

/// Moves the application to another route.
///
/// Implemented by the embedding application: a web shell changes location, a
/// terminal front-end prints a hint, tests record the call.
pub trait Navigator: Send + Sync + std::fmt::Debug {
    /// Transitions to `route`.
    fn navigate(&self, route: &str);
}

/// Navigator that only logs the transition.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, route: &str) {
        tracing::info!(route, "Session ended; navigating to login");
    }
}

/// Clears credentials and redirects to the login route.
///
/// Invalidation is idempotent: when nothing is stored the call neither fails
/// nor redirects again.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use unionsite::auth::session::{LogNavigator, SessionInvalidator};
/// use unionsite::auth::store::CredentialStore;
/// use unionsite::auth::types::TokenPair;
///
/// let store = CredentialStore::in_memory();
/// store.save_tokens(&TokenPair::new("T1", "R1")).unwrap();
///
/// let invalidator = SessionInvalidator::new(store.clone(), Arc::new(LogNavigator), "/login");
/// assert!(invalidator.invalidate());
/// assert!(!invalidator.invalidate());
/// assert!(store.access_token().unwrap().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct SessionInvalidator {
    store: CredentialStore,
    navigator: Arc<dyn Navigator>,
    login_route: String,
    // Makes check-clear-redirect a single step across clones.
    gate: Arc<Mutex<()>>,
}

impl SessionInvalidator {
    /// Creates an invalidator for `store` that redirects to `login_route`.
    pub fn new(
        store: CredentialStore,
        navigator: Arc<dyn Navigator>,
        login_route: impl Into<String>,
    ) -> Self {
        Self {
            store,
            navigator,
            login_route: login_route.into(),
            gate: Arc::new(Mutex::new(())),
        }
    }

    /// Route used for the redirect.
    pub fn login_route(&self) -> &str {
        &self.login_route
    }

    /// Clears all stored credentials and redirects to the login route.
    ///
    /// Returns `true` when a session was ended (and the redirect issued),
    /// `false` when there was nothing to clear. Storage failures are logged,
    /// not returned: the redirect still happens so the user is never left on
    /// an authenticated screen with unusable credentials.
    pub fn invalidate(&self) -> bool {
        let _guard = self.lock_gate();

        let had_session = match self.store.has_credentials() {
            Ok(present) => present,
            Err(e) => {
                tracing::warn!("Could not read credential store during invalidation: {}", e);
                true
            }
        };

        if !had_session {
            tracing::debug!("Invalidation requested with no stored session; ignoring");
            return false;
        }

        if let Err(e) = self.store.clear() {
            tracing::warn!("Failed to clear stored credentials: {}", e);
        }

        tracing::info!(route = %self.login_route, "Session invalidated");
        self.navigator.navigate(&self.login_route);
        true
    }

    /// Runs `f` with invalidation held off.
    ///
    /// No [`invalidate`](Self::invalidate) call, from this handle or a clone,
    /// can clear the store while `f` runs. The refresh coordinator uses this
    /// to check that the session it refreshed still exists and to save the new
    /// tokens as one step.
    pub fn exclusive<T>(&self, f: impl FnOnce() -> T) -> T {
        let _guard = self.lock_gate();
        f()
    }

    fn lock_gate(&self) -> MutexGuard<'_, ()> {
        match self.gate.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
