//! Authenticated API client
//!
//! [`AuthClient`] is what the rest of the application calls to talk to the
//! API. Each call is decorated with the stored access token and the selected
//! locale, dispatched, and, if the server answers 401, handed to the
//! [`RefreshCoordinator`] which refreshes the session once and replays the
//! request. To the caller a recovered request looks exactly like one that
//! succeeded first time.
//!
//! Non-2xx responses other than a recoverable 401 are returned as
//! [`ClientError::Status`] unchanged.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::session::{LogNavigator, Navigator, SessionInvalidator, DEFAULT_LOGIN_ROUTE};
use crate::auth::store::CredentialStore;
use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::http::decorator::RequestDecorator;
use crate::http::dispatcher::{Dispatcher, ReqwestDispatcher};
use crate::http::locale::Locale;
use crate::http::refresh::{RefreshCoordinator, REFRESH_PATH};
use crate::http::request::{ApiRequest, ApiResponse};

/// Authenticated client for the site API.
///
/// Cloning is cheap. Clones share credentials, locale, and the refresh
/// cycle; independently built clients share nothing.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use unionsite::auth::store::CredentialStore;
/// use unionsite::http::{ApiRequest, AuthClient, ReqwestDispatcher};
///
/// # async fn example() -> unionsite::Result<()> {
/// let dispatcher = ReqwestDispatcher::new("https://union.example/api", Duration::from_secs(30))?;
/// let client = AuthClient::builder(Arc::new(dispatcher))
///     .store(CredentialStore::in_memory())
///     .build();
///
/// let response = client.send(ApiRequest::get("/events")).await?;
/// println!("{}", response.text());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AuthClient {
    dispatcher: Arc<dyn Dispatcher>,
    decorator: RequestDecorator,
    store: CredentialStore,
    invalidator: SessionInvalidator,
    coordinator: Arc<RefreshCoordinator>,
}

impl AuthClient {
    /// Starts building a client around `dispatcher`.
    pub fn builder(dispatcher: Arc<dyn Dispatcher>) -> AuthClientBuilder {
        AuthClientBuilder::new(dispatcher)
    }

    /// Builds a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] for an unusable base URL and storage
    /// errors if the configured credential backend cannot be opened.
    pub fn from_config(config: &Config, navigator: Arc<dyn Navigator>) -> Result<Self> {
        let dispatcher = ReqwestDispatcher::new(
            &config.api.base_url,
            Duration::from_secs(config.api.timeout_seconds),
        )?;
        let store = config.storage.open_store()?;

        Ok(Self::builder(Arc::new(dispatcher))
            .store(store)
            .locale(Locale::new(&config.api.default_locale))
            .navigator(navigator)
            .login_route(config.session.login_route.clone())
            .build())
    }

    /// Sends `request` with credentials attached, refreshing the session once
    /// on 401.
    ///
    /// # Errors
    ///
    /// - Transport errors and non-401 error statuses are returned unchanged.
    /// - A 401 on a request that was already replayed is returned as
    ///   [`ClientError::Status`].
    /// - If the session could not be refreshed, the refresh error is returned
    ///   (the same error every other waiting request receives) and the
    ///   session has been invalidated.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let decorated = self.decorator.decorate(&request);
        let sent_with = decorated.bearer_token().map(str::to_owned);

        let response = self.dispatcher.send(&decorated).await?;

        if response.is_unauthorized() && !request.attempt.is_replay() {
            tracing::debug!(request_id = %request.id, path = %request.path, "Received 401");
            return self.coordinator.recover(request, sent_with).await;
        }

        response.error_for_status()
    }

    /// Sends `request` and deserializes the JSON response body.
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        self.send(request).await?.json()
    }

    /// `GET path`, deserializing the JSON response body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send_json(ApiRequest::get(path)).await
    }

    /// `POST path` with a JSON body, deserializing the JSON response body.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(ApiRequest::post(path).json(body)?).await
    }

    /// Sends `request` without credentials and without refresh handling.
    ///
    /// Used for endpoints that establish a session (login).
    pub async fn send_anonymous(&self, request: ApiRequest) -> Result<ApiResponse> {
        let decorated = self.decorator.decorate_anonymous(&request);
        self.dispatcher.send(&decorated).await?.error_for_status()
    }

    /// The credential store this client reads and updates.
    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// The locale handle used for `Accept-Language`.
    pub fn locale(&self) -> &Locale {
        self.decorator.locale()
    }

    /// The session invalidator used when refresh fails.
    pub fn invalidator(&self) -> &SessionInvalidator {
        &self.invalidator
    }

    /// The refresh coordinator (for state inspection).
    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }
}

/// Builder for [`AuthClient`].
///
/// Defaults: in-memory credentials, `en` locale, a logging navigator, and
/// the `/login` route.
#[derive(Debug)]
pub struct AuthClientBuilder {
    dispatcher: Arc<dyn Dispatcher>,
    store: Option<CredentialStore>,
    locale: Option<Locale>,
    navigator: Option<Arc<dyn Navigator>>,
    login_route: String,
    refresh_path: String,
}

impl AuthClientBuilder {
    fn new(dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            dispatcher,
            store: None,
            locale: None,
            navigator: None,
            login_route: DEFAULT_LOGIN_ROUTE.to_string(),
            refresh_path: REFRESH_PATH.to_string(),
        }
    }

    /// Credential store to read tokens from and write refreshed tokens to.
    pub fn store(mut self, store: CredentialStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Locale handle for `Accept-Language`.
    pub fn locale(mut self, locale: Locale) -> Self {
        self.locale = Some(locale);
        self
    }

    /// Navigator invoked when the session is invalidated.
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Route of the login screen.
    pub fn login_route(mut self, route: impl Into<String>) -> Self {
        self.login_route = route.into();
        self
    }

    /// Path of the refresh endpoint.
    pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    /// Builds the client.
    pub fn build(self) -> AuthClient {
        let store = self.store.unwrap_or_else(CredentialStore::in_memory);
        let locale = self.locale.unwrap_or_default();
        let navigator = self
            .navigator
            .unwrap_or_else(|| Arc::new(LogNavigator) as Arc<dyn Navigator>);

        let decorator = RequestDecorator::new(store.clone(), locale);
        let invalidator = SessionInvalidator::new(store.clone(), navigator, self.login_route);
        let coordinator = RefreshCoordinator::new(
            Arc::clone(&self.dispatcher),
            decorator.clone(),
            store.clone(),
            invalidator.clone(),
        )
        .with_refresh_path(self.refresh_path);

        AuthClient {
            dispatcher: self.dispatcher,
            decorator,
            store,
            invalidator,
            coordinator: Arc::new(coordinator),
        }
    }
}

impl From<AuthClientBuilder> for AuthClient {
    fn from(builder: AuthClientBuilder) -> Self {
        builder.build()
    }
}
