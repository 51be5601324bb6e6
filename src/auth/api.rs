//! Session endpoints
//!
//! [`AuthApi`] wraps the three calls that create, describe, and end a
//! session. Token refresh is not here; it happens inside [`AuthClient`]
//! whenever a request is rejected.

use crate::auth::types::{Envelope, LoginRequest, LoginSession, RefreshRequest, User};
use crate::error::{ClientError, Result};
use crate::http::client::AuthClient;
use crate::http::request::ApiRequest;

/// Path of the login endpoint.
pub const LOGIN_PATH: &str = "/auth/login";

/// Path of the logout endpoint.
pub const LOGOUT_PATH: &str = "/auth/logout";

/// Path of the current-user endpoint.
pub const ME_PATH: &str = "/auth/me";

/// Login, logout, and profile calls on top of an [`AuthClient`].
#[derive(Debug, Clone)]
pub struct AuthApi {
    client: AuthClient,
}

impl AuthApi {
    /// Creates the API wrapper.
    pub fn new(client: AuthClient) -> Self {
        Self { client }
    }

    /// The underlying client.
    pub fn client(&self) -> &AuthClient {
        &self.client
    }

    /// Signs in and stores the issued tokens and profile.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Authentication`] when the server rejects the
    /// credentials (400/401) or returns an unusable payload. Other failures
    /// pass through.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginSession> {
        let request = ApiRequest::post(LOGIN_PATH).json(&LoginRequest { email, password })?;

        let response = match self.client.send_anonymous(request).await {
            Ok(response) => response,
            Err(ClientError::Status { status, body }) if status == 400 || status == 401 => {
                return Err(ClientError::Authentication(format!(
                    "login rejected ({status}): {body}"
                )));
            }
            Err(e) => return Err(e),
        };

        let envelope: Envelope<LoginSession> = response
            .json()
            .map_err(|e| ClientError::Authentication(format!("malformed login response: {e}")))?;
        let session = envelope.data;
        if session.access_token.is_empty() || session.refresh_token.is_empty() {
            return Err(ClientError::Authentication(
                "login response is missing a token".to_string(),
            ));
        }

        self.client.store().save_session(&session)?;
        tracing::info!(user = ?session.user.as_ref().map(|u| &u.id), "Signed in");
        Ok(session)
    }

    /// Signs out.
    ///
    /// The server is told to revoke the refresh token when one is stored;
    /// that call is best-effort. Local credentials are always cleared.
    /// Returns `false` when there was no session to end.
    pub async fn logout(&self) -> bool {
        match self.client.store().refresh_token() {
            Ok(Some(refresh_token)) => {
                let request = ApiRequest::post(LOGOUT_PATH).json(&RefreshRequest {
                    refresh_token: &refresh_token,
                });
                let outcome = match request {
                    Ok(request) => self.client.send_anonymous(request).await.map(|_| ()),
                    Err(e) => Err(e),
                };
                if let Err(e) = outcome {
                    tracing::warn!("Server logout failed; clearing local session anyway: {}", e);
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Could not read refresh token: {}", e),
        }

        self.client.invalidator().invalidate()
    }

    /// Fetches the signed-in user and refreshes the cached profile.
    ///
    /// Goes through the authenticated client, so an expired access token is
    /// refreshed transparently.
    pub async fn me(&self) -> Result<User> {
        let envelope: Envelope<User> = self.client.get_json(ME_PATH).await?;
        self.client.store().save_user(&envelope.data)?;
        Ok(envelope.data)
    }

    /// The cached profile, without contacting the server.
    pub fn cached_user(&self) -> Result<Option<User>> {
        self.client.store().user()
    }
}
