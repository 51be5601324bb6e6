//! Wire and storage types for session credentials
//!
//! The API wraps every payload in a `{ "data": ... }` envelope and uses
//! camelCase field names; these types mirror that shape so they can be
//! deserialized straight from a response body and persisted unchanged.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Standard `{ "data": ... }` response envelope used by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Wrapped payload.
    pub data: T,
}

/// An access/refresh token pair issued by login or refresh.
///
/// # Examples
///
/// ```
/// use unionsite::auth::types::TokenPair;
///
/// let pair: TokenPair =
///     serde_json::from_str(r#"{"accessToken":"T2","refreshToken":"R2"}"#).unwrap();
/// assert_eq!(pair.access_token, "T2");
/// assert_eq!(pair.refresh_token, "R2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived credential attached as `Authorization: Bearer`.
    pub access_token: String,

    /// Longer-lived credential used only to mint new access tokens.
    pub refresh_token: String,
}

impl TokenPair {
    /// Builds a token pair from anything string-like.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

/// Cached profile of the signed-in user.
///
/// Only the fields the client itself reads are typed; everything else the
/// server sends is kept in `extra` so the cached copy round-trips intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Server-side identifier.
    pub id: String,

    /// Login email address.
    pub email: String,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Role in the admin panel (e.g. `admin`, `editor`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Avatar image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    /// Account creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Any additional profile fields.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Payload returned by `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginSession {
    /// Newly issued access token.
    pub access_token: String,

    /// Newly issued refresh token.
    pub refresh_token: String,

    /// Profile of the user who signed in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl LoginSession {
    /// Returns the token half of the session.
    pub fn tokens(&self) -> TokenPair {
        TokenPair::new(self.access_token.clone(), self.refresh_token.clone())
    }
}

/// Body of `POST /auth/refresh-token` and `POST /auth/logout`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest<'a> {
    /// The stored refresh token.
    pub refresh_token: &'a str,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    /// Account email.
    pub email: &'a str,
    /// Account password.
    pub password: &'a str,
}
