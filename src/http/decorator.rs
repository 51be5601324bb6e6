//! Outbound request decoration
//!
//! Every request leaves the process with two headers attached:
//!
//! - `Authorization: Bearer <accessToken>` -- omitted when no token is stored
//! - `Accept-Language: <locale>`          -- the currently selected language
//!
//! Decoration never fails. A missing token simply produces an
//! unauthenticated request, which the server answers with 401 and which then
//! takes the normal refresh path.

use reqwest::header::{HeaderValue, ACCEPT_LANGUAGE, AUTHORIZATION};

use crate::auth::store::CredentialStore;
use crate::http::locale::Locale;
use crate::http::request::ApiRequest;

/// Attaches credentials and locale to outbound requests.
///
/// # Examples
///
/// ```
/// use unionsite::auth::store::CredentialStore;
/// use unionsite::auth::types::TokenPair;
/// use unionsite::http::{ApiRequest, Locale, RequestDecorator};
///
/// let store = CredentialStore::in_memory();
/// store.save_tokens(&TokenPair::new("T1", "R1")).unwrap();
/// let decorator = RequestDecorator::new(store, Locale::new("vi"));
///
/// let decorated = decorator.decorate(&ApiRequest::get("/events"));
/// assert_eq!(decorated.bearer_token(), Some("T1"));
/// assert_eq!(decorated.headers["accept-language"], "vi");
/// ```
#[derive(Debug, Clone)]
pub struct RequestDecorator {
    store: CredentialStore,
    locale: Locale,
}

impl RequestDecorator {
    /// Creates a decorator reading from `store` and `locale`.
    pub fn new(store: CredentialStore, locale: Locale) -> Self {
        Self { store, locale }
    }

    /// The locale handle used for `Accept-Language`.
    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Returns a copy of `request` carrying the stored access token and the
    /// selected locale.
    pub fn decorate(&self, request: &ApiRequest) -> ApiRequest {
        let token = match self.store.access_token() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(request_id = %request.id, "Could not read access token: {}", e);
                None
            }
        };
        self.decorate_with_token(request, token.as_deref())
    }

    /// Like [`decorate`](Self::decorate) but with an explicit token.
    ///
    /// Used for replays, which must carry exactly the token minted by the
    /// refresh that released them.
    pub fn decorate_with_token(&self, request: &ApiRequest, token: Option<&str>) -> ApiRequest {
        let mut decorated = self.decorate_anonymous(request);

        if let Some(token) = token {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    decorated.headers.insert(AUTHORIZATION, value);
                }
                Err(_) => {
                    tracing::warn!(
                        request_id = %request.id,
                        "Stored access token is not a valid header value; sending unauthenticated"
                    );
                }
            }
        }

        decorated
    }

    /// Returns a copy of `request` carrying only the locale header.
    ///
    /// Used for the refresh call, which authenticates with its body.
    pub fn decorate_anonymous(&self, request: &ApiRequest) -> ApiRequest {
        let mut decorated = request.clone();
        let locale = self.locale.current();
        match HeaderValue::from_str(&locale) {
            Ok(value) => {
                decorated.headers.insert(ACCEPT_LANGUAGE, value);
            }
            Err(_) => {
                tracing::warn!(locale = %locale, "Selected locale is not a valid header value");
            }
        }
        decorated
    }
}
