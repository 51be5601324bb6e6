//! Session management: credential storage, session endpoints, and
//! invalidation

pub mod api;
pub mod session;
pub mod store;
pub mod types;

pub use api::AuthApi;
pub use session::{LogNavigator, Navigator, SessionInvalidator};
pub use store::{CredentialStore, StorageBackend};
pub use types::{LoginSession, TokenPair, User};
