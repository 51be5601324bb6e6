//! HTTP pipeline: request model, decoration, transport, and token refresh

pub mod client;
pub mod decorator;
pub mod dispatcher;
pub mod locale;
pub mod refresh;
pub mod request;

#[cfg(test)]
pub mod fake;

pub use client::{AuthClient, AuthClientBuilder};
pub use decorator::RequestDecorator;
pub use dispatcher::{Dispatcher, ReqwestDispatcher};
pub use locale::Locale;
pub use refresh::{RefreshCoordinator, RefreshState};
pub use request::{ApiRequest, ApiResponse, Attempt};
