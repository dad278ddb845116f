//! Auth API Client Library
//!
//! This crate provides the client side of the authentication API: the HTTP
//! transport, the bearer-token decorator, the REST endpoints, and the session
//! store that persists the token and cached profile.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod error;
pub mod http;
pub mod session;

pub use api::{AuthApi, AuthSession, AuthorizedClient, HttpAuthApi};
pub use error::{AuthError, Result};
pub use http::{ApiClientConfig, HttpClient, HttpError};
pub use session::{Profile, Session, SessionStore, SessionStoreError};
