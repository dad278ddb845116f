//! Core application logic for Auth Starter
//!
//! This crate contains form validation and the authentication flows that
//! connect the auth API to the session store.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod validation;

pub use auth::{AuthFlowError, AuthService, LogoutOutcome, SignedIn};
pub use validation::{Credentials, Field, SignupFields, ValidationError, ValidationErrors};
