//! Application state management for Auth Starter
//!
//! This crate holds the auth status resolved at app start and lets the UI
//! layer observe changes to it.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth_status;

pub use auth_status::{AuthStatus, AuthStatusResolver};
