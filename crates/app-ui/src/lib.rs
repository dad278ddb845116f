//! User interface layer for Auth Starter
//!
//! This crate models navigation between the Login, Signup and Home screens
//! and the controllers behind them. Rendering is left to the host platform.
//!
//! # Modules
//!
//! - [`navigation`] - Routes and the navigation stack
//! - [`screens`] - Screen controllers and their outcomes
//!
//! # Example
//!
//! ```rust
//! use app_state::AuthStatus;
//! use app_ui::navigation::{NavigationStack, Route};
//!
//! let entry = Route::for_status(AuthStatus::Unauthenticated).unwrap();
//! let mut stack = NavigationStack::new(entry);
//! stack.navigate(Route::Signup);
//! assert_eq!(stack.current(), Route::Signup);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod navigation;
pub mod screens;

pub use navigation::{NavigationStack, Route, StackEntry};
pub use screens::{HomeController, LoginController, ScreenOutcome, SignupController};
