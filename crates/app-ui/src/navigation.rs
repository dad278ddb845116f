//! Navigation for Auth Starter
//!
//! This module models which screen is showing as a stack of routes:
//! - Route definitions for the Login, Signup and Home screens
//! - Navigation stack management
//! - Mapping the resolved auth status to an entry route

use app_state::AuthStatus;
use serde::{Deserialize, Serialize};

// =============================================================================
// Route Definitions
// =============================================================================

/// All screens in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    /// Sign-in form
    Login,
    /// Account creation form
    Signup,
    /// Signed-in home screen
    Home,
}

impl Route {
    /// Check if this route requires authentication
    pub fn requires_auth(&self) -> bool {
        matches!(self, Route::Home)
    }

    /// Get a display title for this route
    pub fn title(&self) -> &'static str {
        match self {
            Route::Login => "Login",
            Route::Signup => "Sign Up",
            Route::Home => "Home",
        }
    }

    /// Entry route for a resolved auth status
    ///
    /// Returns `None` while the status is still unknown or being checked, in
    /// which case the app shows its loading state.
    pub fn for_status(status: AuthStatus) -> Option<Route> {
        match status {
            AuthStatus::Authenticated => Some(Route::Home),
            AuthStatus::Unauthenticated => Some(Route::Login),
            AuthStatus::Unknown | AuthStatus::Checking => None,
        }
    }
}

// =============================================================================
// Navigation Stack
// =============================================================================

/// A navigation stack entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackEntry {
    /// The route
    pub route: Route,
    /// Unique key for this entry
    pub key: String,
}

impl StackEntry {
    /// Create a new stack entry
    pub fn new(route: Route) -> Self {
        Self {
            route,
            key: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Stack of visited screens; never empty
///
/// Deserializing rejects an empty entry list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredStack")]
pub struct NavigationStack {
    /// Stack entries (bottom to top)
    entries: Vec<StackEntry>,
}

impl NavigationStack {
    /// Create a new navigation stack with a root route
    pub fn new(root: Route) -> Self {
        Self {
            entries: vec![StackEntry::new(root)],
        }
    }

    /// Push a route onto the stack
    pub fn push(&mut self, route: Route) {
        self.entries.push(StackEntry::new(route));
    }

    /// Pop the top route (returns true if popped, false if at root)
    pub fn pop(&mut self) -> bool {
        if self.entries.len() > 1 {
            self.entries.pop();
            true
        } else {
            false
        }
    }

    /// Go to a route, returning to it if it is already on the stack
    pub fn navigate(&mut self, route: Route) {
        match self.entries.iter().rposition(|entry| entry.route == route) {
            Some(index) => self.entries.truncate(index + 1),
            None => self.push(route),
        }
    }

    /// Replace the top route
    pub fn replace(&mut self, route: Route) {
        if let Some(last) = self.entries.last_mut() {
            *last = StackEntry::new(route);
        }
    }

    /// Drop everything and start over at `route`
    pub fn reset(&mut self, route: Route) {
        self.entries = vec![StackEntry::new(route)];
    }

    /// Get the current (top) route
    pub fn current(&self) -> Route {
        self.entries.last().expect("Stack should never be empty").route
    }

    /// Get stack depth
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    /// Get all entries
    pub fn entries(&self) -> &[StackEntry] {
        &self.entries
    }
}

#[derive(Deserialize)]
struct StoredStack {
    entries: Vec<StackEntry>,
}

impl TryFrom<StoredStack> for NavigationStack {
    type Error = String;

    fn try_from(stored: StoredStack) -> Result<Self, Self::Error> {
        if stored.entries.is_empty() {
            return Err("navigation stack must have at least one entry".to_string());
        }
        Ok(Self {
            entries: stored.entries,
        })
    }
}

impl Default for NavigationStack {
    fn default() -> Self {
        Self::new(Route::Login)
    }
}
