//! Screen controllers
//!
//! Each controller turns a user action into a call on [`AuthService`] and the
//! result into a [`ScreenOutcome`]: a navigation, inline field errors, an
//! alert, or fresh data to display. Rendering is left to the host.

use crate::navigation::{NavigationStack, Route};
use app_core::{AuthFlowError, AuthService, Credentials, SignupFields, ValidationErrors};
use app_state::AuthStatusResolver;
use auth_client::{AuthError, Profile};

/// Alert title for failed logins
pub const LOGIN_FAILED_TITLE: &str = "Login Failed";
/// Alert title for failed signups
pub const SIGNUP_FAILED_TITLE: &str = "Signup Failed";
/// Alert title for everything else
pub const ERROR_TITLE: &str = "Error";

/// Login alert text when the server explains nothing
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
/// Signup alert text when the server explains nothing
pub const SIGNUP_ERROR: &str = "An error occurred during signup";
/// Alert text for a failed profile refresh
pub const REFRESH_FAILED: &str = "Failed to refresh profile. Please try again.";

/// What the screen should do after an action
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenOutcome {
    /// The navigation stack moved to this route
    Navigated(Route),
    /// Show these errors next to their fields
    FieldErrors(ValidationErrors),
    /// Show a modal alert
    Alert {
        /// Alert title
        title: String,
        /// Alert body
        message: String,
    },
    /// Display this profile
    Updated(Profile),
    /// Nothing to show
    Unchanged,
}

impl ScreenOutcome {
    /// Create an alert outcome
    pub fn alert(title: impl Into<String>, message: impl Into<String>) -> Self {
        ScreenOutcome::Alert {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Turn a failed login/signup into field errors or an alert
fn flow_failure(error: AuthFlowError, title: &str, fallback: &str) -> ScreenOutcome {
    match error {
        AuthFlowError::Validation(errors) => ScreenOutcome::FieldErrors(errors),
        AuthFlowError::Api(error) => api_failure(&error, title, fallback),
    }
}

fn api_failure(error: &AuthError, title: &str, fallback: &str) -> ScreenOutcome {
    match error {
        AuthError::InvalidResponse(message) => ScreenOutcome::alert(ERROR_TITLE, message.as_str()),
        AuthError::Transport { message, .. } => ScreenOutcome::alert(title, message.as_str()),
        AuthError::Rejected { .. } | AuthError::Api { .. } => {
            ScreenOutcome::alert(title, error.server_message().unwrap_or(fallback))
        }
    }
}

// ===== Login =====

/// Drives the login screen
#[derive(Debug, Clone)]
pub struct LoginController {
    auth: AuthService,
    status: AuthStatusResolver,
}

impl LoginController {
    /// Create a controller
    pub fn new(auth: AuthService, status: AuthStatusResolver) -> Self {
        Self { auth, status }
    }

    /// Validate and submit the form; on success Home replaces Login
    pub async fn submit(&self, credentials: &Credentials, nav: &mut NavigationStack) -> ScreenOutcome {
        match self.auth.login(credentials).await {
            Ok(_) => {
                self.status.set_authenticated(true);
                nav.replace(Route::Home);
                ScreenOutcome::Navigated(Route::Home)
            }
            Err(e) => flow_failure(e, LOGIN_FAILED_TITLE, INVALID_CREDENTIALS),
        }
    }

    /// Follow the "sign up" link
    pub fn open_signup(&self, nav: &mut NavigationStack) -> ScreenOutcome {
        nav.navigate(Route::Signup);
        ScreenOutcome::Navigated(Route::Signup)
    }
}

// ===== Signup =====

/// Drives the signup screen
#[derive(Debug, Clone)]
pub struct SignupController {
    auth: AuthService,
    status: AuthStatusResolver,
}

impl SignupController {
    /// Create a controller
    pub fn new(auth: AuthService, status: AuthStatusResolver) -> Self {
        Self { auth, status }
    }

    /// Validate and submit the form; on success Home replaces Signup
    pub async fn submit(&self, fields: &SignupFields, nav: &mut NavigationStack) -> ScreenOutcome {
        match self.auth.signup(fields).await {
            Ok(_) => {
                self.status.set_authenticated(true);
                nav.replace(Route::Home);
                ScreenOutcome::Navigated(Route::Home)
            }
            Err(e) => flow_failure(e, SIGNUP_FAILED_TITLE, SIGNUP_ERROR),
        }
    }

    /// Follow the "log in" link
    pub fn open_login(&self, nav: &mut NavigationStack) -> ScreenOutcome {
        nav.navigate(Route::Login);
        ScreenOutcome::Navigated(Route::Login)
    }
}

// ===== Home =====

/// Drives the home screen
#[derive(Debug, Clone)]
pub struct HomeController {
    auth: AuthService,
    status: AuthStatusResolver,
}

impl HomeController {
    /// Create a controller
    pub fn new(auth: AuthService, status: AuthStatusResolver) -> Self {
        Self { auth, status }
    }

    /// Show the cached profile, if there is one
    pub async fn load_profile(&self) -> ScreenOutcome {
        match self.auth.cached_profile().await {
            Some(profile) => ScreenOutcome::Updated(profile),
            None => ScreenOutcome::Unchanged,
        }
    }

    /// Fetch a fresh profile from the server
    pub async fn refresh_profile(&self) -> ScreenOutcome {
        match self.auth.refresh_profile().await {
            Ok(profile) => ScreenOutcome::Updated(profile),
            Err(e) => {
                if e.is_rejected() {
                    // The token was dropped on the 401
                    self.status.set_authenticated(false);
                }
                ScreenOutcome::alert(ERROR_TITLE, REFRESH_FAILED)
            }
        }
    }

    /// Log out and return to Login, whatever fails along the way
    pub async fn logout(&self, nav: &mut NavigationStack) -> ScreenOutcome {
        let outcome = self.auth.logout().await;
        if !outcome.session_cleared {
            tracing::warn!("Session not fully cleared on logout");
        }

        self.status.set_authenticated(false);
        nav.reset(Route::Login);
        ScreenOutcome::Navigated(Route::Login)
    }
}
