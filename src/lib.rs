//! Auth Starter
//!
//! Composition root for the authentication starter. [`App`] wires the
//! key-value store, session store, auth API client, auth status resolver and
//! screen controllers together and owns the navigation stack.
//!
//! # Example
//!
//! ```rust,no_run
//! use auth_starter::{init_tracing, App, AppConfig};
//! use app_core::Credentials;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! init_tracing("info");
//!
//! let config = AppConfig::new("auth_starter_kv.db").api_base_url("http://localhost:5000/api");
//! let mut app = App::open(config)?;
//!
//! app.start().await;
//! let outcome = app.login(&Credentials::new("alice@example.com", "secret1")).await;
//! println!("{:?} -> {:?}", outcome, app.current_route());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

use app_core::{AuthService, Credentials, SignupFields};
use app_state::{AuthStatus, AuthStatusResolver};
use app_ui::{HomeController, LoginController, NavigationStack, Route, ScreenOutcome, SignupController};
use auth_client::{ApiClientConfig, HttpAuthApi, HttpError, SessionStore};
use std::sync::Arc;
use std::time::Duration;
use storage::{KeyValueStore, KvConfig, KvError, SledKvStore};
use thiserror::Error;

/// Errors that can occur while assembling the app
#[derive(Debug, Error)]
pub enum AppError {
    /// Key-value store could not be opened
    #[error("Storage error: {0}")]
    Storage(#[from] KvError),

    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Http(#[from] HttpError),
}

/// Result type for app assembly
pub type Result<T> = std::result::Result<T, AppError>;

/// Install a fmt subscriber filtered by `RUST_LOG`, or `default_filter` when unset
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing(default_filter: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

/// Configuration for the whole app
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Key-value store configuration
    pub storage: KvConfig,
    /// HTTP client configuration
    pub api: ApiClientConfig,
}

impl AppConfig {
    /// Create a config with the key-value store at `storage_path`
    pub fn new(storage_path: impl Into<String>) -> Self {
        Self {
            storage: KvConfig::new(storage_path),
            api: ApiClientConfig::default(),
        }
    }

    /// Set the API base URL
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api.base_url = url.into();
        self
    }

    /// Set the request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.api.timeout = timeout;
        self
    }

    /// Replace the key-value store configuration
    pub fn storage(mut self, storage: KvConfig) -> Self {
        self.storage = storage;
        self
    }
}

/// The assembled application
pub struct App {
    session: SessionStore,
    auth: AuthService,
    status: AuthStatusResolver,
    login: LoginController,
    signup: SignupController,
    home: HomeController,
    nav: NavigationStack,
}

impl App {
    /// Open the sled store from `config` and assemble the app
    pub fn open(config: AppConfig) -> Result<Self> {
        let kv = SledKvStore::new(config.storage)?;
        Self::with_store(Arc::new(kv), config.api)
    }

    /// Assemble the app over any key-value store
    pub fn with_store(kv: Arc<dyn KeyValueStore>, api: ApiClientConfig) -> Result<Self> {
        let session = SessionStore::new(kv);
        let api = HttpAuthApi::new(api, session.clone())?;
        let auth = AuthService::new(Arc::new(api), session.clone());
        let status = AuthStatusResolver::new(session.clone());

        Ok(Self {
            login: LoginController::new(auth.clone(), status.clone()),
            signup: SignupController::new(auth.clone(), status.clone()),
            home: HomeController::new(auth.clone(), status.clone()),
            session,
            auth,
            status,
            nav: NavigationStack::default(),
        })
    }

    /// Resolve the auth status and reset navigation to the matching entry route
    pub async fn start(&mut self) -> Option<Route> {
        let status = self.status.wait_resolved().await;
        let route = Route::for_status(status)?;
        self.nav.reset(route);
        tracing::info!("Starting at {}", route.title());
        Some(route)
    }

    /// Force the next `start()` to check storage again
    pub fn reset_status(&self) {
        self.status.reset();
    }

    /// Submit the login form
    pub async fn login(&mut self, credentials: &Credentials) -> ScreenOutcome {
        self.login.submit(credentials, &mut self.nav).await
    }

    /// Submit the signup form
    pub async fn signup(&mut self, fields: &SignupFields) -> ScreenOutcome {
        self.signup.submit(fields, &mut self.nav).await
    }

    /// Follow the link from Login to Signup
    pub fn open_signup(&mut self) -> ScreenOutcome {
        self.login.open_signup(&mut self.nav)
    }

    /// Follow the link from Signup to Login
    pub fn open_login(&mut self) -> ScreenOutcome {
        self.signup.open_login(&mut self.nav)
    }

    /// Show the cached profile on Home
    pub async fn load_profile(&self) -> ScreenOutcome {
        self.home.load_profile().await
    }

    /// Refresh the profile on Home
    pub async fn refresh_profile(&self) -> ScreenOutcome {
        self.home.refresh_profile().await
    }

    /// Log out from Home
    pub async fn logout(&mut self) -> ScreenOutcome {
        self.home.logout(&mut self.nav).await
    }

    /// Get the route currently showing
    pub fn current_route(&self) -> Route {
        self.nav.current()
    }

    /// Get the navigation stack
    pub fn navigation(&self) -> &NavigationStack {
        &self.nav
    }

    /// Get the current auth status
    pub fn status(&self) -> AuthStatus {
        self.status.status()
    }

    /// Get the session store
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Get the authentication service
    pub fn auth(&self) -> &AuthService {
        &self.auth
    }
}
