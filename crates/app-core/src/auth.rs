//! Authentication service
//!
//! This module provides the high-level flows the screens drive: login, signup,
//! logout and profile refresh. Each flow validates input, calls the auth API
//! and keeps the session store in step with the result.

use crate::validation::{Credentials, SignupFields, ValidationErrors};
use auth_client::{AuthApi, AuthError, AuthSession, Profile, SessionStore};
use std::sync::Arc;
use thiserror::Error;

/// Authentication flow error types
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuthFlowError {
    /// Input failed client-side validation; the API was not called
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// The API call failed
    #[error("{0}")]
    Api(#[from] AuthError),
}

impl AuthFlowError {
    /// Message suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            AuthFlowError::Validation(errors) => errors
                .iter()
                .next()
                .map(ToString::to_string)
                .unwrap_or_default(),
            AuthFlowError::Api(error) => error.message().to_string(),
        }
    }

    /// Field errors, if this is a validation failure
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            AuthFlowError::Validation(errors) => Some(errors),
            AuthFlowError::Api(_) => None,
        }
    }
}

/// Result type for authentication flows
pub type Result<T> = std::result::Result<T, AuthFlowError>;

/// Outcome of a successful login or signup
#[derive(Debug, Clone, PartialEq)]
pub struct SignedIn {
    /// What the server returned
    pub session: AuthSession,
    /// Whether the token (and profile, if any) reached storage
    pub persisted: bool,
}

/// Outcome of a logout; logout itself never fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogoutOutcome {
    /// The server acknowledged the logout
    pub remote_notified: bool,
    /// Token and profile were removed from storage
    pub session_cleared: bool,
}

/// Authentication service
///
/// Ties the auth API to the session store. Constructed explicitly; cloning
/// shares both dependencies.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use app_core::{AuthService, Credentials};
/// use auth_client::{ApiClientConfig, HttpAuthApi, SessionStore};
/// use storage::MemoryKvStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let session = SessionStore::new(Arc::new(MemoryKvStore::new()));
/// let api = HttpAuthApi::new(ApiClientConfig::default(), session.clone())?;
/// let auth = AuthService::new(Arc::new(api), session);
///
/// let signed_in = auth.login(&Credentials::new("alice@example.com", "secret1")).await?;
/// println!("token stored: {}", signed_in.persisted);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AuthService {
    api: Arc<dyn AuthApi>,
    session: SessionStore,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(api: Arc<dyn AuthApi>, session: SessionStore) -> Self {
        Self { api, session }
    }

    /// Validate credentials, log in and persist the session
    pub async fn login(&self, credentials: &Credentials) -> Result<SignedIn> {
        credentials.validate().map_err(AuthFlowError::Validation)?;

        let session = self
            .api
            .login(&credentials.email, &credentials.password)
            .await
            .map_err(|e| {
                tracing::warn!("Login failed: {}", e);
                e
            })?;

        let persisted = self.persist(&session).await;
        tracing::info!("Logged in");
        Ok(SignedIn { session, persisted })
    }

    /// Validate signup fields, create the account and persist the session
    pub async fn signup(&self, fields: &SignupFields) -> Result<SignedIn> {
        fields.validate().map_err(AuthFlowError::Validation)?;

        let session = self
            .api
            .signup(&fields.email, &fields.password, &fields.name)
            .await
            .map_err(|e| {
                tracing::warn!("Signup failed: {}", e);
                e
            })?;

        let persisted = self.persist(&session).await;
        tracing::info!("Signed up");
        Ok(SignedIn { session, persisted })
    }

    /// Notify the server, then clear the local session
    ///
    /// Both steps are attempted regardless of the other's result.
    pub async fn logout(&self) -> LogoutOutcome {
        let remote_notified = match self.api.logout().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Logout API error: {}", e);
                false
            }
        };

        let session_cleared = match self.session.clear_session().await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to clear session on logout: {}", e);
                false
            }
        };

        tracing::info!(remote_notified, session_cleared, "Logged out");
        LogoutOutcome {
            remote_notified,
            session_cleared,
        }
    }

    /// Fetch the profile from the server and cache it
    ///
    /// A caching failure is logged; the fresh profile is still returned.
    pub async fn refresh_profile(&self) -> std::result::Result<Profile, AuthError> {
        let profile = self.api.get_profile().await.map_err(|e| {
            tracing::warn!("Failed to refresh profile: {}", e);
            e
        })?;

        if let Err(e) = self.session.store_profile(&profile).await {
            tracing::warn!("Failed to cache refreshed profile: {}", e);
        }

        Ok(profile)
    }

    /// Cached profile, if any
    pub async fn cached_profile(&self) -> Option<Profile> {
        self.session.get_profile().await
    }

    /// Check for a stored token
    pub async fn is_authenticated(&self) -> bool {
        self.session.is_authenticated().await
    }

    /// Get the session store
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    async fn persist(&self, session: &AuthSession) -> bool {
        let mut persisted = true;

        if let Err(e) = self.session.store_token(&session.token).await {
            tracing::error!("Failed to persist token: {}", e);
            persisted = false;
        }

        if let Some(profile) = &session.profile {
            if let Err(e) = self.session.store_profile(profile).await {
                tracing::error!("Failed to persist profile: {}", e);
                persisted = false;
            }
        }

        persisted
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
