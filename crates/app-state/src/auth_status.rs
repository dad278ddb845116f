//! Auth status resolution at app start
//!
//! Decides whether the app opens on the signed-in or the signed-out screens.
//! The check is local only: a stored token means authenticated.
//!
//! ```text
//! Unknown --resolve()--> Checking --token--------> Authenticated
//!                                 --no token/err--> Unauthenticated
//! any --reset()--> Unknown
//! ```

use auth_client::SessionStore;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// Where the app stands on authentication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthStatus {
    /// Nothing checked yet
    Unknown,
    /// Reading the session store
    Checking,
    /// A token is stored
    Authenticated,
    /// No token is stored, or the check failed
    Unauthenticated,
}

impl AuthStatus {
    /// Check if the status is final (Authenticated or Unauthenticated)
    pub fn is_resolved(&self) -> bool {
        matches!(self, AuthStatus::Authenticated | AuthStatus::Unauthenticated)
    }

    /// Check if the user is authenticated
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthStatus::Authenticated)
    }
}

impl fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AuthStatus::Unknown => "unknown",
            AuthStatus::Checking => "checking",
            AuthStatus::Authenticated => "authenticated",
            AuthStatus::Unauthenticated => "unauthenticated",
        };
        f.write_str(s)
    }
}

struct ResolverState {
    status: AuthStatus,
    /// Bumped on every external change so a stale check cannot overwrite it
    generation: u64,
}

/// Resolves [`AuthStatus`] from the session store
///
/// Clones share state and subscribers.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use app_state::{AuthStatus, AuthStatusResolver};
/// use auth_client::SessionStore;
/// use storage::MemoryKvStore;
///
/// # async fn example() {
/// let session = SessionStore::new(Arc::new(MemoryKvStore::new()));
/// let resolver = AuthStatusResolver::new(session);
///
/// assert_eq!(resolver.status(), AuthStatus::Unknown);
/// assert_eq!(resolver.resolve().await, AuthStatus::Unauthenticated);
/// # }
/// ```
#[derive(Clone)]
pub struct AuthStatusResolver {
    session: SessionStore,
    state: Arc<Mutex<ResolverState>>,
    status_tx: Arc<watch::Sender<AuthStatus>>,
}

impl AuthStatusResolver {
    /// Create a resolver in the `Unknown` state
    pub fn new(session: SessionStore) -> Self {
        let (status_tx, _) = watch::channel(AuthStatus::Unknown);

        Self {
            session,
            state: Arc::new(Mutex::new(ResolverState {
                status: AuthStatus::Unknown,
                generation: 0,
            })),
            status_tx: Arc::new(status_tx),
        }
    }

    /// Get the current status
    pub fn status(&self) -> AuthStatus {
        self.state.lock().status
    }

    /// Run the check if the status is `Unknown`
    ///
    /// Any other status is returned as-is without starting a second check.
    /// Storage failures resolve to `Unauthenticated`.
    pub async fn resolve(&self) -> AuthStatus {
        let generation = {
            let mut state = self.state.lock();
            if state.status != AuthStatus::Unknown {
                return state.status;
            }
            state.status = AuthStatus::Checking;
            state.generation
        };
        self.status_tx.send_replace(AuthStatus::Checking);
        tracing::debug!("Checking auth status");

        let resolved = match self.session.try_is_authenticated().await {
            Ok(true) => AuthStatus::Authenticated,
            Ok(false) => AuthStatus::Unauthenticated,
            Err(e) => {
                tracing::warn!("Error checking auth status: {}", e);
                AuthStatus::Unauthenticated
            }
        };

        let current = {
            let mut state = self.state.lock();
            if state.generation != generation {
                // Reset or overridden while checking
                return state.status;
            }
            state.status = resolved;
            resolved
        };
        self.status_tx.send_replace(current);
        tracing::info!("Auth status resolved: {}", current);
        current
    }

    /// Return to `Unknown` so the next `resolve()` checks again
    pub fn reset(&self) {
        self.set(AuthStatus::Unknown);
    }

    /// Record the result of a login, signup or logout without re-checking
    pub fn set_authenticated(&self, authenticated: bool) {
        self.set(if authenticated {
            AuthStatus::Authenticated
        } else {
            AuthStatus::Unauthenticated
        });
    }

    /// Subscribe to status changes
    pub fn subscribe(&self) -> watch::Receiver<AuthStatus> {
        self.status_tx.subscribe()
    }

    /// Wait until the status is resolved, starting a check if needed
    pub async fn wait_resolved(&self) -> AuthStatus {
        let mut rx = self.subscribe();
        loop {
            let status = self.resolve().await;
            if status.is_resolved() {
                return status;
            }
            if status == AuthStatus::Unknown {
                // Our check was discarded by a reset
                continue;
            }

            // Another task is checking; a reset sends us back to Unknown
            let next = match rx
                .wait_for(|s| s.is_resolved() || *s == AuthStatus::Unknown)
                .await
            {
                Ok(next) => *next,
                Err(_) => return self.status(),
            };
            if next.is_resolved() {
                return next;
            }
        }
    }

    fn set(&self, status: AuthStatus) {
        {
            let mut state = self.state.lock();
            state.status = status;
            state.generation += 1;
        }
        self.status_tx.send_replace(status);
        tracing::debug!("Auth status set to {}", status);
    }
}

impl fmt::Debug for AuthStatusResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthStatusResolver")
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}
