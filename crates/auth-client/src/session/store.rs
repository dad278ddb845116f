//! Session store backed by a key-value store

use super::{Profile, Result, Session, PROFILE_KEY, TOKEN_KEY};
use std::sync::Arc;
use storage::KeyValueStore;

/// Persists the bearer token and the cached profile
///
/// Reads fail open: `get_token`, `get_profile` and `is_authenticated` log
/// storage errors and report "absent". The `try_*` variants surface the
/// underlying error. Writes always report failures.
///
/// Cloning is cheap and every clone shares the same backing store.
#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    /// Create a session store over a key-value store
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    // ===== Token =====

    /// Store the bearer token, replacing any previous one
    pub async fn store_token(&self, token: &str) -> Result<()> {
        self.kv.set(TOKEN_KEY, token).await.map_err(|e| {
            tracing::warn!("Failed to store token: {}", e);
            e.into()
        })
    }

    /// Read the bearer token, treating storage failures as absent
    pub async fn get_token(&self) -> Option<String> {
        match self.try_get_token().await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Failed to read token: {}", e);
                None
            }
        }
    }

    /// Read the bearer token, surfacing storage failures
    pub async fn try_get_token(&self) -> Result<Option<String>> {
        Ok(self.kv.get(TOKEN_KEY).await?)
    }

    /// Remove the bearer token (no-op if absent)
    pub async fn remove_token(&self) -> Result<()> {
        self.kv.remove(TOKEN_KEY).await.map_err(|e| {
            tracing::warn!("Failed to remove token: {}", e);
            e.into()
        })
    }

    // ===== Profile =====

    /// Store the profile as JSON, replacing any previous one
    pub async fn store_profile(&self, profile: &Profile) -> Result<()> {
        let json = serde_json::to_string(profile)?;
        self.kv.set(PROFILE_KEY, &json).await.map_err(|e| {
            tracing::warn!("Failed to store profile: {}", e);
            e.into()
        })
    }

    /// Read the cached profile, treating failures and corrupt data as absent
    pub async fn get_profile(&self) -> Option<Profile> {
        match self.try_get_profile().await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!("Failed to read profile: {}", e);
                None
            }
        }
    }

    /// Read the cached profile, surfacing storage and parse failures
    pub async fn try_get_profile(&self) -> Result<Option<Profile>> {
        match self.kv.get(PROFILE_KEY).await? {
            Some(json) => {
                let profile: Profile = serde_json::from_str(&json)?;
                // A stored `null` counts as no profile
                Ok(Some(profile).filter(|p| !p.as_value().is_null()))
            }
            None => Ok(None),
        }
    }

    /// Remove the cached profile (no-op if absent)
    pub async fn remove_profile(&self) -> Result<()> {
        self.kv.remove(PROFILE_KEY).await.map_err(|e| {
            tracing::warn!("Failed to remove profile: {}", e);
            e.into()
        })
    }

    // ===== Session =====

    /// Check for a stored token. No network and no token validation.
    pub async fn is_authenticated(&self) -> bool {
        self.get_token().await.is_some_and(|token| !token.is_empty())
    }

    /// Check for a stored token, surfacing storage failures
    pub async fn try_is_authenticated(&self) -> Result<bool> {
        Ok(self.try_get_token().await?.is_some_and(|token| !token.is_empty()))
    }

    /// Remove token and profile together
    ///
    /// If the combined removal fails, the token is removed on its own so the
    /// user is not left signed in. The original failure is still returned.
    pub async fn clear_session(&self) -> Result<()> {
        match self.kv.multi_remove(&[TOKEN_KEY, PROFILE_KEY]).await {
            Ok(()) => {
                tracing::debug!("Session cleared");
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to clear session: {}", e);
                if let Err(fallback) = self.kv.remove(TOKEN_KEY).await {
                    tracing::error!("Failed to remove token after clear failure: {}", fallback);
                }
                Err(e.into())
            }
        }
    }

    /// Read token and profile in one snapshot (fail-open)
    pub async fn load(&self) -> Session {
        Session {
            token: self.get_token().await,
            profile: self.get_profile().await,
        }
    }

    /// Write a whole session; absent fields remove their key
    pub async fn save(&self, session: &Session) -> Result<()> {
        match &session.token {
            Some(token) => self.store_token(token).await?,
            None => self.remove_token().await?,
        }
        match &session.profile {
            Some(profile) => self.store_profile(profile).await,
            None => self.remove_profile().await,
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}
