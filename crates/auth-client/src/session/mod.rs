//! Session persistence
//!
//! A session is the bearer token plus the cached user profile. Both live in a
//! [`storage::KeyValueStore`] under fixed keys:
//! - `authToken`: the raw token string
//! - `userData`: the profile as a JSON document
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use auth_client::session::{Profile, SessionStore};
//! use storage::MemoryKvStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SessionStore::new(Arc::new(MemoryKvStore::new()));
//!
//! store.store_token("abc").await?;
//! assert!(store.is_authenticated().await);
//!
//! let profile = Profile::new(serde_json::json!({ "id": 1, "email": "a@b.com" }));
//! store.store_profile(&profile).await?;
//! assert_eq!(store.get_profile().await, Some(profile));
//! # Ok(())
//! # }
//! ```

mod store;

pub use store::SessionStore;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Storage key holding the bearer token
pub const TOKEN_KEY: &str = "authToken";

/// Storage key holding the serialized profile
pub const PROFILE_KEY: &str = "userData";

/// Errors that can occur while reading or writing the session
#[derive(Debug, Error)]
pub enum SessionStoreError {
    /// Underlying key-value store failed
    #[error("Storage error: {0}")]
    Storage(#[from] storage::KvError),

    /// Profile could not be serialized or the stored JSON is corrupt
    #[error("Profile serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionStoreError>;

/// Server-owned user record cached for display
///
/// The client does not validate the shape; any JSON value round-trips. The
/// accessors are conveniences that return `None` when a field is missing or
/// has an unexpected type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Profile(Value);

impl Profile {
    /// Wrap a raw JSON value
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// User id, rendered as a string whether the server sent a number or a string
    pub fn id(&self) -> Option<String> {
        match self.0.get("id")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Email address
    pub fn email(&self) -> Option<&str> {
        self.str_field("email")
    }

    /// Display name
    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    /// Account creation timestamp as sent by the server
    pub fn created_at(&self) -> Option<&str> {
        self.str_field("createdAt")
    }

    /// Look up an arbitrary field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Borrow the raw JSON value
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consume into the raw JSON value
    pub fn into_value(self) -> Value {
        self.0
    }

    fn str_field(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }
}

impl From<Value> for Profile {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Snapshot of everything the session store holds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    /// Bearer token, if signed in
    pub token: Option<String>,
    /// Cached profile, if any
    pub profile: Option<Profile>,
}

impl Session {
    /// Create a session from a token and an optional profile
    pub fn new(token: impl Into<String>, profile: Option<Profile>) -> Self {
        Self {
            token: Some(token.into()),
            profile,
        }
    }

    /// Authentication is defined solely by presence of a non-empty token
    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|token| !token.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_accessors() {
        let profile = Profile::new(json!({
            "id": 42,
            "email": "alice@example.com",
            "name": "Alice",
            "createdAt": "2024-01-01T00:00:00Z",
            "plan": "pro"
        }));

        assert_eq!(profile.id(), Some("42".to_string()));
        assert_eq!(profile.email(), Some("alice@example.com"));
        assert_eq!(profile.name(), Some("Alice"));
        assert_eq!(profile.created_at(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(profile.get("plan"), Some(&json!("pro")));
    }

    #[test]
    fn test_profile_string_id_and_missing_fields() {
        let profile = Profile::new(json!({ "id": "u-1" }));
        assert_eq!(profile.id(), Some("u-1".to_string()));
        assert_eq!(profile.email(), None);
        assert_eq!(profile.name(), None);

        let odd = Profile::new(json!({ "id": true, "email": 5 }));
        assert_eq!(odd.id(), None);
        assert_eq!(odd.email(), None);
    }

    #[test]
    fn test_profile_serializes_transparently() {
        let value = json!({ "id": 1, "email": "a@b.com" });
        let profile = Profile::from(value.clone());

        let serialized = serde_json::to_string(&profile).unwrap();
        let back: Value = serde_json::from_str(&serialized).unwrap();
        assert_eq!(back, value);
        assert_eq!(profile.into_value(), value);
    }

    #[test]
    fn test_session_is_authenticated_by_token_only() {
        let empty = Session::default();
        assert!(!empty.is_authenticated());

        let profile_only = Session {
            token: None,
            profile: Some(Profile::new(json!({ "id": 1 }))),
        };
        assert!(!profile_only.is_authenticated());

        let signed_in = Session::new("abc", None);
        assert!(signed_in.is_authenticated());

        let empty_token = Session::new("", None);
        assert!(!empty_token.is_authenticated());
    }
}
