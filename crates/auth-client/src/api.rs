//! Auth API client
//!
//! [`AuthApi`] is the seam the rest of the workspace depends on.
//! [`HttpAuthApi`] implements it over REST, with every request going through
//! [`AuthorizedClient`], which attaches the stored bearer token and drops it
//! again when the server answers 401.

use crate::error::{AuthError, Result, INVALID_RESPONSE_MESSAGE};
use crate::http::{ApiClientConfig, ApiRequest, ApiResponse, HttpClient, HttpError};
use crate::session::{Profile, SessionStore};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Fallback message for failed logins
pub const LOGIN_FAILED: &str = "Login failed";
/// Fallback message for failed signups
pub const SIGNUP_FAILED: &str = "Signup failed";
/// Fallback message for failed logouts
pub const LOGOUT_FAILED: &str = "Logout failed";
/// Fallback message for failed profile fetches
pub const PROFILE_FAILED: &str = "Failed to get profile";

// ===== Endpoints =====

const LOGIN_PATH: &str = "/auth/login";
const SIGNUP_PATH: &str = "/auth/signup";
const LOGOUT_PATH: &str = "/auth/logout";
const PROFILE_PATH: &str = "/user/profile";

/// Result of a successful login or signup
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    /// Bearer token issued by the server
    pub token: String,
    /// User record, when the server included one
    pub profile: Option<Profile>,
}

/// Remote authentication operations
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for a token
    async fn login(&self, email: &str, password: &str) -> Result<AuthSession>;

    /// Register a new account and receive a token
    async fn signup(&self, email: &str, password: &str, name: &str) -> Result<AuthSession>;

    /// Tell the server the session is over
    async fn logout(&self) -> Result<()>;

    /// Fetch the signed-in user's profile
    async fn get_profile(&self) -> Result<Profile>;
}

// ===== Wire types =====

/// Request body for login
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    /// Account email
    pub email: &'a str,
    /// Account password
    pub password: &'a str,
}

/// Request body for signup
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest<'a> {
    /// Account email
    pub email: &'a str,
    /// Account password
    pub password: &'a str,
    /// Display name
    pub name: &'a str,
}

/// Response body for login and signup
///
/// Both fields are optional on the wire so a missing token can be reported as
/// an invalid response instead of a parse error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthResponse {
    /// Bearer token
    #[serde(default)]
    pub token: Option<String>,
    /// User record
    #[serde(default)]
    pub user: Option<Profile>,
}

impl AuthResponse {
    /// Require a non-empty token
    pub fn into_session(self) -> Result<AuthSession> {
        match self.token.filter(|token| !token.is_empty()) {
            Some(token) => Ok(AuthSession {
                token,
                profile: self.user.filter(|user| !user.as_value().is_null()),
            }),
            None => Err(AuthError::InvalidResponse(
                INVALID_RESPONSE_MESSAGE.to_string(),
            )),
        }
    }
}

// ===== Authorized transport =====

/// Decorator over [`HttpClient`] that manages the bearer token
///
/// Before every request the current token is read from the session store and
/// attached as `Authorization: Bearer <token>` when present. A 401 response
/// removes the stored token before the error is returned.
#[derive(Debug, Clone)]
pub struct AuthorizedClient {
    http: HttpClient,
    session: SessionStore,
}

impl AuthorizedClient {
    /// Wrap a transport with token handling
    pub fn new(http: HttpClient, session: SessionStore) -> Self {
        Self { http, session }
    }

    /// Send a request and decode the JSON body
    pub async fn send<T>(&self, request: ApiRequest) -> std::result::Result<ApiResponse<T>, HttpError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let request = self.authorize(request).await;
        let result = self.http.send(request).await;
        self.observe(result).await
    }

    /// Send a request whose response body is ignored
    pub async fn send_empty(&self, request: ApiRequest) -> std::result::Result<u16, HttpError> {
        let request = self.authorize(request).await;
        let result = self.http.send_empty(request).await;
        self.observe(result).await
    }

    /// Get the session store the client reads tokens from
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Get the underlying transport
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    async fn authorize(&self, request: ApiRequest) -> ApiRequest {
        // A failed read sends the request unauthenticated
        match self.session.get_token().await {
            Some(token) => request.bearer(&token),
            None => request,
        }
    }

    async fn observe<T>(
        &self,
        result: std::result::Result<T, HttpError>,
    ) -> std::result::Result<T, HttpError> {
        if let Err(error) = &result {
            if error.is_unauthorized() {
                tracing::info!("Server rejected token, removing it");
                if let Err(e) = self.session.remove_token().await {
                    tracing::error!("Failed to remove rejected token: {}", e);
                }
            }
        }
        result
    }
}

// ===== REST implementation =====

/// [`AuthApi`] over the REST endpoints
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use auth_client::{ApiClientConfig, AuthApi, HttpAuthApi, SessionStore};
/// use storage::MemoryKvStore;
///
/// async fn example() -> Result<(), Box<dyn std::error::Error>> {
///     let session = SessionStore::new(Arc::new(MemoryKvStore::new()));
///     let api = HttpAuthApi::new(ApiClientConfig::default(), session.clone())?;
///
///     let signed_in = api.login("alice@example.com", "secret1").await?;
///     session.store_token(&signed_in.token).await?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    client: AuthorizedClient,
}

impl HttpAuthApi {
    /// Build the client from a transport config and the session store
    pub fn new(config: ApiClientConfig, session: SessionStore) -> std::result::Result<Self, HttpError> {
        let http = HttpClient::new(config)?;
        Ok(Self::with_client(AuthorizedClient::new(http, session)))
    }

    /// Build the client around an existing authorized transport
    pub fn with_client(client: AuthorizedClient) -> Self {
        Self { client }
    }

    /// Get the authorized transport
    pub fn client(&self) -> &AuthorizedClient {
        &self.client
    }

    async fn authenticate<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> Result<AuthSession> {
        let request = ApiRequest::post(path).json_body(body).map_err(|e| {
            AuthError::Transport {
                message: fallback.to_string(),
                detail: format!("Failed to encode request: {}", e),
            }
        })?;

        let response = self
            .client
            .send::<AuthResponse>(request)
            .await
            .map_err(|e| AuthError::from_http(e, fallback))?;

        response.data.into_session()
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, email: &str, password: &str) -> Result<AuthSession> {
        tracing::debug!("Logging in {}", email);
        let body = LoginRequest { email, password };
        self.authenticate(LOGIN_PATH, &body, LOGIN_FAILED).await
    }

    async fn signup(&self, email: &str, password: &str, name: &str) -> Result<AuthSession> {
        tracing::debug!("Signing up {}", email);
        let body = SignupRequest {
            email,
            password,
            name,
        };
        self.authenticate(SIGNUP_PATH, &body, SIGNUP_FAILED).await
    }

    async fn logout(&self) -> Result<()> {
        self.client
            .send_empty(ApiRequest::post(LOGOUT_PATH))
            .await
            .map(|_| ())
            .map_err(|e| AuthError::from_http(e, LOGOUT_FAILED))
    }

    async fn get_profile(&self) -> Result<Profile> {
        self.client
            .send::<Profile>(ApiRequest::get(PROFILE_PATH))
            .await
            .map_err(|e| AuthError::from_http(e, PROFILE_FAILED))
            .and_then(|response| {
                if response.data.as_value().is_null() {
                    Err(AuthError::InvalidResponse(
                        INVALID_RESPONSE_MESSAGE.to_string(),
                    ))
                } else {
                    Ok(response.data)
                }
            })
    }
}
