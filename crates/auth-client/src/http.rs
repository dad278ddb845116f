//! HTTP transport for the auth API
//!
//! This module provides request/response types, the transport error shape,
//! and the reqwest-backed client every API call goes through. It knows
//! nothing about tokens; see [`crate::api::AuthorizedClient`] for that.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

// =============================================================================
// Error Types
// =============================================================================

/// Transport-level failure of an API request
///
/// A request either never produced a response (`status` is `None`), produced a
/// non-2xx response, or produced a body that could not be decoded.
///
/// # Examples
/// ```
/// use auth_client::http::HttpError;
///
/// let error = HttpError::status(401, Some("Token expired".to_string()), "HTTP 401");
/// assert!(error.is_unauthorized());
/// assert_eq!(error.server_message(), Some("Token expired"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    /// HTTP status code, if a response was received
    status: Option<u16>,
    /// Message the server put in its error body
    server_message: Option<String>,
    /// Diagnostic detail (not meant for users)
    detail: String,
    /// Whether the failure happened while decoding a 2xx body
    decode: bool,
}

impl HttpError {
    /// No response was received (connection refused, DNS, timeout)
    pub fn transport(detail: impl Into<String>) -> Self {
        Self {
            status: None,
            server_message: None,
            detail: detail.into(),
            decode: false,
        }
    }

    /// The server answered with a non-success status
    pub fn status(status: u16, server_message: Option<String>, detail: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            server_message,
            detail: detail.into(),
            decode: false,
        }
    }

    /// A success response carried a body that could not be decoded
    pub fn decode(status: u16, detail: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            server_message: None,
            detail: detail.into(),
            decode: true,
        }
    }

    /// Get the HTTP status code, if any
    pub fn status_code(&self) -> Option<u16> {
        self.status
    }

    /// Get the server-provided message, if any
    pub fn server_message(&self) -> Option<&str> {
        self.server_message.as_deref()
    }

    /// Get the diagnostic detail
    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Check if no response was received
    pub fn is_transport(&self) -> bool {
        self.status.is_none()
    }

    /// Check if the server rejected the credentials (401)
    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }

    /// Check if a success body failed to decode
    pub fn is_decode(&self) -> bool {
        self.decode
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "HTTP {}: {}", status, self.detail),
            None => write!(f, "Request failed: {}", self.detail),
        }
    }
}

impl std::error::Error for HttpError {}

/// Error body the API returns alongside non-2xx statuses
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Short error code or message, used when `message` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Pick the most useful message out of the body
    pub fn into_message(self) -> Option<String> {
        self.message
            .or(self.error)
            .filter(|message| !message.trim().is_empty())
    }
}

// =============================================================================
// Request Types
// =============================================================================

/// HTTP method for API requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET request
    Get,
    /// POST request
    Post,
}

impl HttpMethod {
    /// Method name as sent on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// An API request relative to the configured base URL
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Path below the base URL (e.g., "/auth/login")
    pub path: String,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// JSON request body
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    /// Create a new GET request
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Create a new POST request
    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Attach a bearer token
    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {}", token))
    }

    /// Set the request body from JSON
    pub fn json_body<T: Serialize>(mut self, value: &T) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_vec(value)?);
        Ok(self)
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// A successful API response
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HashMap<String, String>,
    /// Response data
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// Create a new response
    pub fn new(status: u16, headers: HashMap<String, String>, data: T) -> Self {
        Self { status, headers, data }
    }

    /// Get a header value
    pub fn header(&self, key: &str) -> Option<&String> {
        self.headers.get(key)
    }
}

// =============================================================================
// Client Configuration
// =============================================================================

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL every request path is appended to
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Headers included in all requests
    pub default_headers: HashMap<String, String>,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        let mut default_headers = HashMap::new();
        default_headers.insert("Content-Type".to_string(), "application/json".to_string());

        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("Auth-Starter/{}", env!("CARGO_PKG_VERSION")),
            default_headers,
        }
    }
}

impl ApiClientConfig {
    /// Create a new config with a base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Add a default header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// Join the base URL and a request path
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

// =============================================================================
// Client Implementation
// =============================================================================

use reqwest::{Client as ReqwestClient, Response as ReqwestResponse};

/// HTTP client for the auth API
///
/// # Examples
/// ```
/// use auth_client::http::{ApiClientConfig, ApiRequest, HttpClient};
///
/// async fn example() -> Result<(), Box<dyn std::error::Error>> {
///     let client = HttpClient::new(ApiClientConfig::new("http://localhost:5000/api"))?;
///
///     let request = ApiRequest::get("/user/profile").bearer("token");
///     let response = client.send::<serde_json::Value>(request).await?;
///     println!("{}", response.data);
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    /// HTTP client
    client: ReqwestClient,
    /// Configuration
    config: ApiClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(config: ApiClientConfig) -> Result<Self, HttpError> {
        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| HttpError::transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Send a request and decode the JSON body
    pub async fn send<T>(&self, request: ApiRequest) -> Result<ApiResponse<T>, HttpError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = self.dispatch(request).await?;
        self.parse_response(response).await
    }

    /// Send a request whose response body is ignored
    pub async fn send_empty(&self, request: ApiRequest) -> Result<u16, HttpError> {
        let response = self.dispatch(request).await?;
        let status = response.status().as_u16();

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        Ok(status)
    }

    /// Execute a request and return the raw response
    async fn dispatch(&self, request: ApiRequest) -> Result<ReqwestResponse, HttpError> {
        let url = self.config.url_for(&request.path);

        let mut req = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
        };

        for (key, value) in &self.config.default_headers {
            req = req.header(key, value);
        }

        for (key, value) in &request.headers {
            req = req.header(key, value);
        }

        if let Some(body) = request.body {
            req = req.body(body);
        }

        tracing::debug!("{} {}", request.method.as_str(), url);

        req.send().await.map_err(|e| {
            if e.is_timeout() {
                HttpError::transport(format!("Request timed out: {}", e))
            } else {
                HttpError::transport(e.to_string())
            }
        })
    }

    /// Turn a non-2xx response into an error, keeping the server's message
    async fn error_from_response(response: ReqwestResponse) -> HttpError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        let server_message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(ErrorBody::into_message);

        HttpError::status(status, server_message, truncate_body(&body))
    }

    /// Parse a reqwest response into an ApiResponse
    async fn parse_response<T>(&self, response: ReqwestResponse) -> Result<ApiResponse<T>, HttpError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let status = response.status().as_u16();

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(value_str) = value.to_str() {
                headers.insert(key.to_string(), value_str.to_string());
            }
        }

        let body = response.text().await.map_err(|e| {
            HttpError::decode(status, format!("Failed to read response: {}", e))
        })?;

        let data: T = serde_json::from_str(&body).map_err(|e| {
            HttpError::decode(status, format!("Failed to parse JSON: {}", e))
        })?;

        Ok(ApiResponse::new(status, headers, data))
    }

    /// Get the client configuration
    pub fn config(&self) -> &ApiClientConfig {
        &self.config
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }
}

/// Maximum length for error response bodies kept in diagnostics
const MAX_ERROR_BODY_LENGTH: usize = 500;

fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
}

// =============================================================================
// Tests
// =============================================================================
