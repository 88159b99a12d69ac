//! Thin REST client for the ArtTrack API, plus the mapping from HTTP
//! failures onto the core error kinds.

use arttrack_core::error::{AuthError, StoreError};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// `{ "data": T }` envelope used by every JSON payload.
#[derive(Debug, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

/// `{ "error", "code" }` body returned on failure.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    code: String,
}

/// Errors from the REST layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("API error ({status}, {code}): {message}")]
    Status {
        status: u16,
        /// Server error code, or `"UNKNOWN"` if the body was not JSON.
        code: String,
        message: String,
    },
}

impl ApiError {
    /// The server rejected the credentials the request carried.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status: 401, .. })
    }
}

impl From<ApiError> for StoreError {
    fn from(err: ApiError) -> Self {
        match &err {
            ApiError::Status { status: 403, message, .. } => {
                StoreError::PermissionDenied(message.clone())
            }
            ApiError::Status { status: 501, message, .. } => {
                StoreError::Unsupported(message.clone())
            }
            _ => StoreError::Transport(err.to_string()),
        }
    }
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        match &err {
            ApiError::Status { code, message, .. } => match code.as_str() {
                "INVALID_CREDENTIAL" => AuthError::InvalidCredential,
                "DUPLICATE_ACCOUNT" => AuthError::DuplicateAccount,
                "WEAK_PASSWORD" => AuthError::WeakSecret,
                "REGISTRATION_DISABLED" => AuthError::ProviderDisabled,
                "VALIDATION_ERROR" => AuthError::Validation(message.clone()),
                _ => AuthError::Other(message.clone()),
            },
            ApiError::Request(e) => AuthError::Other(e.to_string()),
        }
    }
}

/// HTTP client for one ArtTrack server.
///
/// Holds the current access token; requests are sent with it when set.
pub struct ApiClient {
    client: reqwest::Client,
    api_url: String,
    access_token: RwLock<Option<String>>,
}

impl ApiClient {
    /// * `api_url` - Base URL, e.g. `http://localhost:3000`.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            access_token: RwLock::new(None),
        }
    }

    pub async fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write().await = token;
    }

    pub async fn has_access_token(&self) -> bool {
        self.access_token.read().await.is_some()
    }

    pub async fn access_token(&self) -> Option<String> {
        self.access_token.read().await.clone()
    }

    /// Start a request against `/api/v1{path}` carrying the bearer token.
    pub async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}/api/v1{path}", self.api_url));
        match self.access_token.read().await.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub async fn get_data<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let response = self.request(Method::GET, path).await.query(query).send().await?;
        let envelope: DataResponse<T> = Self::ensure_success(response).await?.json().await?;
        Ok(envelope.data)
    }

    /// Send a JSON body and decode a JSON response.
    pub async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.request(method, path).await.json(body).send().await?;
        Ok(Self::ensure_success(response).await?.json().await?)
    }

    /// Send an optional JSON body and expect an empty success response.
    pub async fn send_empty<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), ApiError> {
        let mut builder = self.request(method, path).await;
        if let Some(body) = body {
            builder = builder.json(body);
        }
        Self::ensure_success(builder.send().await?).await?;
        Ok(())
    }

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        Err(error_from_body(status, &text))
    }
}

/// Build an [`ApiError::Status`] from a failed response body.
pub fn error_from_body(status: StatusCode, body: &str) -> ApiError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => ApiError::Status {
            status: status.as_u16(),
            code: parsed.code,
            message: parsed.error,
        },
        Err(_) => ApiError::Status {
            status: status.as_u16(),
            code: "UNKNOWN".to_string(),
            message: body.to_string(),
        },
    }
}
