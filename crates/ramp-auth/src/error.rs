//! Error types for the session-token service.
//!
//! [`AuthError`] unifies all failure modes and implements [`axum::response::IntoResponse`]
//! so handlers can return `Result<…, AuthError>` directly. The session
//! handler additionally consults [`AuthError::is_recoverable`] to decide
//! whether to degrade to a development token instead of surfacing the
//! error at all.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ramp_models::{ErrorResponse, ModelError};

/// Errors that can occur while issuing or verifying a session token.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Credentials are missing or malformed (environment and key file).
    #[error("configuration error: {0}")]
    Config(String),

    /// The private key could not be parsed or the signature operation failed.
    #[error("signing failed: {0}")]
    Signing(String),

    /// The upstream rejected the signed assertion (HTTP 401).
    #[error("upstream rejected the assertion")]
    Authentication,

    /// The upstream denied access to the token endpoint (HTTP 403).
    #[error("upstream denied access")]
    Permission,

    /// The upstream rejected the wallet/asset parameters (HTTP 400).
    #[error("upstream rejected the session parameters")]
    Validation,

    /// Any other upstream failure: non-2xx status, transport error, timeout.
    #[error("upstream request failed: {0}")]
    Upstream(String),

    /// The inbound request failed local validation (missing destinations,
    /// empty wallet address).
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] ModelError),

    /// The client exceeded the per-IP rate limit.
    #[error("too many requests")]
    RateLimited,

    /// JSON (de)serialisation error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AuthError {
    /// Whether the session handler should degrade to a development token.
    ///
    /// Credential, signing and generic upstream failures are recoverable:
    /// the demo keeps working on a `mock: true` token. Explicit upstream
    /// verdicts (401/403/400) and inbound validation failures are not.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::Signing(_) | Self::Upstream(_)
        )
    }

    /// HTTP status this error maps to when surfaced.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::Validation => StatusCode::BAD_REQUEST,
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::Permission => StatusCode::FORBIDDEN,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable, non-sensitive summary for the response body.
    ///
    /// Upstream response bodies are never echoed here.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::InvalidRequest(ModelError::MissingParameters) => "Missing required parameters",
            Self::InvalidRequest(_) => "Invalid request",
            Self::Authentication | Self::Permission | Self::Validation => {
                "Failed to generate session token"
            }
            Self::RateLimited => "Too many requests",
            _ => "Internal server error",
        }
    }

    /// Optional extra detail for the response body.
    pub fn public_details(&self) -> Option<String> {
        match self {
            Self::Authentication | Self::Permission | Self::Validation => {
                Some(self.to_string())
            }
            Self::InvalidRequest(ModelError::MissingParameters) => {
                Some("either addresses or blockchains must be supplied".into())
            }
            Self::InvalidRequest(e) => Some(e.to_string()),
            _ => None,
        }
    }

    /// Build the wire-format error body for a given request id.
    pub fn to_response_body(&self, request_id: &str) -> ErrorResponse {
        ErrorResponse {
            error: self.public_message().to_string(),
            details: self.public_details(),
            request_id: request_id.to_string(),
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        AuthError::Upstream(e.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let request_id = uuid::Uuid::new_v4().to_string();

        tracing::error!(%status, request_id = %request_id, error = %self, "request failed");
        (status, Json(self.to_response_body(&request_id))).into_response()
    }
}
