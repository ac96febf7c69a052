//! Outbound session-token request to the CDP API.
//!
//! One POST per issuance, authenticated with the signed assertion as a
//! bearer token. No retries live here: a failed request surfaces as one
//! of the taxonomy errors and the caller decides what to do (the session
//! handler degrades to a development token on generic upstream failure).

use std::time::Duration;

use chrono::{DateTime, Utc};
use ramp_models::{DestinationWallet, SessionToken, SessionTokenRequest};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Path of the upstream token endpoint, relative to the base URL.
pub const TOKEN_PATH: &str = "/onramp/v1/token";

// ---------------------------------------------------------------------------
// Upstream wire types
// ---------------------------------------------------------------------------

/// JSON body of the upstream token request.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpstreamTokenRequest<'a> {
    addresses: Vec<UpstreamAddress<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    assets: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    blockchains: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fiat_currency: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_amount: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_network: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    partner_user_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_experience: Option<&'a str>,
}

#[derive(Serialize)]
struct UpstreamAddress<'a> {
    address: &'a str,
    blockchains: &'a [String],
    #[serde(skip_serializing_if = "slice_is_empty")]
    assets: &'a [String],
}

fn slice_is_empty(slice: &&[String]) -> bool {
    slice.is_empty()
}

impl<'a> From<&'a DestinationWallet> for UpstreamAddress<'a> {
    fn from(wallet: &'a DestinationWallet) -> Self {
        Self {
            address: &wallet.address,
            blockchains: &wallet.blockchains,
            assets: &wallet.assets,
        }
    }
}

/// JSON body of a successful upstream response.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpstreamTokenResponse {
    token: String,
    #[serde(default)]
    expires_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// TokenRequester
// ---------------------------------------------------------------------------

/// HTTP client for the upstream token endpoint.
#[derive(Debug, Clone)]
pub struct TokenRequester {
    client: reqwest::Client,
    base_url: String,
}

impl TokenRequester {
    /// Create a requester with a bounded per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Upstream(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Exchange a signed assertion and wallet parameters for a session token.
    ///
    /// Error mapping is exhaustive: 401 → [`AuthError::Authentication`],
    /// 403 → [`AuthError::Permission`], 400 → [`AuthError::Validation`],
    /// anything else (other statuses, transport failures, timeouts) →
    /// [`AuthError::Upstream`].
    pub async fn request_session_token(
        &self,
        assertion: &str,
        request: &SessionTokenRequest,
    ) -> Result<SessionToken, AuthError> {
        let body = UpstreamTokenRequest {
            addresses: request
                .addresses
                .iter()
                .flatten()
                .map(UpstreamAddress::from)
                .collect(),
            assets: request.assets.as_deref(),
            blockchains: request.blockchains.as_deref(),
            fiat_currency: request.fiat_currency.as_deref(),
            default_amount: request.default_amount.as_deref(),
            default_network: request.default_network.as_deref(),
            partner_user_id: request.partner_user_id.as_deref(),
            default_experience: request.default_experience.as_deref(),
        };

        let url = format!("{}{TOKEN_PATH}", self.base_url);
        let res = self
            .client
            .post(&url)
            .bearer_auth(assertion)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AuthError::Upstream(format!("upstream timed out: {e}"))
                } else {
                    AuthError::Upstream(format!("upstream unreachable: {e}"))
                }
            })?;

        let status = res.status();
        if status.is_success() {
            let parsed: UpstreamTokenResponse = res
                .json()
                .await
                .map_err(|e| AuthError::Upstream(format!("malformed upstream response: {e}")))?;
            return Ok(SessionToken {
                token: parsed.token,
                expires_at: parsed.expires_at,
                mock: false,
            });
        }

        // Upstream bodies are logged for operators but never surfaced to
        // callers.
        let detail = res.text().await.unwrap_or_default();
        tracing::debug!(%status, body = %detail, "upstream rejected token request");

        Err(match status {
            StatusCode::UNAUTHORIZED => AuthError::Authentication,
            StatusCode::FORBIDDEN => AuthError::Permission,
            StatusCode::BAD_REQUEST => AuthError::Validation,
            s => AuthError::Upstream(format!("upstream returned {s}")),
        })
    }
}
