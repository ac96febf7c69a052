//! Session-token request/response DTOs and the token itself.
//!
//! Wire names are camelCase to match the widget's JSON contract. A
//! [`SessionTokenRequest`] is accepted when it names at least one
//! destination (either explicit wallet addresses or a bare blockchain
//! list); everything else is optional widget configuration passed through
//! to the upstream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::wallet::DestinationWallet;

// ---------------------------------------------------------------------------
// SessionToken
// ---------------------------------------------------------------------------

/// A short-lived, single-use session token.
///
/// Real tokens come back opaque from the upstream (`mock == false`);
/// development fallback tokens are minted locally (`mock == true`) and are
/// the only tokens the advisory verifier can decode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionToken {
    /// The opaque token string.
    pub token: String,
    /// Expiry, when known. Upstream tokens may omit it.
    pub expires_at: Option<DateTime<Utc>>,
    /// Whether this is a locally minted development token.
    pub mock: bool,
}

// ---------------------------------------------------------------------------
// Request / Response DTOs
// ---------------------------------------------------------------------------

/// Body of `POST /api/session`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionTokenRequest {
    /// Destination wallets for the session.
    pub addresses: Option<Vec<DestinationWallet>>,
    /// Asset symbols to offer, session-wide.
    pub assets: Option<Vec<String>>,
    /// Blockchains to offer when no explicit wallets are given.
    pub blockchains: Option<Vec<String>>,
    /// Fiat currency preselected in the widget (e.g. `"USD"`).
    pub fiat_currency: Option<String>,
    /// Default purchase amount preselected in the widget.
    pub default_amount: Option<String>,
    /// Default network preselected in the widget.
    pub default_network: Option<String>,
    /// Partner-scoped end-user identifier.
    pub partner_user_id: Option<String>,
    /// Widget experience (`"buy"` or `"send"`).
    pub default_experience: Option<String>,
}

impl SessionTokenRequest {
    /// Validate the request.
    ///
    /// At least one of `addresses` / `blockchains` must be non-empty, and
    /// every supplied wallet must carry an address.
    pub fn validate(&self) -> Result<(), ModelError> {
        let has_addresses = self
            .addresses
            .as_ref()
            .is_some_and(|wallets| !wallets.is_empty());
        let has_blockchains = self
            .blockchains
            .as_ref()
            .is_some_and(|chains| !chains.is_empty());

        if !has_addresses && !has_blockchains {
            return Err(ModelError::MissingParameters);
        }
        if let Some(wallets) = &self.addresses {
            for wallet in wallets {
                wallet.validate()?;
            }
        }
        Ok(())
    }
}

/// Success body of `POST /api/session`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTokenResponse {
    /// The session token (real or development fallback).
    pub token: String,
    /// Expiry, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Whether the token is a development fallback.
    pub mock: bool,
    /// Server-side processing time in milliseconds.
    pub response_time: u64,
    /// Correlation id echoed in logs.
    pub request_id: String,
}

/// Error body for all non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Stable, non-sensitive error summary.
    pub error: String,
    /// Optional extra detail, never an upstream response body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Correlation id echoed in logs.
    pub request_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_with_addresses_is_valid() {
        let req: SessionTokenRequest = serde_json::from_str(
            r#"{"addresses": [{"address": "0xABC", "blockchains": ["base"], "assets": ["ETH", "USDC"]}]}"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn request_with_only_blockchains_is_valid() {
        let req: SessionTokenRequest =
            serde_json::from_str(r#"{"blockchains": ["base"]}"#).unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn empty_request_is_missing_parameters() {
        let req: SessionTokenRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.validate(), Err(ModelError::MissingParameters));
    }

    #[test]
    fn empty_lists_count_as_missing() {
        let req: SessionTokenRequest =
            serde_json::from_str(r#"{"addresses": [], "blockchains": []}"#).unwrap();
        assert_eq!(req.validate(), Err(ModelError::MissingParameters));
    }

    #[test]
    fn wallet_without_address_fails_validation() {
        let req: SessionTokenRequest =
            serde_json::from_str(r#"{"addresses": [{"address": ""}]}"#).unwrap();
        assert!(matches!(
            req.validate(),
            Err(ModelError::InvalidWallet { .. })
        ));
    }

    #[test]
    fn optional_fields_use_camel_case_wire_names() {
        let req: SessionTokenRequest = serde_json::from_str(
            r#"{"blockchains": ["base"], "fiatCurrency": "USD", "defaultAmount": "25",
                "defaultNetwork": "base", "partnerUserId": "user-1", "defaultExperience": "buy"}"#,
        )
        .unwrap();
        assert_eq!(req.fiat_currency.as_deref(), Some("USD"));
        assert_eq!(req.partner_user_id.as_deref(), Some("user-1"));
        assert_eq!(req.default_experience.as_deref(), Some("buy"));
    }

    #[test]
    fn response_serialises_camel_case() {
        let res = SessionTokenResponse {
            token: "tok-123".into(),
            expires_at: None,
            mock: false,
            response_time: 12,
            request_id: "req-1".into(),
        };
        let json = serde_json::to_value(&res).unwrap();
        assert_eq!(json["token"], "tok-123");
        assert_eq!(json["mock"], false);
        assert!(json.get("expiresAt").is_none());
        assert!(json.get("responseTime").is_some());
        assert!(json.get("requestId").is_some());
    }

    #[test]
    fn error_response_omits_absent_details() {
        let res = ErrorResponse {
            error: "Missing required parameters".into(),
            details: None,
            request_id: "req-1".into(),
        };
        let json = serde_json::to_value(&res).unwrap();
        assert!(json.get("details").is_none());
    }
}
