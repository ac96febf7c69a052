//! Development-token minting and advisory verification.
//!
//! When production issuance is unavailable the service mints a local
//! placeholder token so the demo keeps working. The token is
//! `base64url(claims).tag` where the tag is a keyed SHA-256 digest over
//! the encoded claims. [`verify`] can therefore only vouch for tokens this
//! service minted itself; genuine upstream tokens are opaque (their
//! signing key is not available here) and always verify as invalid. That
//! asymmetry is deliberate and documented, not a defect.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use ramp_models::SessionToken;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Claims embedded in a development token.
#[derive(Debug, Serialize, Deserialize)]
struct DevTokenClaims {
    /// Unique token id.
    jti: String,
    /// Project the token was minted for.
    project_id: String,
    /// Expiry as a unix timestamp.
    exp: i64,
    /// Always `true`; callers must not treat these as production tokens.
    mock: bool,
}

/// Outcome of an advisory verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    /// Whether the token is a live, self-minted development token.
    pub valid: bool,
    /// Why verification failed, when it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Verification {
    fn ok() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
        }
    }
}

/// Mint a development fallback token for the given project.
pub fn mint_development_token(project_id: &str, secret: &str, ttl: Duration) -> SessionToken {
    let expires_at = Utc::now() + chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::minutes(5));
    let claims = DevTokenClaims {
        jti: uuid::Uuid::new_v4().to_string(),
        project_id: project_id.to_string(),
        exp: expires_at.timestamp(),
        mock: true,
    };

    // Claims serialisation cannot fail: all fields are plain strings/ints.
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_string(&claims).unwrap_or_default());
    let token = format!("{payload}.{}", tag(&payload, secret));

    SessionToken {
        token,
        expires_at: Some(expires_at),
        mock: true,
    }
}

/// Advisory check of a token string.
///
/// Returns `valid: true` only for an unexpired token minted by
/// [`mint_development_token`] with the same secret. Anything else —
/// upstream-issued opaque tokens included — comes back invalid with a
/// reason. Never panics and never returns an error.
pub fn verify(token: &str, secret: &str) -> Verification {
    let Some((payload, given_tag)) = token.split_once('.') else {
        return Verification::invalid("not a development token (no tag separator)");
    };
    if payload.is_empty() || given_tag.is_empty() {
        return Verification::invalid("not a development token (empty segment)");
    }
    if tag(payload, secret) != given_tag {
        return Verification::invalid("tag mismatch");
    }

    let claims: DevTokenClaims = match URL_SAFE_NO_PAD
        .decode(payload)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
    {
        Some(claims) => claims,
        None => return Verification::invalid("malformed claims"),
    };

    let expires_at = DateTime::from_timestamp(claims.exp, 0);
    match expires_at {
        Some(exp) if exp > Utc::now() => Verification::ok(),
        Some(_) => Verification::invalid("expired"),
        None => Verification::invalid("malformed expiry"),
    }
}

/// Keyed SHA-256 tag over the encoded claims, hex-encoded.
fn tag(payload: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hasher.update(b":");
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn minted_token_verifies_before_expiry() {
        let token = mint_development_token("proj-1", SECRET, Duration::from_secs(300));
        assert!(token.mock);
        assert!(token.expires_at.is_some());
        assert_eq!(verify(&token.token, SECRET), Verification::ok());
    }

    #[test]
    fn minted_token_is_invalid_after_expiry() {
        let token = mint_development_token("proj-1", SECRET, Duration::from_secs(0));
        let result = verify(&token.token, SECRET);
        assert!(!result.valid);
        assert_eq!(result.reason.as_deref(), Some("expired"));
    }

    #[test]
    fn wrong_secret_fails_the_tag_check() {
        let token = mint_development_token("proj-1", SECRET, Duration::from_secs(300));
        let result = verify(&token.token, "other-secret");
        assert!(!result.valid);
        assert_eq!(result.reason.as_deref(), Some("tag mismatch"));
    }

    #[test]
    fn tampered_payload_fails_the_tag_check() {
        let token = mint_development_token("proj-1", SECRET, Duration::from_secs(300));
        let (payload, tag) = token.token.split_once('.').unwrap();
        let tampered = format!("X{payload}.{tag}");
        assert!(!verify(&tampered, SECRET).valid);
    }

    #[test]
    fn opaque_upstream_tokens_are_invalid_by_design() {
        // Real upstream tokens are opaque strings with no local tag; the
        // verifier cannot vouch for them and must say so.
        let result = verify("ZXlKaGJHY2lPaUpGVXpJMU5pSjk", SECRET);
        assert!(!result.valid);
        assert!(result.reason.is_some());
    }

    #[test]
    fn empty_and_garbage_inputs_never_panic() {
        assert!(!verify("", SECRET).valid);
        assert!(!verify(".", SECRET).valid);
        assert!(!verify("a.b.c.d", SECRET).valid);
        assert!(!verify("only-one-part", SECRET).valid);
    }

    #[test]
    fn claims_embed_the_project_id() {
        let token = mint_development_token("proj-42", SECRET, Duration::from_secs(300));
        let payload = token.token.split_once('.').unwrap().0;
        let claims: DevTokenClaims =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap();
        assert_eq!(claims.project_id, "proj-42");
        assert!(claims.mock);
    }
}
