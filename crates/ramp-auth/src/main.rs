//! Onramp session-token service — exchanges wallet parameters for CDP
//! session tokens.
//!
//! On each `POST /api/session` the service:
//!
//! 1. Validates the destination parameters (addresses or blockchains).
//! 2. Loads and checks the CDP credentials.
//! 3. Signs a 120-second assertion bound to the upstream request.
//! 4. POSTs the assertion to the CDP token endpoint.
//!
//! When credentials are missing, signing fails, or the upstream is
//! unreachable, the service degrades to a locally minted development
//! token (`mock: true`) instead of failing the request — demo
//! availability is preferred over strict issuance. Explicit upstream
//! verdicts (401/403/400) are surfaced as-is.

mod config;
mod error;
mod jwt;
mod rate_limit;
mod upstream;
mod verify;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::{ConnectInfo, Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use ramp_models::{SessionToken, SessionTokenRequest, SessionTokenResponse};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::{AppConfig, CredentialStore};
use crate::error::AuthError;
use crate::rate_limit::SlidingWindowLimiter;
use crate::upstream::TokenRequester;
use crate::verify::Verification;

// ---------------------------------------------------------------------------
// Shared application state
// ---------------------------------------------------------------------------

/// State shared across all Axum handlers.
struct AppState {
    /// Global configuration.
    config: AppConfig,
    /// Credential source (variables + key file).
    store: CredentialStore,
    /// Upstream HTTP client.
    requester: TokenRequester,
    /// Per-IP sliding-window limiter.
    limiter: SlidingWindowLimiter,
}

/// Build the service router.
fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/session", post(create_session))
        .route("/api/session/verify", post(verify_session_token))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `POST /api/session` — issue a session token (real or fallback).
async fn create_session(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Json(request): Json<SessionTokenRequest>,
) -> Response {
    let started = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string();

    if !state.limiter.check(&peer.ip().to_string()) {
        warn!(request_id = %request_id, peer = %peer, "rate limit exceeded");
        return error_response(&AuthError::RateLimited, &request_id);
    }

    if let Err(e) = request.validate() {
        let err = AuthError::InvalidRequest(e);
        info!(request_id = %request_id, error = %err, "rejected session request");
        return error_response(&err, &request_id);
    }

    match issue(&state, &request, &request_id).await {
        Ok(token) => {
            info!(request_id = %request_id, mock = token.mock, "session token issued");
            token_response(token, &started, request_id)
        }
        Err(e) if e.is_recoverable() => {
            warn!(
                request_id = %request_id,
                error = %e,
                "production issuance failed; falling back to development token"
            );
            let token = fallback_token(&state);
            token_response(token, &started, request_id)
        }
        Err(e) => {
            warn!(request_id = %request_id, error = %e, "session token request refused");
            error_response(&e, &request_id)
        }
    }
}

/// Body of `POST /api/session/verify`.
#[derive(Deserialize)]
struct VerifyRequest {
    /// The token string to check.
    token: String,
}

/// `POST /api/session/verify` — advisory verification.
///
/// Only development tokens minted by this service can verify as valid;
/// genuine upstream tokens are opaque here and always come back invalid.
async fn verify_session_token(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VerifyRequest>,
) -> Json<Verification> {
    Json(verify::verify(&req.token, &state.config.dev_token_secret))
}

// ---------------------------------------------------------------------------
// Issuance chain
// ---------------------------------------------------------------------------

/// Run the credential → sign → request chain for one session request.
async fn issue(
    state: &AppState,
    request: &SessionTokenRequest,
    request_id: &str,
) -> Result<SessionToken, AuthError> {
    debug!(request_id = %request_id, "loading credentials");
    let credentials = state.store.load()?;

    let report = CredentialStore::validate(&credentials);
    if !report.valid {
        return Err(AuthError::Config(report.errors.join("; ")));
    }

    debug!(request_id = %request_id, key = %credentials.api_key_name, "signing assertion");
    let assertion = jwt::sign(
        &credentials,
        "POST",
        state.config.upstream_host(),
        upstream::TOKEN_PATH,
    )?;

    debug!(request_id = %request_id, "requesting session token upstream");
    state.requester.request_session_token(&assertion, request).await
}

/// Mint the development fallback token.
fn fallback_token(state: &AppState) -> SessionToken {
    let project_id = state
        .store
        .load()
        .map(|c| c.project_id)
        .unwrap_or_else(|_| "development".to_string());
    verify::mint_development_token(
        &project_id,
        &state.config.dev_token_secret,
        state.config.dev_token_ttl,
    )
}

fn token_response(token: SessionToken, started: &Instant, request_id: String) -> Response {
    let body = SessionTokenResponse {
        token: token.token,
        expires_at: token.expires_at,
        mock: token.mock,
        response_time: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        request_id,
    };
    (StatusCode::OK, Json(body)).into_response()
}

fn error_response(err: &AuthError, request_id: &str) -> Response {
    (err.status(), Json(err.to_response_body(request_id))).into_response()
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Structured logging (controlled via RUST_LOG env var).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();
    let store = CredentialStore::from_env();

    match store.load() {
        Ok(credentials) => {
            let report = CredentialStore::validate(&credentials);
            if report.valid {
                info!(key = %credentials.api_key_name, "CDP credentials loaded");
            } else {
                warn!(
                    errors = ?report.errors,
                    "CDP credentials present but invalid; requests will fall back to development tokens"
                );
            }
        }
        Err(e) => {
            warn!(error = %e, "no CDP credentials; requests will fall back to development tokens");
        }
    }

    let requester = TokenRequester::new(&config.upstream_base_url, config.upstream_timeout)?;
    let limiter = SlidingWindowLimiter::new(config.rate_limit_max, config.rate_limit_window);
    let listen_port = config.listen_port;
    let upstream_base_url = config.upstream_base_url.clone();

    let state = Arc::new(AppState {
        config,
        store,
        requester,
        limiter,
    });

    let addr = format!("0.0.0.0:{listen_port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(address = %addr, upstream = %upstream_base_url, "session-token service listening");
    axum::serve(
        listener,
        app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
