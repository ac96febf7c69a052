//! Stand-in for the CDP onramp token endpoint.
//!
//! Lets the session service run end-to-end without real CDP credentials:
//! point `CDP_API_URL` at this process and every well-formed request gets
//! a fabricated token. Magic wallet addresses force specific error
//! statuses so the error taxonomy can be exercised:
//!
//! | Address     | Response |
//! |-------------|----------|
//! | `force-401` | 401      |
//! | `force-403` | 403      |
//! | `force-400` | 400      |
//! | `force-500` | 500      |

use axum::extract::Json;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Deserialize)]
struct TokenRequest {
    #[serde(default)]
    addresses: Vec<Address>,
}

#[derive(Deserialize)]
struct Address {
    address: String,
}

#[tokio::main]
async fn main() {
    let app = router();

    let port = std::env::var("MOCK_CDP_PORT").unwrap_or_else(|_| "4000".to_string());
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    println!("MOCK-CDP: Listening on http://localhost:{port}");
    axum::serve(listener, app).await.unwrap();
}

fn router() -> Router {
    Router::new().route("/onramp/v1/token", post(token))
}

// --- Endpoints ---

async fn token(
    headers: HeaderMap,
    Json(req): Json<TokenRequest>,
) -> (StatusCode, Json<Value>) {
    // A real assertion is a three-part compact JWT; anything else is
    // rejected the way CDP would reject a bad bearer credential.
    let assertion = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default();
    if assertion.split('.').count() != 3 {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "missing or malformed bearer assertion"})),
        );
    }

    // Magic addresses force error paths for integration tests.
    for address in &req.addresses {
        let status = match address.address.as_str() {
            "force-401" => Some(StatusCode::UNAUTHORIZED),
            "force-403" => Some(StatusCode::FORBIDDEN),
            "force-400" => Some(StatusCode::BAD_REQUEST),
            "force-500" => Some(StatusCode::INTERNAL_SERVER_ERROR),
            _ => None,
        };
        if let Some(status) = status {
            println!("MOCK-CDP: forcing {status} for address {}", address.address);
            return (status, Json(json!({"message": "forced by magic address"})));
        }
    }

    if req.addresses.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "addresses must not be empty"})),
        );
    }

    let expires_at = Utc::now() + Duration::minutes(5);
    (
        StatusCode::OK,
        Json(json!({
            "token": format!("mock_cdp_{}", uuid::Uuid::new_v4()),
            "expiresAt": expires_at.to_rfc3339(),
        })),
    )
}

// --- Tests ---

#[cfg(test)]
mod tests {
    use axum_test::TestServer;

    use super::*;

    const ASSERTION: &str = "aGVhZGVy.Y2xhaW1z.c2ln";

    fn server() -> TestServer {
        TestServer::new(router()).unwrap()
    }

    #[tokio::test]
    async fn issues_a_token_for_a_well_formed_request() {
        let res = server()
            .post("/onramp/v1/token")
            .authorization_bearer(ASSERTION)
            .json(&json!({"addresses": [{"address": "0xABC", "blockchains": ["base"]}]}))
            .await;
        res.assert_status_ok();
        let body: Value = res.json();
        assert!(body["token"].as_str().unwrap().starts_with("mock_cdp_"));
        assert!(body["expiresAt"].is_string());
    }

    #[tokio::test]
    async fn rejects_a_missing_assertion() {
        let res = server()
            .post("/onramp/v1/token")
            .json(&json!({"addresses": [{"address": "0xABC"}]}))
            .await;
        res.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn rejects_a_malformed_assertion() {
        let res = server()
            .post("/onramp/v1/token")
            .authorization_bearer("not-a-jwt")
            .json(&json!({"addresses": [{"address": "0xABC"}]}))
            .await;
        res.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn magic_addresses_force_statuses() {
        for (address, status) in [
            ("force-401", StatusCode::UNAUTHORIZED),
            ("force-403", StatusCode::FORBIDDEN),
            ("force-400", StatusCode::BAD_REQUEST),
            ("force-500", StatusCode::INTERNAL_SERVER_ERROR),
        ] {
            let res = server()
                .post("/onramp/v1/token")
                .authorization_bearer(ASSERTION)
                .json(&json!({"addresses": [{"address": address}]}))
                .await;
            res.assert_status(status);
        }
    }

    #[tokio::test]
    async fn empty_addresses_are_a_bad_request() {
        let res = server()
            .post("/onramp/v1/token")
            .authorization_bearer(ASSERTION)
            .json(&json!({"addresses": []}))
            .await;
        res.assert_status(StatusCode::BAD_REQUEST);
    }
}
