//! Helpers shared by unit tests: in-process stand-ins for external services
//! and session tokens signed with the fixture key.

use anyhow::Result;
use axum::Router;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::net::TcpListener;

pub const TEST_KID: &str = "ins_test_key";
pub const TEST_RSA_PEM: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/test_rsa.pem"
));
pub const TEST_JWKS: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/jwks.json"
));

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve(router: Router) -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://{addr}"))
}

pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}

/// RS256 session token for `sub`, expiring `ttl` seconds from now (negative
/// values produce an expired token).
pub fn session_token(kid: &str, sub: &str, ttl: i64) -> Result<String> {
    let now = unix_now();
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    let claims = json!({
        "sub": sub,
        "sid": "sess_test",
        "iat": now,
        "nbf": now - 10,
        "exp": now + ttl,
        "azp": "http://localhost:3000",
    });
    let key = EncodingKey::from_rsa_pem(TEST_RSA_PEM.as_bytes())?;
    Ok(encode(&header, &claims, &key)?)
}
