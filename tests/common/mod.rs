#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, Response},
    Router,
};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use taleweaver::{
    api::Services,
    cache::{MemoryCache, SharedCache},
    config::AppConfig,
    firestore::DocumentStore,
    identity::{IdentityError, IdentityProvider, IdentityUser, Session},
    story::{Story, StoryEngine, StoryInput},
};
use tokio::net::TcpListener;
use tower::ServiceExt;

pub const TEST_KID: &str = "ins_test_key";
pub const TEST_RSA_PEM: &str = include_str!("../fixtures/test_rsa.pem");
pub const TEST_JWKS: &str = include_str!("../fixtures/jwks.json");
pub const PUBLISHABLE_KEY: &str = "pk_test_Y2xlcmsuZXhhbXBsZS5jb20k";

/// Accepts `valid-token` as `user_ada`, knows only that user.
pub struct FixedIdentity;

#[async_trait]
impl IdentityProvider for FixedIdentity {
    async fn verify_session(&self, token: &str) -> Result<Session, IdentityError> {
        if token == "valid-token" {
            Ok(Session::new("user_ada", Some("sess_1".to_string()), token))
        } else {
            Err(IdentityError::InvalidToken("signature mismatch".to_string()))
        }
    }

    async fn fetch_user(&self, user_id: &str) -> Result<IdentityUser, IdentityError> {
        if user_id != "user_ada" {
            return Err(IdentityError::NotConfigured("CLERK_SECRET_KEY"));
        }
        serde_json::from_value(json!({
            "id": "user_ada",
            "first_name": "Ada",
            "last_name": "Lovelace",
            "image_url": "https://img.clerk.com/ada.png",
            "primary_email_address_id": "idn_1",
            "email_addresses": [{"id": "idn_1", "email_address": "ada@example.com"}]
        }))
        .map_err(|e| IdentityError::InvalidToken(e.to_string()))
    }
}

/// Echoes the input back as the story, or fails when asked to.
pub struct EchoEngine {
    pub fail: bool,
}

#[async_trait]
impl StoryEngine for EchoEngine {
    async fn generate_personalized_story(&self, input: &StoryInput) -> Result<Story> {
        if self.fail {
            anyhow::bail!("engine unavailable");
        }
        Ok(json!({ "hero": input.child_name, "theme": input.theme }))
    }
}

pub fn services(config: AppConfig, identity: Arc<dyn IdentityProvider>, fail_engine: bool) -> Services {
    let cache: SharedCache = Arc::new(MemoryCache::new());
    Services {
        config: Arc::new(config),
        identity,
        cache,
        documents: Arc::new(DocumentStore::new()),
        stories: Arc::new(EchoEngine { fail: fail_engine }),
    }
}

pub fn default_app() -> Router {
    taleweaver::api::app(services(
        AppConfig::new(PUBLISHABLE_KEY),
        Arc::new(FixedIdentity),
        false,
    ))
}

pub async fn send(app: Router, request: Request<Body>) -> Result<(Response<Body>, Vec<u8>)> {
    let response = app.oneshot(request).await?;
    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX).await?;
    Ok((Response::from_parts(parts, Body::empty()), bytes.to_vec()))
}

pub fn json_body(bytes: &[u8]) -> Result<Value> {
    Ok(serde_json::from_slice(bytes)?)
}

pub async fn serve(router: Router) -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://{addr}"))
}

pub fn session_token(sub: &str, ttl: i64) -> Result<String> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX));
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(TEST_KID.to_string());
    let claims = json!({
        "sub": sub,
        "sid": "sess_it",
        "iat": now,
        "nbf": now - 10,
        "exp": now + ttl,
    });
    let key = EncodingKey::from_rsa_pem(TEST_RSA_PEM.as_bytes())?;
    Ok(encode(&header, &claims, &key)?)
}
