// Clerk session verification: session tokens are RS256 JWTs verified offline
// against the instance JWKS, which is cached and refetched on unknown `kid`.
use super::{IdentityError, IdentityProvider, IdentityUser, Session};
use crate::config::ClerkSettings;
use async_trait::async_trait;
use base64ct::{Base64, Encoding};
use jsonwebtoken::{
    decode, decode_header,
    errors::ErrorKind,
    jwk::{Jwk, JwkSet},
    Algorithm, DecodingKey, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

const JWKS_CACHE_TTL_SECONDS: u64 = 300;
const JWKS_REFETCH_COOLDOWN_SECONDS: u64 = 30;
const CLOCK_LEEWAY_SECONDS: u64 = 5;

pub const SESSION_COOKIE: &str = "__session";

/// Decode the frontend API host embedded in a publishable key.
///
/// Keys look like `pk_test_<base64("<host>$")>` or `pk_live_...`.
///
/// # Errors
/// Returns an error if the prefix, encoding or terminator is wrong.
pub fn frontend_api_from_publishable_key(key: &str) -> Result<String, IdentityError> {
    let encoded = key
        .strip_prefix("pk_test_")
        .or_else(|| key.strip_prefix("pk_live_"))
        .ok_or_else(|| IdentityError::PublishableKey("expected pk_test_ or pk_live_ prefix".into()))?;

    let decoded = Base64::decode_vec(encoded)
        .map_err(|e| IdentityError::PublishableKey(format!("invalid base64: {e}")))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|e| IdentityError::PublishableKey(format!("invalid utf-8: {e}")))?;

    match decoded.strip_suffix('$') {
        Some(host) if !host.is_empty() => Ok(host.to_string()),
        _ => Err(IdentityError::PublishableKey(
            "missing frontend API host".into(),
        )),
    }
}

#[derive(Debug, Clone, Deserialize)]
struct SessionClaims {
    sub: String,
    #[serde(default)]
    sid: Option<String>,
}

#[derive(Debug, Clone)]
struct CachedJwks {
    keys: JwkSet,
    fetched_at: Instant,
}

impl CachedJwks {
    fn is_fresh(&self) -> bool {
        self.fetched_at.elapsed() < Duration::from_secs(JWKS_CACHE_TTL_SECONDS)
    }

    fn may_refetch(&self) -> bool {
        self.fetched_at.elapsed() >= Duration::from_secs(JWKS_REFETCH_COOLDOWN_SECONDS)
    }
}

pub struct ClerkIdentity {
    frontend_api: String,
    api_url: String,
    secret_key: Option<SecretString>,
    jwks_url: String,
    jwks_auth: Option<SecretString>,
    client: reqwest::Client,
    cache: Arc<RwLock<Option<CachedJwks>>>,
}

impl ClerkIdentity {
    /// Build the provider from settings. The JWKS comes from the backend API
    /// when a secret key is configured, otherwise from the frontend API.
    ///
    /// # Errors
    /// Returns an error if the publishable key cannot be decoded.
    pub fn new(settings: &ClerkSettings, client: reqwest::Client) -> Result<Self, IdentityError> {
        let frontend_api = frontend_api_from_publishable_key(&settings.publishable_key)?;
        let api_url = settings.api_url.trim_end_matches('/').to_string();

        let (jwks_url, jwks_auth) = match &settings.secret_key {
            Some(secret) => (format!("{api_url}/v1/jwks"), Some(secret.clone())),
            None => (format!("https://{frontend_api}/.well-known/jwks.json"), None),
        };

        Ok(Self {
            frontend_api,
            api_url,
            secret_key: settings.secret_key.clone(),
            jwks_url,
            jwks_auth,
            client,
            cache: Arc::new(RwLock::new(None)),
        })
    }

    /// Fetch keys from an explicit JWKS document instead (no credentials sent).
    #[must_use]
    pub fn with_jwks_url(mut self, url: impl Into<String>) -> Self {
        self.jwks_url = url.into();
        self.jwks_auth = None;
        self
    }

    #[must_use]
    pub fn frontend_api(&self) -> &str {
        &self.frontend_api
    }

    #[must_use]
    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    #[instrument(skip(self))]
    async fn fetch_jwks(&self) -> Result<JwkSet, IdentityError> {
        let mut request = self.client.get(&self.jwks_url);
        if let Some(secret) = &self.jwks_auth {
            request = request.bearer_auth(secret.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(IdentityError::Status {
                url: self.jwks_url.clone(),
                status,
                message: error_message(response).await,
            });
        }

        let keys: JwkSet = response.json().await?;
        debug!("fetched {} signing keys", keys.keys.len());
        Ok(keys)
    }

    async fn signing_key(&self, kid: &str) -> Result<Jwk, IdentityError> {
        if let Some(found) = cached_key(self.cache.read().await.as_ref(), kid) {
            return found;
        }

        // held across the fetch: concurrent misses wait for a single refresh
        let mut cache = self.cache.write().await;
        if let Some(found) = cached_key(cache.as_ref(), kid) {
            return found;
        }

        let keys = self.fetch_jwks().await?;
        let jwk = keys.find(kid).cloned();

        *cache = Some(CachedJwks {
            keys,
            fetched_at: Instant::now(),
        });

        jwk.ok_or_else(|| IdentityError::UnknownKey(kid.to_string()))
    }
}

/// `Some` when the cached keys settle the lookup without a fetch.
fn cached_key(cached: Option<&CachedJwks>, kid: &str) -> Option<Result<Jwk, IdentityError>> {
    let cached = cached?;
    match cached.keys.find(kid) {
        Some(jwk) if cached.is_fresh() => Some(Ok(jwk.clone())),
        None if !cached.may_refetch() => Some(Err(IdentityError::UnknownKey(kid.to_string()))),
        _ => None,
    }
}

#[async_trait]
impl IdentityProvider for ClerkIdentity {
    async fn verify_session(&self, token: &str) -> Result<Session, IdentityError> {
        let header =
            decode_header(token).map_err(|e| IdentityError::InvalidToken(e.to_string()))?;

        if header.alg != Algorithm::RS256 {
            return Err(IdentityError::InvalidToken(format!(
                "unsupported algorithm {:?}",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| IdentityError::InvalidToken("missing kid".to_string()))?;

        let jwk = self.signing_key(&kid).await?;
        let key =
            DecodingKey::from_jwk(&jwk).map_err(|e| IdentityError::InvalidToken(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = CLOCK_LEEWAY_SECONDS;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<SessionClaims>(token, &key, &validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => IdentityError::Expired,
            _ => IdentityError::InvalidToken(e.to_string()),
        })?;

        Ok(Session::new(data.claims.sub, data.claims.sid, token))
    }

    #[instrument(skip(self))]
    async fn fetch_user(&self, user_id: &str) -> Result<IdentityUser, IdentityError> {
        let secret = self
            .secret_key
            .as_ref()
            .ok_or(IdentityError::NotConfigured("CLERK_SECRET_KEY"))?;

        let url = format!("{}/v1/users/{user_id}", self.api_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(secret.expose_secret())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(IdentityError::Status {
                url,
                status,
                message: error_message(response).await,
            });
        }

        Ok(response.json().await?)
    }
}

// Clerk error bodies: {"errors":[{"message":"...","long_message":"..."}]}
async fn error_message(response: reqwest::Response) -> String {
    response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| body["errors"][0]["message"].as_str().map(str::to_string))
        .unwrap_or_default()
}
