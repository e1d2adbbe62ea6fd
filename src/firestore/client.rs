use super::credentials::{ServiceAccount, DATASTORE_SCOPE};
use super::value::{from_fields, to_fields};
use super::DocumentStoreError;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

const ASSERTION_LIFETIME_SECONDS: u64 = 3600;
const TOKEN_REFRESH_MARGIN_SECONDS: u64 = 60;

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

const fn default_expires_in() -> u64 {
    ASSERTION_LIFETIME_SECONDS
}

struct AccessToken {
    token: SecretString,
    refresh_at: Instant,
}

/// Firestore REST admin client authenticated as a service account.
pub struct FirestoreClient {
    account: ServiceAccount,
    key: EncodingKey,
    documents_url: String,
    token_url: String,
    client: reqwest::Client,
    token: RwLock<Option<AccessToken>>,
}

impl FirestoreClient {
    /// # Errors
    /// Returns an error if the private key is not a valid RSA PEM key.
    pub fn new(
        account: ServiceAccount,
        firestore_url: &str,
        token_url: &str,
        client: reqwest::Client,
    ) -> Result<Self, DocumentStoreError> {
        let key = EncodingKey::from_rsa_pem(account.private_key.expose_secret().as_bytes())
            .map_err(|e| DocumentStoreError::Credentials(e.to_string()))?;

        let documents_url = format!(
            "{}/projects/{}/databases/(default)/documents",
            firestore_url.trim_end_matches('/'),
            account.project_id
        );

        Ok(Self {
            account,
            key,
            documents_url,
            token_url: token_url.to_string(),
            client,
            token: RwLock::new(None),
        })
    }

    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.account.project_id
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{collection}/{id}", self.documents_url)
    }

    fn assertion(&self) -> Result<String, DocumentStoreError> {
        let iat = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        let claims = AssertionClaims {
            iss: &self.account.client_email,
            scope: DATASTORE_SCOPE,
            aud: &self.token_url,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECONDS,
        };
        encode(&Header::new(Algorithm::RS256), &claims, &self.key)
            .map_err(|e| DocumentStoreError::Credentials(e.to_string()))
    }

    async fn access_token(&self) -> Result<SecretString, DocumentStoreError> {
        {
            let cached = self.token.read().await;
            if let Some(token) = cached.as_ref() {
                if Instant::now() < token.refresh_at {
                    return Ok(token.token.clone());
                }
            }
        }

        let assertion = self.assertion()?;
        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or_default();
            return Err(DocumentStoreError::Status {
                url: self.token_url.clone(),
                status,
                message: body["error_description"]
                    .as_str()
                    .or_else(|| body["error"].as_str())
                    .unwrap_or_default()
                    .to_string(),
            });
        }

        let minted: TokenResponse = response.json().await?;
        debug!("minted access token valid for {}s", minted.expires_in);

        let token = SecretString::from(minted.access_token);
        *self.token.write().await = Some(AccessToken {
            token: token.clone(),
            refresh_at: Instant::now()
                + Duration::from_secs(
                    minted
                        .expires_in
                        .saturating_sub(TOKEN_REFRESH_MARGIN_SECONDS),
                ),
        });
        Ok(token)
    }

    async fn check(
        &self,
        url: &str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, DocumentStoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body: Value = response.json().await.unwrap_or_default();
        Err(DocumentStoreError::Status {
            url: url.to_string(),
            status,
            message: body["error"]["message"]
                .as_str()
                .unwrap_or_default()
                .to_string(),
        })
    }

    #[instrument(skip(self))]
    pub async fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Map<String, Value>>, DocumentStoreError> {
        let url = self.document_url(collection, id);
        let token = self.access_token().await?;
        let response = self
            .client
            .get(&url)
            .bearer_auth(token.expose_secret())
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let document: Value = self.check(&url, response).await?.json().await?;
        Ok(Some(from_fields(&document["fields"])))
    }

    /// Create or replace the document.
    #[instrument(skip(self, data))]
    pub async fn set(
        &self,
        collection: &str,
        id: &str,
        data: &Map<String, Value>,
    ) -> Result<(), DocumentStoreError> {
        let url = self.document_url(collection, id);
        let token = self.access_token().await?;
        let response = self
            .client
            .patch(&url)
            .bearer_auth(token.expose_secret())
            .json(&json!({ "fields": to_fields(data) }))
            .send()
            .await?;

        self.check(&url, response).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, collection: &str, id: &str) -> Result<(), DocumentStoreError> {
        let url = self.document_url(collection, id);
        let token = self.access_token().await?;
        let response = self
            .client
            .delete(&url)
            .bearer_auth(token.expose_secret())
            .send()
            .await?;

        self.check(&url, response).await?;
        Ok(())
    }
}
