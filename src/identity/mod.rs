//! Identity provider boundary.
//!
//! Sessions are issued by the hosted identity provider; this crate only
//! verifies session tokens and reads user profiles. [`IdentityProvider`] is the
//! seam the session middleware and handlers depend on, [`clerk::ClerkIdentity`]
//! the production implementation.

pub mod clerk;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use utoipa::ToSchema;

pub type SharedIdentity = Arc<dyn IdentityProvider>;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid session token: {0}")]
    InvalidToken(String),

    #[error("session token expired")]
    Expired,

    #[error("unknown signing key: {0}")]
    UnknownKey(String),

    #[error("invalid publishable key: {0}")]
    PublishableKey(String),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("identity provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{url} - {status}, {message}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
        message: String,
    },
}

impl IdentityError {
    /// True when the token itself was at fault, as opposed to the provider.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidToken(_) | Self::Expired | Self::UnknownKey(_)
        )
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify a session token and return the session it represents.
    async fn verify_session(&self, token: &str) -> Result<Session, IdentityError>;

    /// Load the provider's user record.
    async fn fetch_user(&self, user_id: &str) -> Result<IdentityUser, IdentityError>;
}

/// Request-scoped identity attached by the session middleware.
#[derive(Clone)]
pub struct Session {
    user_id: String,
    session_id: Option<String>,
    token: SecretString,
}

impl Session {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        session_id: Option<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            session_id,
            token: SecretString::from(token.into()),
        }
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// The verified session token, for forwarding to downstream services.
    #[must_use]
    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("session_id", &self.session_id)
            .field("token", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailAddress {
    pub id: String,
    pub email_address: String,
}

/// Subset of the provider's user object.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityUser {
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub primary_email_address_id: Option<String>,
    #[serde(default)]
    pub email_addresses: Vec<EmailAddress>,
}

impl IdentityUser {
    #[must_use]
    pub fn primary_email(&self) -> Option<&str> {
        let primary = self.primary_email_address_id.as_deref()?;
        self.email_addresses
            .iter()
            .find(|address| address.id == primary)
            .map(|address| address.email_address.as_str())
    }

    /// First and last name joined with a space, `None` when both are absent.
    #[must_use]
    pub fn full_name(&self) -> Option<String> {
        let joined = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        );
        let trimmed = joined.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// Current-user view handed to UI clients.
#[derive(ToSchema, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProjection {
    pub id: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub image_url: Option<String>,
}

impl From<&IdentityUser> for UserProjection {
    fn from(user: &IdentityUser) -> Self {
        Self {
            id: user.id.clone(),
            email: user.primary_email().map(str::to_string),
            full_name: user.full_name(),
            image_url: user.image_url.clone(),
        }
    }
}
