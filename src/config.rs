//! Process-wide configuration.
//!
//! Every environment variable the service understands is bound to a CLI
//! argument in [`crate::cli::commands`]; [`crate::cli::dispatch`] validates the
//! parsed arguments once and produces an [`AppConfig`]. Nothing else in the
//! crate reads the process environment.

use secrecy::SecretString;

pub const PRODUCTION: &str = "production";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CLERK_API_URL: &str = "https://api.clerk.com";
pub const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";
pub const DEFAULT_GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_TRACES_SAMPLE_RATE: f32 = 1.0;

#[derive(Clone)]
pub struct ClerkSettings {
    pub publishable_key: String,
    pub secret_key: Option<SecretString>,
    pub api_url: String,
}

#[derive(Clone)]
pub struct UpstashSettings {
    pub url: String,
    pub token: SecretString,
}

#[derive(Clone)]
pub struct FirebaseSettings {
    pub project_id: Option<String>,
    pub client_email: Option<String>,
    pub private_key: Option<SecretString>,
    pub firestore_url: String,
    pub token_url: String,
}

impl Default for FirebaseSettings {
    fn default() -> Self {
        Self {
            project_id: None,
            client_email: None,
            private_key: None,
            firestore_url: DEFAULT_FIRESTORE_URL.to_string(),
            token_url: DEFAULT_GOOGLE_TOKEN_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SentrySettings {
    pub dsn: Option<String>,
    pub traces_sample_rate: f32,
}

impl Default for SentrySettings {
    fn default() -> Self {
        Self {
            dsn: None,
            traces_sample_rate: DEFAULT_TRACES_SAMPLE_RATE,
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub port: u16,
    pub node_env: Option<String>,
    pub clerk: ClerkSettings,
    pub upstash_url: Option<String>,
    pub upstash_token: Option<SecretString>,
    pub firebase: FirebaseSettings,
    pub sentry: SentrySettings,
    pub openai_api_key: Option<SecretString>,
    pub nextauth_secret: Option<SecretString>,
    pub nextauth_url: Option<String>,
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<SecretString>,
    pub story_engine_url: Option<String>,
}

impl AppConfig {
    /// Configuration with only the mandatory publishable key set.
    #[must_use]
    pub fn new(clerk_publishable_key: impl Into<String>) -> Self {
        Self {
            port: DEFAULT_PORT,
            node_env: None,
            clerk: ClerkSettings {
                publishable_key: clerk_publishable_key.into(),
                secret_key: None,
                api_url: DEFAULT_CLERK_API_URL.to_string(),
            },
            upstash_url: None,
            upstash_token: None,
            firebase: FirebaseSettings::default(),
            sentry: SentrySettings::default(),
            openai_api_key: None,
            nextauth_secret: None,
            nextauth_url: None,
            google_client_id: None,
            google_client_secret: None,
            story_engine_url: None,
        }
    }

    #[must_use]
    pub fn is_production(&self) -> bool {
        self.node_env.as_deref() == Some(PRODUCTION)
    }

    /// Upstash settings, only when both the REST URL and token are present.
    #[must_use]
    pub fn upstash(&self) -> Option<UpstashSettings> {
        match (&self.upstash_url, &self.upstash_token) {
            (Some(url), Some(token)) => Some(UpstashSettings {
                url: url.clone(),
                token: token.clone(),
            }),
            _ => None,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |set: bool| if set { "***" } else { "none" };
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("node_env", &self.node_env)
            .field("clerk_publishable_key", &self.clerk.publishable_key)
            .field("clerk_secret_key", &redact(self.clerk.secret_key.is_some()))
            .field("clerk_api_url", &self.clerk.api_url)
            .field("upstash_url", &self.upstash_url)
            .field("upstash_token", &redact(self.upstash_token.is_some()))
            .field("firebase_project_id", &self.firebase.project_id)
            .field("firebase_client_email", &self.firebase.client_email)
            .field(
                "firebase_private_key",
                &redact(self.firebase.private_key.is_some()),
            )
            .field("sentry", &self.sentry)
            .field("openai_api_key", &redact(self.openai_api_key.is_some()))
            .field("nextauth_secret", &redact(self.nextauth_secret.is_some()))
            .field("nextauth_url", &self.nextauth_url)
            .field("google_client_id", &self.google_client_id)
            .field(
                "google_client_secret",
                &redact(self.google_client_secret.is_some()),
            )
            .field("story_engine_url", &self.story_engine_url)
            .finish()
    }
}
