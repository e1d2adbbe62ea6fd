use crate::{
    api::{self, Services},
    cache,
    config::AppConfig,
    firestore::DocumentStore,
    identity::clerk::ClerkIdentity,
    story, APP_USER_AGENT,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// Shared outbound HTTP client.
///
/// # Errors
/// Returns an error if the TLS backend cannot be initialized.
pub fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(APP_USER_AGENT)
        .build()
        .context("Failed to build HTTP client")
}

/// Execute the server action.
/// # Errors
/// Returns an error if the publishable key is invalid or the server fails to start.
pub async fn execute(config: AppConfig) -> Result<()> {
    let http = http_client()?;

    let identity = ClerkIdentity::new(&config.clerk, http.clone())
        .context("Invalid NEXT_PUBLIC_CLERK_PUBLISHABLE_KEY")?;

    let cache = cache::from_config(&config, http.clone());

    let documents = Arc::new(DocumentStore::new());
    documents.initialize(&config.firebase, http.clone());

    let stories = story::from_config(config.story_engine_url.as_deref(), http);

    log_startup(&config, identity.frontend_api(), cache.backend(), &documents);
    debug!("Config: {:?}", config);

    let port = config.port;
    let services = Services {
        config: Arc::new(config),
        identity: Arc::new(identity),
        cache,
        documents,
        stories,
    };

    api::new(port, services).await
}

fn log_startup(config: &AppConfig, frontend_api: &str, cache: &str, documents: &DocumentStore) {
    let set = |present: bool| present.to_string();
    let or_none = |value: &Option<String>| value.clone().unwrap_or_else(|| "none".to_string());

    let entries = [
        ("listen", format!("tcp:{}", config.port)),
        ("node_env", or_none(&config.node_env)),
        ("clerk_frontend_api", frontend_api.to_string()),
        ("clerk_api_url", config.clerk.api_url.clone()),
        ("clerk_secret_key_set", set(config.clerk.secret_key.is_some())),
        ("cache", cache.to_string()),
        ("upstash_url", or_none(&config.upstash_url)),
        ("firebase_project_id", or_none(&config.firebase.project_id)),
        ("document_store_ready", set(documents.is_initialized())),
        ("sentry_enabled", set(config.sentry.dsn.is_some())),
        ("openai_api_key_set", set(config.openai_api_key.is_some())),
        ("nextauth_secret_set", set(config.nextauth_secret.is_some())),
        ("nextauth_url", or_none(&config.nextauth_url)),
        ("google_client_id", or_none(&config.google_client_id)),
        (
            "google_client_secret_set",
            set(config.google_client_secret.is_some()),
        ),
        ("story_engine_url", or_none(&config.story_engine_url)),
    ];
    log_entries("Startup configuration", &entries, config.is_production());
}

fn log_entries(title: &str, entries: &[(&str, String)], production: bool) {
    let mode = if production {
        "production"
    } else {
        "development"
    };
    info!("{}", startup_message(title, entries, mode));
}

fn startup_message(title: &str, entries: &[(&str, String)], mode: &str) -> String {
    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let lines: String = entries
        .iter()
        .map(|(key, value)| {
            let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
            format!("\n  {key}:{padding} {value}")
        })
        .collect();
    format!("{}\n\nMode: {mode}\n\n{title}:{lines}", banner())
}

fn banner() -> String {
    let short_hash = short_commit(crate::GIT_COMMIT_HASH);
    BANNER.replace(
        "{VERSION}",
        &format!(" - {} - {}", env!("CARGO_PKG_VERSION"), short_hash),
    )
}

fn short_commit(hash: &str) -> String {
    let trimmed = hash.trim();
    if trimmed.len() > 7 {
        trimmed[..7].to_string()
    } else {
        trimmed.to_string()
    }
}

const BANNER: &str = r"
    _______
   /      /,
  /      //    T A L E W E A V E R {VERSION}
 /______//
(______(/";
