//! One-shot checks against the configured external services.

use super::server::http_client;
use crate::{
    api::handlers::test_redis,
    cache::upstash::UpstashCache,
    config::UpstashSettings,
    story::{self, StoryInput},
};
use anyhow::{anyhow, Result};
use secrecy::SecretString;
use tracing::info;

#[derive(Debug)]
pub struct CacheArgs {
    pub url: Option<String>,
    pub token: Option<SecretString>,
}

#[derive(Debug)]
pub struct StoryArgs {
    pub engine_url: Option<String>,
}

/// Round-trip the test key through Upstash and print the value read back.
/// # Errors
/// Returns an error if Upstash is not configured or any command fails.
pub async fn check_cache(args: CacheArgs) -> Result<()> {
    let url = args
        .url
        .ok_or_else(|| anyhow!("Missing UPSTASH_REDIS_REST_URL"))?;
    let token = args
        .token
        .ok_or_else(|| anyhow!("Missing UPSTASH_REDIS_REST_TOKEN"))?;

    info!("Testing Redis connection at {}", url);

    let cache = UpstashCache::new(&UpstashSettings { url, token }, http_client()?);
    let value = test_redis::round_trip(&cache).await?;

    println!("Redis test successful: {value}");
    Ok(())
}

/// Generate a story for the sample input and print it.
/// # Errors
/// Returns an error if the engine is not configured or generation fails.
pub async fn check_story(args: StoryArgs) -> Result<()> {
    let engine = story::from_config(args.engine_url.as_deref(), http_client()?);
    let input = StoryInput::sample();

    info!("Generating story for {}", input.child_name);

    let story = engine.generate_personalized_story(&input).await?;

    println!("{}", serde_json::to_string_pretty(&story)?);
    Ok(())
}
