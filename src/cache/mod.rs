//! Key-value cache.
//!
//! Values are arbitrary JSON. There is no TTL and no eviction; callers own
//! their keys. [`upstash::UpstashCache`] talks to Upstash Redis over REST,
//! [`MemoryCache`] stands in when Upstash is not configured.

pub mod upstash;

use crate::config::AppConfig;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

pub type SharedCache = Arc<dyn Cache>;

#[async_trait]
pub trait Cache: Send + Sync {
    /// Short backend name, reported by `/health`.
    fn backend(&self) -> &'static str;

    async fn get(&self, key: &str) -> Result<Option<Value>>;

    async fn set(&self, key: &str, value: &Value) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &Value) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// Upstash when both URL and token are set, otherwise the in-process cache.
#[must_use]
pub fn from_config(config: &AppConfig, client: reqwest::Client) -> SharedCache {
    match config.upstash() {
        Some(settings) => Arc::new(upstash::UpstashCache::new(&settings, client)),
        None => {
            warn!("Upstash is not configured, falling back to in-memory cache");
            Arc::new(MemoryCache::new())
        }
    }
}
