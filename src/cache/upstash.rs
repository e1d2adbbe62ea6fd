use super::Cache;
use crate::config::UpstashSettings;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tracing::{debug, error, instrument};

/// Upstash Redis over its REST API: every command is a JSON array posted to
/// the database URL.
pub struct UpstashCache {
    url: String,
    token: SecretString,
    client: reqwest::Client,
}

impl UpstashCache {
    #[must_use]
    pub fn new(settings: &UpstashSettings, client: reqwest::Client) -> Self {
        Self {
            url: settings.url.trim_end_matches('/').to_string(),
            token: settings.token.clone(),
            client,
        }
    }

    #[instrument(skip(self, command), fields(command = %command[0]))]
    async fn command(&self, command: Value) -> Result<Value> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(self.token.expose_secret())
            .json(&command)
            .send()
            .await?;

        let status = response.status();
        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(e) if status.is_success() => {
                error!("Upstash returned an unreadable reply: {}", e);
                return Err(anyhow!("{} - {}, invalid response: {}", self.url, status, e));
            }
            Err(_) => Value::Null,
        };

        if let Some(message) = body["error"].as_str() {
            error!("Upstash command failed: {}", message);
            return Err(anyhow!("{} - {}, {}", self.url, status, message));
        }

        if !status.is_success() {
            return Err(anyhow!("{} - {}, unexpected response", self.url, status));
        }

        debug!("Upstash command ok");
        Ok(body["result"].clone())
    }
}

/// Stored values are JSON documents; anything else written by other clients
/// comes back as a plain string.
fn decode_value(raw: Value) -> Option<Value> {
    match raw {
        Value::Null => None,
        Value::String(text) => Some(serde_json::from_str(&text).unwrap_or(Value::String(text))),
        other => Some(other),
    }
}

#[async_trait]
impl Cache for UpstashCache {
    fn backend(&self) -> &'static str {
        "upstash"
    }

    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let raw = self.command(json!(["GET", key])).await?;
        Ok(decode_value(raw))
    }

    async fn set(&self, key: &str, value: &Value) -> Result<()> {
        let encoded = serde_json::to_string(value)?;
        self.command(json!(["SET", key, encoded])).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.command(json!(["DEL", key])).await?;
        Ok(())
    }
}
