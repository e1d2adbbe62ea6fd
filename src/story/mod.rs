//! Personalization engine contract.
//!
//! Story generation lives outside this service. [`StoryEngine`] is the seam;
//! [`RemoteStoryEngine`] forwards inputs to the engine endpoint and
//! [`UnconfiguredStoryEngine`] fails every call when no endpoint is set.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use utoipa::ToSchema;

/// Opaque engine output.
pub type Story = Value;

pub type SharedStoryEngine = Arc<dyn StoryEngine>;

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoryInput {
    pub child_name: String,
    pub gender: String,
    pub theme: String,
    #[serde(default)]
    pub interests: Vec<String>,
}

impl StoryInput {
    /// Input used when a caller does not supply one.
    #[must_use]
    pub fn sample() -> Self {
        Self {
            child_name: "Alice".to_string(),
            gender: "girl".to_string(),
            theme: "adventure".to_string(),
            interests: vec!["magic".to_string(), "animals".to_string()],
        }
    }
}

#[async_trait]
pub trait StoryEngine: Send + Sync {
    async fn generate_personalized_story(&self, input: &StoryInput) -> Result<Story>;
}

pub struct RemoteStoryEngine {
    url: String,
    client: reqwest::Client,
}

impl RemoteStoryEngine {
    #[must_use]
    pub fn new(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }
}

#[async_trait]
impl StoryEngine for RemoteStoryEngine {
    #[instrument(skip(self, input), fields(child = %input.child_name, theme = %input.theme))]
    async fn generate_personalized_story(&self, input: &StoryInput) -> Result<Story> {
        let response = self.client.post(&self.url).json(input).send().await?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or_default();

        if !status.is_success() {
            let message = body["error"].as_str().unwrap_or_default();
            return Err(anyhow!("{} - {}, {}", self.url, status, message));
        }

        debug!("story generated");

        match body.get("story") {
            Some(story) if !story.is_null() => Ok(story.clone()),
            _ => Err(anyhow!("{} - {}, no story in response", self.url, status)),
        }
    }
}

pub struct UnconfiguredStoryEngine;

#[async_trait]
impl StoryEngine for UnconfiguredStoryEngine {
    async fn generate_personalized_story(&self, _input: &StoryInput) -> Result<Story> {
        Err(anyhow!("STORY_ENGINE_URL is not configured"))
    }
}

#[must_use]
pub fn from_config(url: Option<&str>, client: reqwest::Client) -> SharedStoryEngine {
    match url {
        Some(url) => Arc::new(RemoteStoryEngine::new(url, client)),
        None => {
            warn!("STORY_ENGINE_URL is not set, story generation is disabled");
            Arc::new(UnconfiguredStoryEngine)
        }
    }
}
