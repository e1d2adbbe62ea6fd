use crate::config::AppConfig;
use axum::{extract::Extension, response::IntoResponse, Json};
use secrecy::ExposeSecret;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

pub const NOT_SET: &str = "not-set";

#[derive(ToSchema, Serialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct KeyReport {
    key_exists: bool,
    key_format: String,
}

/// First seven and last three characters, e.g. `sk-proj...xyz`.
#[must_use]
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let head: String = chars.iter().take(7).collect();
    let tail: String = chars[chars.len().saturating_sub(3)..].iter().collect();
    format!("{head}...{tail}")
}

impl From<&AppConfig> for KeyReport {
    fn from(config: &AppConfig) -> Self {
        let key = config.openai_api_key.as_ref().map(|k| k.expose_secret());
        Self {
            key_exists: key.is_some(),
            key_format: key.map_or_else(|| NOT_SET.to_string(), mask_key),
        }
    }
}

#[utoipa::path(
    get,
    path= "/api/test-env",
    responses (
        (status = 200, description = "Whether the OpenAI API key is set, with a masked fragment", body = KeyReport),
    ),
    tag= "diagnostics"
)]
pub async fn test_env(config: Extension<Arc<AppConfig>>) -> impl IntoResponse {
    Json(KeyReport::from(config.0.as_ref()))
}
