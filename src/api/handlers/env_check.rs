use super::presence;
use crate::config::AppConfig;
use axum::{extract::Extension, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Debug, PartialEq, Eq)]
pub struct EnvironmentReport {
    #[serde(rename = "UPSTASH_REDIS_REST_URL")]
    upstash_url: String,
    #[serde(rename = "UPSTASH_REDIS_REST_TOKEN")]
    upstash_token: String,
    #[serde(rename = "NODE_ENV")]
    node_env: Option<String>,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct EnvCheck {
    status: String,
    environment: EnvironmentReport,
}

impl From<&AppConfig> for EnvCheck {
    fn from(config: &AppConfig) -> Self {
        Self {
            status: "success".to_string(),
            environment: EnvironmentReport {
                upstash_url: presence(config.upstash_url.is_some()).to_string(),
                upstash_token: presence(config.upstash_token.is_some()).to_string(),
                node_env: config.node_env.clone(),
            },
        }
    }
}

#[utoipa::path(
    get,
    path= "/api/env-check",
    responses (
        (status = 200, description = "Which cache settings are present, and the runtime environment", body = EnvCheck),
    ),
    tag= "diagnostics"
)]
pub async fn env_check(config: Extension<Arc<AppConfig>>) -> impl IntoResponse {
    Json(EnvCheck::from(config.0.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use serde_json::json;

    #[test]
    fn reports_presence_not_values() {
        let mut config = AppConfig::new("pk_test_x");
        config.upstash_url = Some("https://eu1-test.upstash.io".to_string());
        config.node_env = Some("development".to_string());

        let report = serde_json::to_value(EnvCheck::from(&config)).unwrap_or_default();
        assert_eq!(
            report,
            json!({
                "status": "success",
                "environment": {
                    "UPSTASH_REDIS_REST_URL": "Set",
                    "UPSTASH_REDIS_REST_TOKEN": "Not set",
                    "NODE_ENV": "development"
                }
            })
        );

        config.upstash_token = Some(SecretString::from("token"));
        config.node_env = None;
        let report = serde_json::to_value(EnvCheck::from(&config)).unwrap_or_default();
        assert_eq!(report["environment"]["UPSTASH_REDIS_REST_TOKEN"], "Set");
        assert_eq!(report["environment"]["NODE_ENV"], serde_json::Value::Null);
    }
}
