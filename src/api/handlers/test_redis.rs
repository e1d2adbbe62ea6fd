use crate::api::error::ApiError;
use crate::cache::{Cache, SharedCache};
use anyhow::Result;
use axum::{extract::Extension, Json};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, instrument};
use utoipa::ToSchema;

pub const TEST_KEY: &str = "test-key";
pub const TEST_VALUE: &str = "test-value";

#[derive(ToSchema, Serialize, Debug)]
pub struct CacheCheck {
    status: String,
    #[schema(value_type = Object)]
    value: Value,
}

/// Write, read back and delete [`TEST_KEY`]; returns the value read back.
///
/// # Errors
/// Returns the first cache error.
pub async fn round_trip(cache: &dyn Cache) -> Result<Value> {
    cache.set(TEST_KEY, &json!(TEST_VALUE)).await?;
    let value = cache.get(TEST_KEY).await?;
    cache.delete(TEST_KEY).await?;
    Ok(value.unwrap_or(Value::Null))
}

#[utoipa::path(
    get,
    path= "/api/test-redis",
    responses (
        (status = 200, description = "Test key written, read back and deleted", body = CacheCheck),
        (status = 500, description = "Redis test failed"),
    ),
    tag= "diagnostics"
)]
#[instrument(skip_all)]
pub async fn test_redis(cache: Extension<SharedCache>) -> Result<Json<CacheCheck>, ApiError> {
    match round_trip(cache.0.as_ref()).await {
        Ok(value) => Ok(Json(CacheCheck {
            status: "success".to_string(),
            value,
        })),
        Err(e) => {
            error!("Redis test failed: {:#}", e);
            Err(ApiError::Internal("Redis test failed"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct DownCache;

    #[async_trait]
    impl Cache for DownCache {
        fn backend(&self) -> &'static str {
            "down"
        }

        async fn get(&self, _key: &str) -> Result<Option<Value>> {
            Err(anyhow!("connection refused"))
        }

        async fn set(&self, _key: &str, _value: &Value) -> Result<()> {
            Err(anyhow!("connection refused"))
        }

        async fn delete(&self, _key: &str) -> Result<()> {
            Err(anyhow!("connection refused"))
        }
    }

    #[tokio::test]
    async fn round_trip_leaves_no_key() -> Result<()> {
        let cache = Arc::new(MemoryCache::new());
        let shared: SharedCache = cache.clone();

        let Ok(Json(check)) = test_redis(Extension(shared)).await else {
            panic!("expected success");
        };
        assert_eq!(check.status, "success");
        assert_eq!(check.value, json!("test-value"));
        assert_eq!(cache.get(TEST_KEY).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn cache_failure_is_500() {
        let shared: SharedCache = Arc::new(DownCache);
        let result = test_redis(Extension(shared)).await;
        assert_eq!(result.err(), Some(ApiError::Internal("Redis test failed")));
    }
}
