//! Current user, as UI clients see it.
//!
//! `null` when nobody is signed in, otherwise the provider's user record
//! reduced to id, primary email, display name and avatar.

use crate::api::error::ApiError;
use crate::identity::{Session, SharedIdentity, UserProjection};
use axum::{extract::Extension, Json};
use tracing::{error, instrument};

#[utoipa::path(
    get,
    path= "/api/me",
    responses (
        (status = 200, description = "Signed-in user, or null when signed out", body = UserProjection),
        (status = 500, description = "Failed to load user"),
    ),
    tag= "me"
)]
#[instrument(skip_all)]
pub async fn me(
    identity: Extension<SharedIdentity>,
    session: Option<Extension<Session>>,
) -> Result<Json<Option<UserProjection>>, ApiError> {
    let Some(Extension(session)) = session else {
        return Ok(Json(None));
    };

    match identity.0.fetch_user(session.user_id()).await {
        Ok(user) => Ok(Json(Some(UserProjection::from(&user)))),
        Err(e) => {
            error!("Failed to load user {}: {}", session.user_id(), e);
            Err(ApiError::Internal("Failed to load user"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{IdentityError, IdentityProvider, IdentityUser};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;

    struct Directory;

    #[async_trait]
    impl IdentityProvider for Directory {
        async fn verify_session(&self, _token: &str) -> Result<Session, IdentityError> {
            Err(IdentityError::Expired)
        }

        async fn fetch_user(&self, user_id: &str) -> Result<IdentityUser, IdentityError> {
            if user_id != "user_ada" {
                return Err(IdentityError::NotConfigured("CLERK_SECRET_KEY"));
            }
            serde_json::from_value(json!({
                "id": "user_ada",
                "first_name": "Ada",
                "last_name": "Lovelace",
                "image_url": null,
                "primary_email_address_id": "idn_1",
                "email_addresses": [{"id": "idn_1", "email_address": "ada@example.com"}]
            }))
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))
        }
    }

    fn identity() -> Extension<SharedIdentity> {
        Extension(Arc::new(Directory))
    }

    #[tokio::test]
    async fn anonymous_is_null() {
        let result = me(identity(), None).await;
        assert_eq!(result.ok().map(|Json(p)| p), Some(None));
    }

    #[tokio::test]
    async fn signed_in_projection() {
        let session = Session::new("user_ada", None, "token");
        let result = me(identity(), Some(Extension(session))).await;
        let projection = result.ok().and_then(|Json(p)| p);
        assert_eq!(
            projection,
            Some(UserProjection {
                id: "user_ada".to_string(),
                email: Some("ada@example.com".to_string()),
                full_name: Some("Ada Lovelace".to_string()),
                image_url: None,
            })
        );
    }

    #[tokio::test]
    async fn provider_failure_is_500() {
        let session = Session::new("user_gone", None, "token");
        let result = me(identity(), Some(Extension(session))).await;
        assert_eq!(result.err(), Some(ApiError::Internal("Failed to load user")));
    }
}
