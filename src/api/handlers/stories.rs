use crate::api::error::ApiError;
use crate::identity::Session;
use axum::{extract::Extension, response::IntoResponse};
use tracing::debug;

#[utoipa::path(
    get,
    path= "/api/stories",
    responses (
        (status = 401, description = "No valid session", body = String, content_type = "text/plain"),
        (status = 501, description = "Listing stories is not implemented yet", body = String, content_type = "text/plain"),
    ),
    tag= "stories"
)]
pub async fn list_stories(session: Option<Extension<Session>>) -> impl IntoResponse {
    let Some(Extension(session)) = session else {
        return ApiError::Unauthorized;
    };

    // TODO: read the user's stories from the `stories` collection once the
    // document layout is settled.
    debug!("story listing requested by {}", session.user_id());

    ApiError::NotImplemented
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::to_bytes, http::StatusCode};

    #[tokio::test]
    async fn requires_session() -> anyhow::Result<()> {
        let response = list_stories(None).await.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        assert_eq!(&body[..], b"Unauthorized");
        Ok(())
    }

    #[tokio::test]
    async fn signed_in_is_not_implemented() {
        let session = Session::new("user_1", None, "token");
        let response = list_stories(Some(Extension(session))).await.into_response();
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    }
}
