use crate::api::error::ApiError;
use crate::story::{SharedStoryEngine, StoryInput};
use axum::{extract::Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct GeneratedStory {
    #[schema(value_type = Object)]
    story: Value,
}

#[utoipa::path(
    post,
    path= "/api/test-story-generation",
    request_body(content = StoryInput, description = "Story input; the built-in sample is used when omitted"),
    responses (
        (status = 200, description = "Story generated", body = GeneratedStory),
        (status = 500, description = "Story generation failed"),
    ),
    tag= "stories"
)]
#[instrument(skip_all)]
pub async fn test_story_generation(
    engine: Extension<SharedStoryEngine>,
    payload: Option<Json<StoryInput>>,
) -> Result<Json<GeneratedStory>, ApiError> {
    let input = payload.map_or_else(StoryInput::sample, |Json(input)| input);

    info!("Generating story for {}", input.child_name);

    match engine.0.generate_personalized_story(&input).await {
        Ok(story) => Ok(Json(GeneratedStory { story })),
        Err(e) => {
            error!("Error generating story: {:#}", e);
            Err(ApiError::Internal("Story generation failed"))
        }
    }
}
