use crate::cli::actions::{diagnose, server, Action};
use anyhow::Result;

/// Execute the provided action.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Server(config) => server::execute(config).await,
        Action::CheckCache(args) => diagnose::check_cache(args).await,
        Action::CheckStory(args) => diagnose::check_story(args).await,
    }
}
