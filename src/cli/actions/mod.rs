pub mod diagnose;
pub mod server;

// Internal "interpreter" for `Action`.
mod run;

use crate::config::AppConfig;

#[derive(Debug)]
pub enum Action {
    Server(AppConfig),
    CheckCache(diagnose::CacheArgs),
    CheckStory(diagnose::StoryArgs),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
