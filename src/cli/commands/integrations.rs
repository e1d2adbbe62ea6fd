use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_OPENAI_API_KEY: &str = "openai-api-key";
pub const ARG_NEXTAUTH_SECRET: &str = "nextauth-secret";
pub const ARG_NEXTAUTH_URL: &str = "nextauth-url";
pub const ARG_GOOGLE_CLIENT_ID: &str = "google-client-id";
pub const ARG_GOOGLE_CLIENT_SECRET: &str = "google-client-secret";
pub const ARG_STORY_ENGINE_URL: &str = "story-engine-url";

/// Third-party credentials the service only reports on, plus the engine URL.
#[derive(Clone)]
pub struct Options {
    pub openai_api_key: Option<SecretString>,
    pub nextauth_secret: Option<SecretString>,
    pub nextauth_url: Option<String>,
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<SecretString>,
    pub story_engine_url: Option<String>,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        let secret = |id: &str| super::non_empty(matches, id).map(SecretString::from);
        Self {
            openai_api_key: secret(ARG_OPENAI_API_KEY),
            nextauth_secret: secret(ARG_NEXTAUTH_SECRET),
            nextauth_url: super::non_empty(matches, ARG_NEXTAUTH_URL),
            google_client_id: super::non_empty(matches, ARG_GOOGLE_CLIENT_ID),
            google_client_secret: secret(ARG_GOOGLE_CLIENT_SECRET),
            story_engine_url: super::non_empty(matches, ARG_STORY_ENGINE_URL),
        }
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_OPENAI_API_KEY)
                .long(ARG_OPENAI_API_KEY)
                .help("OpenAI API key used by the personalization engine")
                .env("OPENAI_API_KEY")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_NEXTAUTH_SECRET)
                .long(ARG_NEXTAUTH_SECRET)
                .help("NextAuth secret")
                .env("NEXTAUTH_SECRET")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_NEXTAUTH_URL)
                .long(ARG_NEXTAUTH_URL)
                .help("NextAuth canonical URL")
                .env("NEXTAUTH_URL"),
        )
        .arg(
            Arg::new(ARG_GOOGLE_CLIENT_ID)
                .long(ARG_GOOGLE_CLIENT_ID)
                .help("Google OAuth client id")
                .env("GOOGLE_CLIENT_ID"),
        )
        .arg(
            Arg::new(ARG_GOOGLE_CLIENT_SECRET)
                .long(ARG_GOOGLE_CLIENT_SECRET)
                .help("Google OAuth client secret")
                .env("GOOGLE_CLIENT_SECRET")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_STORY_ENGINE_URL)
                .long(ARG_STORY_ENGINE_URL)
                .help("Personalization engine endpoint receiving story inputs")
                .env("STORY_ENGINE_URL")
                .global(true),
        )
}
