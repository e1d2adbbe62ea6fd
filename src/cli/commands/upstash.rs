use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_UPSTASH_URL: &str = "upstash-redis-rest-url";
pub const ARG_UPSTASH_TOKEN: &str = "upstash-redis-rest-token";

#[derive(Clone)]
pub struct Options {
    pub url: Option<String>,
    pub token: Option<SecretString>,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        Self {
            url: super::non_empty(matches, ARG_UPSTASH_URL),
            token: super::non_empty(matches, ARG_UPSTASH_TOKEN).map(SecretString::from),
        }
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_UPSTASH_URL)
                .long(ARG_UPSTASH_URL)
                .help("Upstash Redis REST URL")
                .env("UPSTASH_REDIS_REST_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_UPSTASH_TOKEN)
                .long(ARG_UPSTASH_TOKEN)
                .help("Upstash Redis REST token")
                .env("UPSTASH_REDIS_REST_TOKEN")
                .hide_env_values(true)
                .global(true),
        )
}
