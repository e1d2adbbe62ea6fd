use crate::config::{ClerkSettings, DEFAULT_CLERK_API_URL};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_CLERK_PUBLISHABLE_KEY: &str = "clerk-publishable-key";
pub const ARG_CLERK_SECRET_KEY: &str = "clerk-secret-key";
pub const ARG_CLERK_API_URL: &str = "clerk-api-url";

pub const ENV_CLERK_PUBLISHABLE_KEY: &str = "NEXT_PUBLIC_CLERK_PUBLISHABLE_KEY";

/// Parse Clerk arguments from matches.
///
/// # Errors
/// Returns an error if the publishable key is missing; the service cannot
/// validate sessions without it.
pub fn parse(matches: &ArgMatches) -> anyhow::Result<ClerkSettings> {
    let Some(publishable_key) = super::non_empty(matches, ARG_CLERK_PUBLISHABLE_KEY) else {
        anyhow::bail!("Missing {ENV_CLERK_PUBLISHABLE_KEY}");
    };

    Ok(ClerkSettings {
        publishable_key,
        secret_key: super::non_empty(matches, ARG_CLERK_SECRET_KEY).map(SecretString::from),
        api_url: super::non_empty(matches, ARG_CLERK_API_URL)
            .unwrap_or_else(|| DEFAULT_CLERK_API_URL.to_string()),
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_CLERK_PUBLISHABLE_KEY)
                .long(ARG_CLERK_PUBLISHABLE_KEY)
                .help("Clerk publishable key (pk_test_... or pk_live_...)")
                .long_help(
                    "Clerk publishable key. The Clerk frontend API host is decoded from it and\nused to fetch the JWKS when no secret key is configured.",
                )
                .env(ENV_CLERK_PUBLISHABLE_KEY)
                .global(true),
        )
        .arg(
            Arg::new(ARG_CLERK_SECRET_KEY)
                .long(ARG_CLERK_SECRET_KEY)
                .help("Clerk secret key for backend API calls")
                .env("CLERK_SECRET_KEY")
                .hide_env_values(true)
                .global(true),
        )
        .arg(
            Arg::new(ARG_CLERK_API_URL)
                .long(ARG_CLERK_API_URL)
                .help("Clerk backend API base URL")
                .env("CLERK_API_URL")
                .default_value(DEFAULT_CLERK_API_URL)
                .global(true),
        )
}
