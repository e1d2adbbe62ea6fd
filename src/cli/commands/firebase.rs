use crate::config::{DEFAULT_FIRESTORE_URL, DEFAULT_GOOGLE_TOKEN_URL, FirebaseSettings};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_FIREBASE_PROJECT_ID: &str = "firebase-project-id";
pub const ARG_FIREBASE_CLIENT_EMAIL: &str = "firebase-client-email";
pub const ARG_FIREBASE_PRIVATE_KEY: &str = "firebase-private-key";
pub const ARG_FIRESTORE_URL: &str = "firestore-url";
pub const ARG_GOOGLE_TOKEN_URL: &str = "google-token-url";

#[must_use]
pub fn parse(matches: &ArgMatches) -> FirebaseSettings {
    FirebaseSettings {
        project_id: super::non_empty(matches, ARG_FIREBASE_PROJECT_ID),
        client_email: super::non_empty(matches, ARG_FIREBASE_CLIENT_EMAIL),
        private_key: super::non_empty(matches, ARG_FIREBASE_PRIVATE_KEY).map(SecretString::from),
        firestore_url: super::non_empty(matches, ARG_FIRESTORE_URL)
            .unwrap_or_else(|| DEFAULT_FIRESTORE_URL.to_string()),
        token_url: super::non_empty(matches, ARG_GOOGLE_TOKEN_URL)
            .unwrap_or_else(|| DEFAULT_GOOGLE_TOKEN_URL.to_string()),
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_FIREBASE_PROJECT_ID)
                .long(ARG_FIREBASE_PROJECT_ID)
                .help("Firebase project id")
                .env("FIREBASE_PROJECT_ID"),
        )
        .arg(
            Arg::new(ARG_FIREBASE_CLIENT_EMAIL)
                .long(ARG_FIREBASE_CLIENT_EMAIL)
                .help("Firebase service account client email")
                .env("FIREBASE_CLIENT_EMAIL"),
        )
        .arg(
            Arg::new(ARG_FIREBASE_PRIVATE_KEY)
                .long(ARG_FIREBASE_PRIVATE_KEY)
                .help("Firebase service account private key (PEM, `\\n` escapes allowed)")
                .env("FIREBASE_PRIVATE_KEY")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_FIRESTORE_URL)
                .long(ARG_FIRESTORE_URL)
                .help("Firestore REST base URL")
                .env("FIRESTORE_URL")
                .default_value(DEFAULT_FIRESTORE_URL),
        )
        .arg(
            Arg::new(ARG_GOOGLE_TOKEN_URL)
                .long(ARG_GOOGLE_TOKEN_URL)
                .help("Google OAuth2 token endpoint for service account assertions")
                .env("GOOGLE_TOKEN_URL")
                .default_value(DEFAULT_GOOGLE_TOKEN_URL),
        )
}
