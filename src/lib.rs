//! # Taleweaver (Personalized Story API)
//!
//! `taleweaver` is the HTTP front of a personalized children's story product. It
//! owns no business data of its own: every request is authenticated against the
//! identity provider (Clerk), and handlers delegate to managed services.
//!
//! ## Request flow
//!
//! 1. `TraceLayer` opens a span and an `x-request-id` (ULID) is assigned.
//! 2. The session middleware matches the path, reads the session token from the
//!    `Authorization` header or the `__session` cookie and verifies it offline
//!    against the provider's JWKS.
//! 3. Handlers receive the optional [`identity::Session`] explicitly and decide
//!    whether a session is required (`401 Unauthorized` otherwise).
//!
//! ## External services
//!
//! - **Cache:** Upstash Redis over its REST protocol ([`cache`]).
//! - **Documents:** Firestore through a Google service account ([`firestore`]).
//! - **Error telemetry:** Sentry, wired into `tracing` ([`cli::telemetry`]).
//! - **Personalization engine:** an external contract ([`story`]).
//!
//! All handles are built once at startup from a single validated
//! [`config::AppConfig`] and injected into handlers as `axum` extensions.

pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod firestore;
pub mod identity;
pub mod story;

#[cfg(test)]
mod test_support;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
