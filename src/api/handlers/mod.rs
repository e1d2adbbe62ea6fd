//! Route handlers.
//!
//! Handlers receive the optional session as an explicit argument and the
//! service handles as extensions. Downstream failures are logged here and
//! turned into [`ApiError`](super::error::ApiError) responses.

pub mod env_check;
pub mod health;
pub mod me;
pub mod root;
pub mod sso_callback;
pub mod stories;
pub mod story_generation;
pub mod test_env;
pub mod test_redis;

pub const SET: &str = "Set";
pub const NOT_SET: &str = "Not set";

#[must_use]
pub const fn presence(set: bool) -> &'static str {
    if set {
        SET
    } else {
        NOT_SET
    }
}
