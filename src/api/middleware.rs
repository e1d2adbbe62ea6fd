//! Session middleware.
//!
//! For every request whose path the [`RouteMatcher`] accepts, the session
//! token is read from the `Authorization: Bearer` header or the `__session`
//! cookie and verified with the identity provider. A verified
//! [`Session`](crate::identity::Session) is inserted into the request
//! extensions. The middleware never rejects a request: handlers decide
//! whether a session is required.

use crate::identity::{clerk::SESSION_COOKIE, SharedIdentity};
use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, COOKIE},
        HeaderMap,
    },
    middleware::Next,
    response::Response,
};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, error};

// last path segment carries a file extension, e.g. /logo.png or /a/b.min.js
static STATIC_FILE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^/.+\.\w+$").ok());

#[derive(Debug, Clone)]
pub struct RouteMatcher {
    always: Vec<String>,
    skip_prefixes: Vec<String>,
}

impl Default for RouteMatcher {
    fn default() -> Self {
        Self {
            always: vec!["/api".to_string(), "/trpc".to_string()],
            skip_prefixes: vec!["/_next".to_string()],
        }
    }
}

impl RouteMatcher {
    /// `/`, `/api/*` and `/trpc/*` are always matched; otherwise static files
    /// and framework-internal paths are skipped.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        if path == "/" || self.always.iter().any(|prefix| path.starts_with(prefix.as_str())) {
            return true;
        }

        if self
            .skip_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
        {
            return false;
        }

        !STATIC_FILE
            .as_ref()
            .is_some_and(|re| re.is_match(path))
    }
}

#[derive(Clone)]
pub struct SessionLayerState {
    pub identity: SharedIdentity,
    pub matcher: RouteMatcher,
}

/// Bearer token first, then the session cookie.
#[must_use]
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

pub async fn attach_session(
    State(state): State<SessionLayerState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();

    if state.matcher.matches(path) {
        if let Some(token) = session_token(request.headers()) {
            match state.identity.verify_session(&token).await {
                Ok(session) => {
                    debug!("session for {}", session.user_id());
                    request.extensions_mut().insert(session);
                }
                Err(e) if e.is_rejection() => debug!("Ignoring session token: {}", e),
                Err(e) => error!("Failed to verify session: {}", e),
            }
        }
    }

    next.run(request).await
}
