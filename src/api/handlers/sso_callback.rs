//! Last hop of redirect-based sign-in.
//!
//! The hosted sign-in flow sends the browser here with the new session token
//! in `session_token`. A token that verifies is stored in the session cookie
//! so later requests carry it; in every case the browser lands on `/`.

use crate::config::AppConfig;
use crate::identity::{clerk::SESSION_COOKIE, SharedIdentity};
use axum::{
    extract::{Extension, Query},
    http::header::SET_COOKIE,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

#[derive(Deserialize, Debug, Default)]
pub struct Callback {
    session_token: Option<String>,
}

#[must_use]
pub fn session_cookie(token: &str, secure: bool) -> String {
    let mut cookie = format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

#[instrument(skip_all)]
pub async fn sso_callback(
    config: Extension<Arc<AppConfig>>,
    identity: Extension<SharedIdentity>,
    Query(callback): Query<Callback>,
) -> Response {
    let redirect = Redirect::to("/");

    let Some(token) = callback.session_token.filter(|t| !t.is_empty()) else {
        debug!("sso callback without session token");
        return redirect.into_response();
    };

    match identity.0.verify_session(&token).await {
        Ok(session) => {
            debug!("sso sign-in completed for {}", session.user_id());
            let cookie = session_cookie(&token, config.0.is_production());
            ([(SET_COOKIE, cookie)], redirect).into_response()
        }
        Err(e) => {
            warn!("sso callback with unusable session token: {}", e);
            redirect.into_response()
        }
    }
}
