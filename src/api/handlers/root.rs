use crate::identity::Session;
use axum::{extract::Extension, response::IntoResponse, Json};
use serde_json::json;

pub async fn root(session: Option<Extension<Session>>) -> impl IntoResponse {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "signedIn": session.is_some(),
    }))
}
