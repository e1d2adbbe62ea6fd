use crate::{
    cache::SharedCache,
    config::AppConfig,
    firestore::DocumentStore,
    identity::SharedIdentity,
    story::SharedStoryEngine,
};
use anyhow::Result;
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, Request,
    },
    routing::{get, options},
    Extension, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{error, info, info_span, Span};
use ulid::Ulid;
use utoipa_axum::router::OpenApiRouter;

pub mod error;
pub mod handlers;
pub mod middleware;
mod openapi;

pub use openapi::openapi;

use handlers::{health, root, sso_callback};
use middleware::{attach_session, RouteMatcher, SessionLayerState};

/// Build the API router with all documented routes registered.
#[must_use]
pub fn router() -> OpenApiRouter {
    openapi::api_router()
}

/// Service handles shared by every request.
#[derive(Clone)]
pub struct Services {
    pub config: Arc<AppConfig>,
    pub identity: SharedIdentity,
    pub cache: SharedCache,
    pub documents: Arc<DocumentStore>,
    pub stories: SharedStoryEngine,
}

/// The complete application: documented routes, the pages outside the
/// `OpenAPI` document, the session middleware and the service extensions.
#[must_use]
pub fn app(services: Services) -> Router {
    let session_state = SessionLayerState {
        identity: services.identity.clone(),
        matcher: RouteMatcher::default(),
    };

    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any);

    let (router, _openapi) = router().split_for_parts();
    router
        .route("/", get(root::root))
        .route("/sso-callback", get(sso_callback::sso_callback))
        .route("/health", options(health::health))
        .layer(axum::middleware::from_fn_with_state(
            session_state,
            attach_session,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(services.config))
                .layer(Extension(services.identity))
                .layer(Extension(services.cache))
                .layer(Extension(services.documents))
                .layer(Extension(services.stories)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to bind or serve
pub async fn new(port: u16, services: Services) -> Result<()> {
    let app = app(services);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Gracefully shutdown");
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
