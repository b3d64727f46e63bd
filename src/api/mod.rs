//! HTTP wiring: router construction, middleware stack, and the listener.

use anyhow::Result;
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    routing::{any, get},
    Extension, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;

use crate::gate::GateState;

pub mod handlers;
mod openapi;

pub use openapi::openapi;

/// Build the full application router around a shared gate state.
///
/// Fixed routes cover the service's own surface; everything else falls
/// through to the gatekeeper dispatch, which owns the two dynamic paths
/// (the alias and the real login path).
#[must_use]
pub fn router(state: Arc<GateState>) -> Router {
    let api_routes = Router::new()
        .route("/status", get(handlers::api::status))
        .route("/whoami", get(handlers::api::whoami))
        .layer(axum::middleware::from_fn(handlers::api::rest_gate));

    Router::new()
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::health::health))
        .route("/dashboard", get(handlers::dashboard::dashboard))
        .route(
            "/settings",
            get(handlers::settings::show).put(handlers::settings::update),
        )
        .nest("/api", api_routes)
        .route("/xmlrpc", any(handlers::xmlrpc::xmlrpc))
        .route("/openapi.json", get(openapi::serve))
        .fallback(handlers::gatekeeper::dispatch)
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
                .layer(Extension(state)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to bind or serve
pub async fn new(port: u16, state: Arc<GateState>) -> Result<()> {
    let app = router(state);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
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
