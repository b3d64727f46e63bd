//! `OpenAPI` document for the service's fixed routes.
//!
//! The alias and real-login paths are deliberately undocumented: the whole
//! point of the gate is that the login path is not discoverable.

use axum::response::{IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::handlers;
use crate::gate::filters::ApiError;

#[derive(OpenApi)]
#[openapi(
    info(
        title = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        description = env!("CARGO_PKG_DESCRIPTION"),
    ),
    paths(
        handlers::health::health,
        handlers::api::status,
        handlers::api::whoami,
        handlers::settings::show,
        handlers::settings::update,
    ),
    components(schemas(
        ApiError,
        handlers::api::ApiStatus,
        handlers::api::Whoami,
        handlers::health::Health,
        handlers::settings::Settings,
        handlers::settings::SettingsUpdate,
    )),
    tags(
        (name = "health", description = "Liveness"),
        (name = "api", description = "Session-gated read API"),
        (name = "settings", description = "Gate configuration"),
    )
)]
struct ApiDoc;

/// The generated `OpenAPI` specification.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

pub(crate) async fn serve() -> impl IntoResponse {
    Json(openapi())
}
