//! Read/write API surface, guarded by the REST authentication gate.

use axum::{
    extract::{Extension, Request},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::gate::filters::{rest_authentication, RestDecision};
use crate::gate::GateState;

/// Middleware form of the REST gate.
///
/// No collaborator runs before it here, so the prior decision is always
/// `None`; the pure form in [`crate::gate::filters`] carries the
/// pass-through-what-upstream-decided contract and its tests.
pub async fn rest_gate(
    state: Extension<Arc<GateState>>,
    request: Request,
    next: Next,
) -> Response {
    let authenticated = super::authenticated(&state, request.headers()).await;

    match rest_authentication(None, authenticated) {
        Some(RestDecision::Deny(error)) => error.into_response(),
        Some(RestDecision::Allow) | None => next.run(request).await,
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ApiStatus {
    name: String,
    version: String,
}

#[utoipa::path(
    get,
    path = "/api/status",
    responses(
        (status = 200, description = "Service status", body = ApiStatus),
        (status = 401, description = "Caller has no session", body = crate::gate::filters::ApiError)
    ),
    tag = "api"
)]
pub async fn status() -> impl IntoResponse {
    Json(ApiStatus {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Whoami {
    username: String,
}

#[utoipa::path(
    get,
    path = "/api/whoami",
    responses(
        (status = 200, description = "Current session owner", body = Whoami),
        (status = 401, description = "Caller has no session", body = crate::gate::filters::ApiError)
    ),
    tag = "api"
)]
pub async fn whoami(
    state: Extension<Arc<GateState>>,
    headers: HeaderMap,
) -> Response {
    // The gate already ran, but the middleware does not pass the session
    // through, so resolve it again.
    match state.sessions().authenticate(&headers).await {
        Some(session) => Json(Whoami {
            username: session.username,
        })
        .into_response(),
        None => crate::gate::filters::ApiError::rest_forbidden().into_response(),
    }
}
