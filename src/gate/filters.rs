//! The two fixed access-control gates.
//!
//! Both are order-insensitive, evaluated once per request lifecycle, and
//! return their decisions as plain values.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Capability check for the remote-procedure interface. Always disabled;
/// consulted by the handler on every request so nothing can re-enable it.
#[must_use]
pub const fn xmlrpc_enabled() -> bool {
    false
}

/// Structured authorization error returned as a value, never thrown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Stable machine-readable code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// HTTP status the error maps to.
    pub status: u16,
}

impl ApiError {
    /// The REST gate's denial: 401 with a stable code.
    #[must_use]
    pub fn rest_forbidden() -> Self {
        Self {
            code: "rest_forbidden".to_string(),
            message: "The API is only available to authenticated users.".to_string(),
            status: StatusCode::UNAUTHORIZED.as_u16(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Decision produced by a collaborator in the API authentication chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestDecision {
    Allow,
    Deny(ApiError),
}

/// Read/write API authentication gate.
///
/// A decision already made upstream passes through untouched, error or not.
/// With no prior decision, unauthenticated callers are denied; authenticated
/// callers leave the chain undecided (`None`) for later collaborators.
#[must_use]
pub fn rest_authentication(
    prior: Option<RestDecision>,
    authenticated: bool,
) -> Option<RestDecision> {
    if prior.is_some() {
        return prior;
    }

    if !authenticated {
        return Some(RestDecision::Deny(ApiError::rest_forbidden()));
    }

    None
}
