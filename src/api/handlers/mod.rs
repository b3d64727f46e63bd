//! Route handlers and shared helpers.

pub mod api;
pub mod dashboard;
pub mod gatekeeper;
pub mod health;
pub mod login;
pub mod root;
pub mod settings;
pub mod xmlrpc;

use axum::{
    http::{header::LOCATION, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::gate::GateState;

/// Session check shared by the handlers. Consults, never mutates.
pub(crate) async fn authenticated(state: &GateState, headers: &HeaderMap) -> bool {
    state.sessions().authenticate(headers).await.is_some()
}

/// Literal `302 Found` with an empty body; request processing ends here.
pub(crate) fn found(location: &str) -> Response {
    let mut response = StatusCode::FOUND.into_response();
    if let Ok(value) = HeaderValue::from_str(location) {
        response.headers_mut().insert(LOCATION, value);
    }
    response
}
