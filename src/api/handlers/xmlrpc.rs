use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::gate::filters;

/// Remote-procedure endpoint. Consults the capability gate, which reports
/// disabled unconditionally, so every method and body gets the same refusal.
pub async fn xmlrpc() -> Response {
    if filters::xmlrpc_enabled() {
        return StatusCode::NOT_IMPLEMENTED.into_response();
    }

    (
        StatusCode::FORBIDDEN,
        "XML-RPC services are disabled on this site.",
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn xmlrpc_is_forbidden() {
        let response = xmlrpc().await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
