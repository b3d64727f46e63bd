//! Settings surface: read and update the login alias.
//!
//! The only mutable configuration in the whole service. Validation runs
//! before persistence; a rejected value leaves the previous alias in effect.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::gate::filters::ApiError;
use crate::gate::{rewrite, Alias, GateState};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Settings {
    /// Current alias slug.
    pub alias: String,
    /// Full aliased login URL.
    pub login_url: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SettingsUpdate {
    pub alias: String,
}

#[utoipa::path(
    get,
    path = "/settings",
    responses(
        (status = 200, description = "Current gate settings", body = Settings),
        (status = 401, description = "Caller has no session", body = ApiError)
    ),
    tag = "settings"
)]
pub async fn show(state: Extension<Arc<GateState>>, headers: HeaderMap) -> Response {
    if !super::authenticated(&state, &headers).await {
        return forbidden();
    }

    let alias = state.alias();
    Json(Settings {
        login_url: rewrite::login_url(state.config(), &alias, None),
        alias: alias.into(),
    })
    .into_response()
}

#[utoipa::path(
    put,
    path = "/settings",
    request_body = SettingsUpdate,
    responses(
        (status = 200, description = "Alias updated", body = Settings),
        (status = 401, description = "Caller has no session", body = ApiError),
        (status = 422, description = "Alias rejected, previous value retained", body = ApiError)
    ),
    tag = "settings"
)]
pub async fn update(
    state: Extension<Arc<GateState>>,
    headers: HeaderMap,
    payload: Option<Json<SettingsUpdate>>,
) -> Response {
    if !super::authenticated(&state, &headers).await {
        return forbidden();
    }

    let Some(Json(payload)) = payload else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                code: "missing_payload".to_string(),
                message: "Request body must be a JSON object with an `alias` field.".to_string(),
                status: StatusCode::BAD_REQUEST.as_u16(),
            }),
        )
            .into_response();
    };

    let alias = match Alias::parse(&payload.alias) {
        Ok(alias) => alias,
        Err(err) => {
            return invalid_alias(err.to_string());
        }
    };

    // The reserved list is static; the concealed login path is per-deploy
    // and must be rejected here, or the alias would shadow it and lock the
    // operator out of the login form.
    if state.config().alias_shadows_login(&alias) {
        return invalid_alias(format!(
            "'{alias}' is the concealed login path, choose a different alias"
        ));
    }

    if let Err(err) = state.persist_alias(&alias) {
        error!("Failed to persist alias: {err:?}");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    info!("Login alias updated to {alias}");

    Json(Settings {
        login_url: rewrite::login_url(state.config(), &alias, None),
        alias: alias.into(),
    })
    .into_response()
}

fn invalid_alias(message: String) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiError {
            code: "invalid_alias".to_string(),
            message,
            status: StatusCode::UNPROCESSABLE_ENTITY.as_u16(),
        }),
    )
        .into_response()
}

fn forbidden() -> Response {
    ApiError {
        code: "settings_forbidden".to_string(),
        message: "Settings are only available to authenticated users.".to_string(),
        status: StatusCode::UNAUTHORIZED.as_u16(),
    }
    .into_response()
}
