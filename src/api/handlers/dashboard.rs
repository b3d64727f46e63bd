use axum::{
    extract::Extension,
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;

use crate::gate::{rewrite, GateState};

/// Authenticated landing page. Anonymous callers are bounced to the aliased
/// login URL with the dashboard as the post-login destination.
pub async fn dashboard(state: Extension<Arc<GateState>>, headers: HeaderMap) -> Response {
    let Some(session) = state.sessions().authenticate(&headers).await else {
        let alias = state.alias();
        let login_url = rewrite::login_url(
            state.config(),
            &alias,
            Some(&rewrite::dashboard_url(state.config())),
        );
        return super::found(&login_url);
    };

    let alias = state.alias();
    let logout_url = format!(
        "{}?action=logout",
        rewrite::login_url(state.config(), &alias, None)
    );

    Html(format!(
        r#"<!doctype html>
<html>
<head><title>Dashboard</title></head>
<body>
<h1>Dashboard</h1>
<p>Signed in as <strong>{username}</strong>.</p>
<p><a href="/settings">Settings</a> · <a href="{logout_url}">Log out</a></p>
</body>
</html>
"#,
        username = session.username,
    ))
    .into_response()
}
