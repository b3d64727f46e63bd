use axum::{
    extract::Extension,
    response::{Html, IntoResponse},
};
use std::sync::Arc;

use crate::gate::{rewrite, GateState};

/// Landing page. The sign-in link goes through the rewriter, so the real
/// login path never appears in rendered output.
pub async fn root(state: Extension<Arc<GateState>>) -> impl IntoResponse {
    let alias = state.alias();
    let login_url = rewrite::login_url(state.config(), &alias, None);

    Html(format!(
        r#"<!doctype html>
<html>
<head><title>{name}</title></head>
<body>
<h1>{name}</h1>
<p>This site's administrative login lives behind a private address.</p>
<p><a href="{login_url}">Sign in</a></p>
</body>
</html>
"#,
        name = env!("CARGO_PKG_NAME"),
    ))
}
