//! The login endpoint's own logic: form rendering, credential submission,
//! logout, and the password-reset sub-flows.
//!
//! This handler is only ever reached through the gatekeeper, either an
//! alias hit (with [`LoginVars`] seeded to blank defaults) or an allowed
//! action on the real path. It behaves identically in both cases, so hitting
//! the alias is indistinguishable from hitting the real endpoint.

use axum::{
    body::Body,
    http::{
        header::{REFERER, SET_COOKIE},
        HeaderMap, Method, Request, StatusCode,
    },
    response::{Html, IntoResponse, Response},
};
use std::collections::HashMap;
use tracing::{info, warn};
use url::Url;

use crate::gate::{rewrite, Alias, GateState, LoginVars};
use crate::session;

const FORM_BODY_LIMIT: usize = 64 * 1024;

/// Dispatch a login-endpoint request for the given seeded variables.
/// Ownership of `vars` transfers here; nothing ambient is consulted.
pub async fn serve(
    state: &GateState,
    alias: &Alias,
    vars: LoginVars,
    request: Request<Body>,
) -> Response {
    let logged_out = query_flag(&request, "loggedout");

    match vars.action.as_str() {
        "logout" => logout(state, alias, request.headers()).await,
        "lostpassword" => lost_password(state, alias, request).await,
        "rp" | "resetpass" => reset_password(),
        "postpass" => post_password(state, &request),
        // Anything else renders the login flow, like the real endpoint does
        // for unknown actions.
        _ => login(state, alias, vars, request, logged_out).await,
    }
}

async fn login(
    state: &GateState,
    alias: &Alias,
    mut vars: LoginVars,
    request: Request<Body>,
    logged_out: bool,
) -> Response {
    if request.method() != Method::POST {
        let notice = logged_out.then_some("You are now logged out.");
        return login_form(state, alias, &vars, notice);
    }

    let fields = form_fields(request).await;
    let username = fields.get("log").cloned().unwrap_or_default();
    let password = fields.get("pwd").cloned().unwrap_or_default();
    let redirect_to = fields
        .get("redirect_to")
        .cloned()
        .unwrap_or_else(|| vars.redirect_to.clone());

    if state.verifier().verify(&username, &password) {
        let token = state.sessions().create(&username).await;
        let destination = rewrite::sanitize_redirect(state.config(), alias, &redirect_to);

        info!("Session created for {username}");

        let mut response = super::found(&destination);
        if let Ok(cookie) = session::session_cookie(
            &token,
            state.config().session_ttl(),
            state.config().cookie_secure(),
        ) {
            response.headers_mut().insert(SET_COOKIE, cookie);
        }
        return response;
    }

    warn!("Failed login attempt for {username}");

    vars.user_login = username;
    vars.error = "Invalid username or password.".to_string();
    login_form(state, alias, &vars, None)
}

async fn logout(state: &GateState, alias: &Alias, headers: &HeaderMap) -> Response {
    state.sessions().destroy(headers).await;

    // Back to the (aliased) login form, with the logged-out notice.
    let location = rewrite::login_url(state.config(), alias, None);
    let location = match Url::parse(&location) {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair("loggedout", "true");
            url.to_string()
        }
        Err(_) => location,
    };

    let mut response = super::found(&location);
    if let Ok(cookie) = session::clear_session_cookie(state.config().cookie_secure()) {
        response.headers_mut().insert(SET_COOKIE, cookie);
    }
    response
}

async fn lost_password(state: &GateState, alias: &Alias, request: Request<Body>) -> Response {
    if request.method() != Method::POST {
        let action_url = action_url(state, alias, "lostpassword");
        let page = page(
            "Lost password",
            &format!(
                r#"<p>Enter your username and a reset link will be issued.</p>
<form method="post" action="{action_url}">
<label>Username <input type="text" name="user_login" /></label>
<input type="submit" value="Request reset" />
</form>"#,
                action_url = escape_attr(&action_url),
            ),
        );
        return page.into_response();
    }

    let fields = form_fields(request).await;
    let user_login = fields.get("user_login").cloned().unwrap_or_default();
    info!("Password reset requested for {user_login:?}");

    // Never confirm whether the account exists.
    page(
        "Lost password",
        "<p>If that account exists, a reset link has been issued to its owner.</p>",
    )
    .into_response()
}

fn reset_password() -> Response {
    // Reset keys are issued out-of-band; a bare hit on the reset actions is
    // always a dead link.
    (
        StatusCode::GONE,
        page(
            "Reset password",
            "<p>This password reset link is invalid or has expired.</p>",
        ),
    )
        .into_response()
}

fn post_password(state: &GateState, request: &Request<Body>) -> Response {
    // Password-protected content unlock: bounce back to where the form was.
    let back = request
        .headers()
        .get(REFERER)
        .and_then(|value| value.to_str().ok())
        .map_or_else(
            || rewrite::site_root_url(state.config()),
            ToString::to_string,
        );
    super::found(&back)
}

/// Render the login form for the current vars.
fn login_form(
    state: &GateState,
    alias: &Alias,
    vars: &LoginVars,
    notice: Option<&str>,
) -> Response {
    let action_url = rewrite::login_url(state.config(), alias, None);
    let lost_url = action_url_for(&action_url, "lostpassword");

    let mut messages = String::new();
    if let Some(notice) = notice {
        messages.push_str(&format!("<p class=\"notice\">{notice}</p>\n"));
    }
    if !vars.error.is_empty() {
        messages.push_str(&format!(
            "<p class=\"error\">{}</p>\n",
            escape_html(&vars.error)
        ));
    }

    page(
        "Log in",
        &format!(
            r#"{messages}<form method="post" action="{action}">
<label>Username <input type="text" name="log" value="{user_login}" /></label>
<label>Password <input type="password" name="pwd" /></label>
<input type="hidden" name="redirect_to" value="{redirect_to}" />
<input type="submit" value="Log in" />
</form>
<p><a href="{lost}">Lost your password?</a></p>"#,
            action = escape_attr(&action_url),
            user_login = escape_attr(&vars.user_login),
            redirect_to = escape_attr(&vars.redirect_to),
            lost = escape_attr(&lost_url),
        ),
    )
    .into_response()
}

fn action_url(state: &GateState, alias: &Alias, action: &str) -> String {
    action_url_for(&rewrite::login_url(state.config(), alias, None), action)
}

fn action_url_for(login_url: &str, action: &str) -> String {
    match Url::parse(login_url) {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair("action", action);
            url.to_string()
        }
        Err(_) => login_url.to_string(),
    }
}

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html>\n<head><title>{title}</title></head>\n<body>\n<h1>{title}</h1>\n{body}\n</body>\n</html>\n"
    ))
}

async fn form_fields(request: Request<Body>) -> HashMap<String, String> {
    let bytes = axum::body::to_bytes(request.into_body(), FORM_BODY_LIMIT)
        .await
        .unwrap_or_default();
    url::form_urlencoded::parse(&bytes).into_owned().collect()
}

fn query_flag(request: &Request<Body>, name: &str) -> bool {
    request.uri().query().is_some_and(|query| {
        url::form_urlencoded::parse(query.as_bytes())
            .any(|(key, value)| key == name && value == "true")
    })
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(input: &str) -> String {
    escape_html(input).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::GateConfig;
    use crate::session::StaticCredentials;
    use crate::store::MemoryStore;
    use axum::http::header::LOCATION;
    use std::sync::Arc;

    fn state() -> GateState {
        let config = GateConfig::new(Url::parse("http://example.com").unwrap());
        GateState::new(
            config,
            Arc::new(MemoryStore::new()),
            Arc::new(StaticCredentials::new("admin".into(), "hunter2".into())),
        )
    }

    fn alias() -> Alias {
        Alias::parse("secure-area").unwrap()
    }

    fn form_request(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/secure-area")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn get_renders_form_with_aliased_action() {
        let state = state();
        let request = Request::builder()
            .uri("/secure-area")
            .body(Body::empty())
            .unwrap();
        let response = serve(&state, &alias(), LoginVars::default(), request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert!(body.contains("action=\"http://example.com/secure-area\""));
        assert!(!body.contains("/login"));
    }

    #[tokio::test]
    async fn successful_post_sets_cookie_and_redirects() {
        let state = state();
        let request = form_request("log=admin&pwd=hunter2&redirect_to=%2Fdashboard");
        let response = serve(&state, &alias(), LoginVars::default(), request).await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "/dashboard"
        );
        let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with(session::SESSION_COOKIE_NAME));
    }

    #[tokio::test]
    async fn login_redirect_to_alias_is_sanitized() {
        let state = state();
        let request = form_request("log=admin&pwd=hunter2&redirect_to=%2Fsecure-area");
        let response = serve(&state, &alias(), LoginVars::default(), request).await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "http://example.com/dashboard"
        );
    }

    #[tokio::test]
    async fn failed_post_rerenders_with_error() {
        let state = state();
        let request = form_request("log=admin&pwd=wrong");
        let response = serve(&state, &alias(), LoginVars::default(), request).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(SET_COOKIE).is_none());
        let body = body_string(response).await;
        assert!(body.contains("Invalid username or password."));
        assert!(body.contains("value=\"admin\""));
    }

    #[tokio::test]
    async fn logout_clears_cookie_and_redirects_to_alias() {
        let state = state();
        let request = Request::builder()
            .uri("/login?action=logout")
            .body(Body::empty())
            .unwrap();
        let vars = LoginVars::seeded("logout", "");
        let response = serve(&state, &alias(), vars, request).await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "http://example.com/secure-area?loggedout=true"
        );
        let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn lostpassword_never_confirms_accounts() {
        let state = state();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/secure-area?action=lostpassword")
            .body(Body::from("user_login=whoever"))
            .unwrap();
        let vars = LoginVars::seeded("lostpassword", "");
        let response = serve(&state, &alias(), vars, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("If that account exists"));
    }

    #[tokio::test]
    async fn reset_actions_are_dead_links() {
        let state = state();
        for action in ["rp", "resetpass"] {
            let request = Request::builder()
                .uri("/login")
                .body(Body::empty())
                .unwrap();
            let vars = LoginVars::seeded(action, "");
            let response = serve(&state, &alias(), vars, request).await;
            assert_eq!(response.status(), StatusCode::GONE, "action {action}");
        }
    }

    #[tokio::test]
    async fn loggedout_notice_shows_on_form() {
        let state = state();
        let request = Request::builder()
            .uri("/secure-area?loggedout=true")
            .body(Body::empty())
            .unwrap();
        let response = serve(&state, &alias(), LoginVars::default(), request).await;
        let body = body_string(response).await;
        assert!(body.contains("You are now logged out."));
    }
}
