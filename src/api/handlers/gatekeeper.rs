//! Fallback dispatch: the classifier's verdict applied to the wire.
//!
//! Every request that no fixed route claimed lands here. The two paths that
//! matter, the alias and the real login path, are dynamic (the alias can
//! change between requests), so they cannot be registered as routes.

use axum::{
    body::Body,
    extract::{ConnectInfo, Extension, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::debug;

use super::login;
use crate::gate::{
    classify, rewrite, Disposition, GateState, LoginVars, RedirectTarget, RequestDescriptor,
};

pub async fn dispatch(state: Extension<Arc<GateState>>, request: Request) -> Response {
    // One alias snapshot per request; never re-read mid-decision.
    let alias = state.alias();
    let config = state.config();

    let (action, redirect_to) = query_params(&request);
    let authenticated = super::authenticated(&state, request.headers()).await;
    let loopback = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .is_some_and(|info| info.0.ip().is_loopback());

    let descriptor = RequestDescriptor::new(request.uri().path(), config.base_path())
        .with_action(action)
        .with_authenticated(authenticated)
        .with_loopback(loopback);

    let disposition = classify(&descriptor, &alias, config);
    debug!("{} -> {disposition:?}", descriptor.path);

    match disposition {
        Disposition::Blocked(target) => {
            let location = match target {
                RedirectTarget::SiteRoot => rewrite::site_root_url(config),
                RedirectTarget::Alias => rewrite::login_url(config, &alias, None),
                RedirectTarget::Dashboard => rewrite::dashboard_url(config),
            };
            super::found(&location)
        }
        Disposition::AliasHit => {
            // Mimic a direct hit on the real endpoint: blank-seeded vars,
            // then the request's own sub-flow selectors.
            let vars = LoginVars::seeded(descriptor.action_str(), &redirect_to);
            login::serve(&state, &alias, vars, request).await
        }
        Disposition::PassThrough => {
            if descriptor.path == config.login_path() {
                // Allowed action on the real path: let the real handler run
                // with all its native behavior.
                let vars = LoginVars::seeded(descriptor.action_str(), &redirect_to);
                login::serve(&state, &alias, vars, request).await
            } else {
                not_found()
            }
        }
    }
}

fn query_params(request: &Request<Body>) -> (Option<String>, String) {
    let mut action = None;
    let mut redirect_to = String::new();

    if let Some(query) = request.uri().query() {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "action" => action = Some(value.into_owned()),
                "redirect_to" => redirect_to = value.into_owned(),
                _ => {}
            }
        }
    }

    (action, redirect_to)
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::GateConfig;
    use crate::session::DenyAll;
    use crate::store::MemoryStore;
    use url::Url;

    // The fallback handler runs on a multi-threaded runtime, so its future
    // must stay Send; holding a `&Request<Body>` across an await breaks that.
    #[test]
    fn dispatch_future_is_send() {
        fn require_send<F: std::future::Future + Send>(_: &F) {}

        let config = GateConfig::new(Url::parse("http://example.com").unwrap());
        let state = Arc::new(GateState::new(
            config,
            Arc::new(MemoryStore::new()),
            Arc::new(DenyAll),
        ));
        let request = axum::http::Request::builder()
            .uri("/myadmin?action=logout")
            .body(Body::empty())
            .unwrap();

        let future = dispatch(Extension(state), request);
        require_send(&future);
    }
}
