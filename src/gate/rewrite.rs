//! Outbound URL rewriting.
//!
//! Any URL the application renders that points at the real login path is
//! rewritten to the alias form. Rewriting only ever matches the literal
//! real-login segment, never the alias, so applying it twice is a no-op.

use url::Url;

use super::{Alias, GateConfig};

/// Absolute URL for a path under the site root (base path included).
#[must_use]
pub fn home_url(config: &GateConfig, path: &str) -> String {
    let mut url = config.site_url().clone();
    let trimmed = path.trim_matches('/');

    let full = match (config.base_path().is_empty(), trimmed.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{trimmed}"),
        (false, true) => format!("/{}/", config.base_path()),
        (false, false) => format!("/{}/{trimmed}", config.base_path()),
    };

    url.set_path(&full);
    url.set_query(None);
    url.set_fragment(None);
    url.to_string()
}

/// Absolute URL of the site root.
#[must_use]
pub fn site_root_url(config: &GateConfig) -> String {
    home_url(config, "")
}

/// Absolute URL of the authenticated dashboard.
#[must_use]
pub fn dashboard_url(config: &GateConfig) -> String {
    home_url(config, config.dashboard_path())
}

/// Canonical login URL: the aliased path, with the post-login destination
/// appended URL-encoded when one was supplied.
#[must_use]
pub fn login_url(config: &GateConfig, alias: &Alias, redirect_to: Option<&str>) -> String {
    let base = home_url(config, alias.as_str());
    match redirect_to.filter(|r| !r.is_empty()) {
        Some(redirect) => {
            // Parsing our own output; fall back to the bare URL if it fails.
            match Url::parse(&base) {
                Ok(mut url) => {
                    url.query_pairs_mut().append_pair("redirect_to", redirect);
                    url.to_string()
                }
                Err(_) => base,
            }
        }
        None => base,
    }
}

/// Rewrite a URL whose path references the real login endpoint to the alias
/// form, preserving scheme, host, query, and fragment. URLs that do not
/// reference the real login path come back unchanged, byte for byte.
#[must_use]
pub fn rewrite_login_url(raw: &str, config: &GateConfig, alias: &Alias) -> String {
    match Url::parse(raw) {
        Ok(mut url) => match rewrite_path(url.path(), config.login_path(), alias.as_str()) {
            Some(path) => {
                url.set_path(&path);
                url.to_string()
            }
            None => raw.to_string(),
        },
        // Relative URL: rewrite the path part and keep the rest verbatim.
        Err(_) => {
            let split = raw
                .find(['?', '#'])
                .map_or((raw, ""), |idx| raw.split_at(idx));
            match rewrite_path(split.0, config.login_path(), alias.as_str()) {
                Some(path) => format!("{path}{}", split.1),
                None => raw.to_string(),
            }
        }
    }
}

/// Sanitize a post-login destination.
///
/// Destinations that are empty or resolve back into the login alias collapse
/// to the dashboard URL, preventing a redirect loop into the login form
/// right after a successful login.
#[must_use]
pub fn sanitize_redirect(config: &GateConfig, alias: &Alias, redirect_to: &str) -> String {
    if redirect_to.is_empty() {
        return dashboard_url(config);
    }

    // Absolute spelling of the alias URL. Prefix alone is not enough: the
    // next byte must end the path segment, or a lookalike such as
    // "/secure-area-2" would be eaten too.
    let alias_url = login_url(config, alias, None);
    if redirect_to == alias_url
        || redirect_to
            .strip_prefix(&alias_url)
            .is_some_and(|rest| rest.starts_with(['/', '?', '#']))
    {
        return dashboard_url(config);
    }

    // Relative spelling of the alias path, e.g. "/secure-area?foo".
    let alias_path = relative_path(config, alias.as_str());
    if redirect_to == alias_path
        || redirect_to
            .strip_prefix(&alias_path)
            .is_some_and(|rest| rest.starts_with(['/', '?', '#']))
    {
        return dashboard_url(config);
    }

    redirect_to.to_string()
}

/// Replace the first path segment equal to `login_path` with `alias`.
/// Returns `None` when nothing matched.
fn rewrite_path(path: &str, login_path: &str, alias: &str) -> Option<String> {
    let mut replaced = false;
    let segments: Vec<&str> = path
        .split('/')
        .map(|segment| {
            if !replaced && segment == login_path {
                replaced = true;
                alias
            } else {
                segment
            }
        })
        .collect();

    if replaced {
        Some(segments.join("/"))
    } else {
        None
    }
}

fn relative_path(config: &GateConfig, path: &str) -> String {
    if config.base_path().is_empty() {
        format!("/{path}")
    } else {
        format!("/{}/{path}", config.base_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GateConfig {
        GateConfig::new(Url::parse("http://example.com").unwrap())
    }

    fn sub_config() -> GateConfig {
        GateConfig::new(Url::parse("http://example.com/blog").unwrap())
    }

    fn alias() -> Alias {
        Alias::parse("secure-area").unwrap()
    }

    #[test]
    fn home_url_variants() {
        assert_eq!(home_url(&config(), ""), "http://example.com/");
        assert_eq!(home_url(&config(), "login"), "http://example.com/login");
        assert_eq!(home_url(&sub_config(), ""), "http://example.com/blog/");
        assert_eq!(
            home_url(&sub_config(), "/login/"),
            "http://example.com/blog/login"
        );
    }

    #[test]
    fn login_url_without_redirect() {
        assert_eq!(
            login_url(&config(), &alias(), None),
            "http://example.com/secure-area"
        );
    }

    #[test]
    fn login_url_encodes_redirect() {
        assert_eq!(
            login_url(&config(), &alias(), Some("/dashboard?tab=users")),
            "http://example.com/secure-area?redirect_to=%2Fdashboard%3Ftab%3Dusers"
        );
        // Empty destinations are not appended.
        assert_eq!(
            login_url(&config(), &alias(), Some("")),
            "http://example.com/secure-area"
        );
    }

    #[test]
    fn rewrite_replaces_login_path() {
        assert_eq!(
            rewrite_login_url("http://example.com/login", &config(), &alias()),
            "http://example.com/secure-area"
        );
    }

    #[test]
    fn rewrite_preserves_query_and_fragment() {
        assert_eq!(
            rewrite_login_url(
                "https://example.com/login?action=lostpassword#top",
                &config(),
                &alias()
            ),
            "https://example.com/secure-area?action=lostpassword#top"
        );
    }

    #[test]
    fn rewrite_handles_relative_urls() {
        assert_eq!(
            rewrite_login_url("/login?action=rp", &config(), &alias()),
            "/secure-area?action=rp"
        );
        assert_eq!(
            rewrite_login_url("/blog/login", &sub_config(), &alias()),
            "/blog/secure-area"
        );
    }

    #[test]
    fn rewrite_leaves_unrelated_urls_alone() {
        for raw in [
            "http://example.com/",
            "http://example.com/logint",
            "/about?from=login-page",
            "http://example.com/secure-area",
        ] {
            assert_eq!(rewrite_login_url(raw, &config(), &alias()), raw);
        }
    }

    #[test]
    fn rewrite_is_idempotent() {
        let once = rewrite_login_url("http://example.com/login?a=1", &config(), &alias());
        let twice = rewrite_login_url(&once, &config(), &alias());
        assert_eq!(once, twice);
    }

    #[test]
    fn sanitize_keeps_ordinary_destinations() {
        assert_eq!(
            sanitize_redirect(&config(), &alias(), "/dashboard"),
            "/dashboard"
        );
        assert_eq!(
            sanitize_redirect(&config(), &alias(), "http://example.com/about"),
            "http://example.com/about"
        );
    }

    #[test]
    fn sanitize_collapses_alias_destinations_to_dashboard() {
        let dashboard = dashboard_url(&config());
        for redirect in [
            "http://example.com/secure-area",
            "http://example.com/secure-area?redirect_to=%2F",
            "/secure-area",
            "/secure-area?loggedout=true",
            "/secure-area/deeper",
        ] {
            assert_eq!(
                sanitize_redirect(&config(), &alias(), redirect),
                dashboard,
                "redirect {redirect}"
            );
        }
    }

    #[test]
    fn sanitize_does_not_eat_lookalike_paths() {
        assert_eq!(
            sanitize_redirect(&config(), &alias(), "/secure-area-2"),
            "/secure-area-2"
        );
        // The absolute spelling gets the same segment-boundary treatment.
        assert_eq!(
            sanitize_redirect(&config(), &alias(), "http://example.com/secure-area-2"),
            "http://example.com/secure-area-2"
        );
        assert_eq!(
            sanitize_redirect(&config(), &alias(), "http://example.com/secure-area?next=1"),
            "http://example.com/dashboard"
        );
    }

    #[test]
    fn sanitize_empty_goes_to_dashboard() {
        assert_eq!(
            sanitize_redirect(&config(), &alias(), ""),
            dashboard_url(&config())
        );
    }

    #[test]
    fn sanitize_honors_base_path() {
        assert_eq!(
            sanitize_redirect(&sub_config(), &alias(), "/blog/secure-area"),
            dashboard_url(&sub_config())
        );
    }
}
