//! Per-request view of the attributes the classifier cares about.

/// Normalized description of one inbound request.
///
/// Built once per request from the raw URI and session lookup; the classifier
/// never touches the transport types directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    /// Request path with the query string stripped, surrounding slashes
    /// trimmed, and the site base path removed. Empty string is the site root.
    pub path: String,
    /// Login sub-flow selector (`action` query parameter), if present.
    pub action: Option<String>,
    /// Whether the caller already holds a valid session.
    pub authenticated: bool,
    /// Whether the peer address is a loopback address.
    pub loopback: bool,
    /// Whether this is a same-process internal dispatch. Internal dispatches
    /// are never blocked.
    pub internal: bool,
}

impl RequestDescriptor {
    #[must_use]
    pub fn new(raw_path: &str, base_path: &str) -> Self {
        Self {
            path: normalize_path(raw_path, base_path),
            action: None,
            authenticated: false,
            loopback: false,
            internal: false,
        }
    }

    #[must_use]
    pub fn with_action(mut self, action: Option<String>) -> Self {
        // An empty `action=` is the same as no action at all.
        self.action = action.filter(|a| !a.is_empty());
        self
    }

    #[must_use]
    pub fn with_authenticated(mut self, authenticated: bool) -> Self {
        self.authenticated = authenticated;
        self
    }

    #[must_use]
    pub fn with_loopback(mut self, loopback: bool) -> Self {
        self.loopback = loopback;
        self
    }

    #[must_use]
    pub fn with_internal(mut self, internal: bool) -> Self {
        self.internal = internal;
        self
    }

    /// Action as a plain `&str`, empty when absent.
    #[must_use]
    pub fn action_str(&self) -> &str {
        self.action.as_deref().unwrap_or("")
    }
}

/// Normalize a raw request path for classification.
///
/// Strips the query string, trims leading and trailing slashes (so `/login`
/// and `/login/` classify identically), and removes the site base path prefix
/// for installs served from a sub-directory. Matching stays case-sensitive.
#[must_use]
pub fn normalize_path(raw_path: &str, base_path: &str) -> String {
    let without_query = raw_path.split(['?', '#']).next().unwrap_or("");
    let mut path = without_query.trim_matches('/');

    let base = base_path.trim_matches('/');
    if !base.is_empty() {
        if let Some(rest) = path.strip_prefix(base) {
            // Only a whole-segment match counts: /blog-x must not lose /blog.
            if rest.is_empty() {
                path = "";
            } else if let Some(rest) = rest.strip_prefix('/') {
                path = rest.trim_matches('/');
            }
        }
    }

    path.to_string()
}
