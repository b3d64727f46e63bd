//! The decision core: path classification, URL rewriting, and the two fixed
//! access-control filters.
//!
//! Everything in this module is pure and request-scoped. The only persistent
//! value is the alias, owned by the configuration store and read once per
//! request through [`GateState::alias`].

use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use url::Url;

use crate::session::{CredentialVerifier, SessionStore};
use crate::store::ConfigStore;

pub mod alias;
pub mod classifier;
pub mod filters;
pub mod request;
pub mod rewrite;

pub use alias::{Alias, AliasError, DEFAULT_ALIAS, RESERVED_PATHS};
pub use classifier::{classify, Disposition, RedirectTarget};
pub use request::RequestDescriptor;

/// Configuration store key holding the alias.
pub const ALIAS_KEY: &str = "login_alias";

/// Fixed path of the real administrative login endpoint.
pub const DEFAULT_LOGIN_PATH: &str = "login";

const DEFAULT_DASHBOARD_PATH: &str = "dashboard";
const DEFAULT_SESSION_TTL_SECONDS: u64 = 12 * 60 * 60;

/// Actions on the real login path that must keep working when direct access
/// is otherwise blocked: logout, the lost-password request, both halves of
/// the reset flow, and the post-password unlock.
pub const DEFAULT_ALLOWED_ACTIONS: &[&str] =
    &["logout", "lostpassword", "rp", "resetpass", "postpass"];

/// Where a blocked request is sent. The shipped default is the site root;
/// redirecting to the alias itself is the alternate design some deployments
/// prefer because it keeps the login reachable after a bookmark goes stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockedTarget {
    #[default]
    SiteRoot,
    Alias,
}

impl std::str::FromStr for BlockedTarget {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "root" | "site-root" => Ok(Self::SiteRoot),
            "alias" => Ok(Self::Alias),
            other => Err(format!("invalid blocked-redirect target: {other}")),
        }
    }
}

/// Static gate configuration, fixed for the lifetime of the process.
///
/// The alias is deliberately *not* in here: it changes at runtime through the
/// settings surface and lives in the configuration store.
#[derive(Debug, Clone)]
pub struct GateConfig {
    site_url: Url,
    base_path: String,
    login_path: String,
    dashboard_path: String,
    allowed_actions: Vec<String>,
    loopback_bypass: bool,
    blocked_target: BlockedTarget,
    session_ttl_seconds: u64,
    cookie_secure: bool,
}

impl GateConfig {
    #[must_use]
    pub fn new(site_url: Url) -> Self {
        let base_path = site_url.path().trim_matches('/').to_string();
        // Only mark cookies secure when the site is served over HTTPS.
        let cookie_secure = site_url.scheme() == "https";

        Self {
            site_url,
            base_path,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            dashboard_path: DEFAULT_DASHBOARD_PATH.to_string(),
            allowed_actions: DEFAULT_ALLOWED_ACTIONS
                .iter()
                .map(ToString::to_string)
                .collect(),
            loopback_bypass: false,
            blocked_target: BlockedTarget::default(),
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            cookie_secure,
        }
    }

    #[must_use]
    pub fn with_login_path(mut self, login_path: String) -> Self {
        self.login_path = login_path.trim_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_allowed_actions(mut self, actions: Vec<String>) -> Self {
        self.allowed_actions = actions;
        self
    }

    #[must_use]
    pub fn with_loopback_bypass(mut self, enabled: bool) -> Self {
        self.loopback_bypass = enabled;
        self
    }

    #[must_use]
    pub fn with_blocked_target(mut self, target: BlockedTarget) -> Self {
        self.blocked_target = target;
        self
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: u64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn site_url(&self) -> &Url {
        &self.site_url
    }

    /// Site base path for installs served from a sub-directory, without
    /// surrounding slashes. Empty for root installs.
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    #[must_use]
    pub fn dashboard_path(&self) -> &str {
        &self.dashboard_path
    }

    #[must_use]
    pub fn action_allowed(&self, action: &str) -> bool {
        !action.is_empty() && self.allowed_actions.iter().any(|a| a == action)
    }

    #[must_use]
    pub fn loopback_bypass(&self) -> bool {
        self.loopback_bypass
    }

    #[must_use]
    pub fn blocked_target(&self) -> BlockedTarget {
        self.blocked_target
    }

    /// Whether a candidate alias would shadow the real login path.
    ///
    /// The classifier matches the login path before the alias, so such an
    /// alias would 302 every hit and leave the login form unreachable. The
    /// static reserved list cannot cover this: the login path is per-deploy.
    #[must_use]
    pub fn alias_shadows_login(&self, alias: &Alias) -> bool {
        alias.as_str() == self.login_path
    }

    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_seconds)
    }

    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }
}

/// Request-scoped variables seeded before the login handler runs.
///
/// On an alias hit these start blank, exactly as if the real endpoint had
/// been hit directly, and only then pick up the request's own `action` and
/// `redirect_to`. Ownership moves into the handler at the call site.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginVars {
    pub user_login: String,
    pub error: String,
    pub interim_login: bool,
    pub action: String,
    pub redirect_to: String,
}

impl LoginVars {
    /// Blank defaults plus the sub-flow selectors from the current request.
    #[must_use]
    pub fn seeded(action: &str, redirect_to: &str) -> Self {
        Self {
            action: action.to_string(),
            redirect_to: redirect_to.to_string(),
            ..Self::default()
        }
    }
}

/// Shared gate state: static config plus the collaborators the decisions
/// consult. Cloned into every request via an `Arc`.
pub struct GateState {
    config: GateConfig,
    store: Arc<dyn ConfigStore>,
    sessions: SessionStore,
    verifier: Arc<dyn CredentialVerifier>,
}

impl GateState {
    #[must_use]
    pub fn new(
        config: GateConfig,
        store: Arc<dyn ConfigStore>,
        verifier: Arc<dyn CredentialVerifier>,
    ) -> Self {
        let sessions = SessionStore::new(config.session_ttl());
        Self {
            config,
            store,
            sessions,
            verifier,
        }
    }

    /// Current alias snapshot. Read once per request; a stored value that no
    /// longer validates degrades to the default instead of wedging logins.
    #[must_use]
    pub fn alias(&self) -> Alias {
        let raw = self.store.get(ALIAS_KEY, DEFAULT_ALIAS);
        match Alias::parse(&raw) {
            Ok(alias) if self.config.alias_shadows_login(&alias) => {
                warn!("Stored alias {raw:?} shadows the login path, using default");
                Alias::default()
            }
            Ok(alias) => alias,
            Err(err) => {
                warn!("Stored alias {raw:?} is invalid ({err}), using default");
                Alias::default()
            }
        }
    }

    /// Persist a validated alias through the configuration store.
    ///
    /// # Errors
    /// Returns an error when the store cannot be written; the previous value
    /// stays in effect.
    pub fn persist_alias(&self, alias: &Alias) -> anyhow::Result<()> {
        self.store.set(ALIAS_KEY, alias.as_str())
    }

    #[must_use]
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    #[must_use]
    pub fn verifier(&self) -> &dyn CredentialVerifier {
        self.verifier.as_ref()
    }
}

impl std::fmt::Debug for GateState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GateState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn state() -> GateState {
        let config = GateConfig::new(Url::parse("http://localhost:8080").unwrap());
        GateState::new(
            config,
            Arc::new(MemoryStore::new()),
            Arc::new(crate::session::DenyAll),
        )
    }

    #[test]
    fn alias_falls_back_to_default() {
        let state = state();
        assert_eq!(state.alias().as_str(), DEFAULT_ALIAS);
    }

    #[test]
    fn alias_reads_persisted_value() {
        let state = state();
        let alias = Alias::parse("secure-area").unwrap();
        state.persist_alias(&alias).unwrap();
        assert_eq!(state.alias(), alias);
    }

    #[test]
    fn invalid_stored_alias_degrades_to_default() {
        let state = state();
        // Write around the validation to simulate a corrupted store.
        state.store.set(ALIAS_KEY, "login").unwrap();
        assert_eq!(state.alias().as_str(), DEFAULT_ALIAS);
    }

    #[test]
    fn alias_shadowing_a_custom_login_path() {
        let config = GateConfig::new(Url::parse("http://localhost:8080").unwrap())
            .with_login_path("secret".to_string());
        let shadow = Alias::parse("secret").unwrap();
        assert!(config.alias_shadows_login(&shadow));
        assert!(!config.alias_shadows_login(&Alias::default()));

        // A stored value that shadows the login path degrades to the default
        // instead of leaving the login form unreachable.
        let state = GateState::new(
            config,
            Arc::new(MemoryStore::new()),
            Arc::new(crate::session::DenyAll),
        );
        state.store.set(ALIAS_KEY, "secret").unwrap();
        assert_eq!(state.alias().as_str(), DEFAULT_ALIAS);
    }

    #[test]
    fn base_path_derived_from_site_url() {
        let config = GateConfig::new(Url::parse("http://example.com/blog/").unwrap());
        assert_eq!(config.base_path(), "blog");
        assert!(!config.cookie_secure());

        let config = GateConfig::new(Url::parse("https://example.com").unwrap());
        assert_eq!(config.base_path(), "");
        assert!(config.cookie_secure());
    }

    #[test]
    fn action_allow_list() {
        let config = GateConfig::new(Url::parse("http://localhost:8080").unwrap());
        for action in DEFAULT_ALLOWED_ACTIONS {
            assert!(config.action_allowed(action));
        }
        assert!(!config.action_allowed(""));
        assert!(!config.action_allowed("register"));
    }

    #[test]
    fn blocked_target_parses() {
        assert_eq!("root".parse::<BlockedTarget>(), Ok(BlockedTarget::SiteRoot));
        assert_eq!("alias".parse::<BlockedTarget>(), Ok(BlockedTarget::Alias));
        assert!("elsewhere".parse::<BlockedTarget>().is_err());
    }

    #[test]
    fn login_vars_seed_blank() {
        let vars = LoginVars::seeded("logout", "/dashboard");
        assert_eq!(vars.user_login, "");
        assert_eq!(vars.error, "");
        assert!(!vars.interim_login);
        assert_eq!(vars.action, "logout");
        assert_eq!(vars.redirect_to, "/dashboard");
    }
}
