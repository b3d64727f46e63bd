use crate::api;
use crate::cli::actions::Action;
use crate::gate::{GateConfig, GateState};
use crate::session::{CredentialVerifier, DenyAll, StaticCredentials};
use crate::store::{ConfigStore, FileStore, MemoryStore};
use anyhow::Result;
use std::sync::Arc;
use tracing::warn;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    let Action::Server { port, options } = action;

    let config = GateConfig::new(options.site_url)
        .with_login_path(options.login_path)
        .with_allowed_actions(options.allowed_actions)
        .with_loopback_bypass(options.loopback_bypass)
        .with_blocked_target(options.blocked_target)
        .with_session_ttl_seconds(options.session_ttl_seconds);

    let store: Arc<dyn ConfigStore> = match options.state_file {
        Some(path) => Arc::new(FileStore::open(path)?),
        None => Arc::new(MemoryStore::new()),
    };

    let verifier: Arc<dyn CredentialVerifier> =
        match (options.admin_user, options.admin_password) {
            (Some(user), Some(password)) if !password.is_empty() => {
                Arc::new(StaticCredentials::new(user, password))
            }
            _ => {
                warn!("No admin credentials configured, all sign-in attempts will be rejected");
                Arc::new(DenyAll)
            }
        };

    let state = GateState::new(config, store, verifier);

    api::new(port, Arc::new(state)).await
}
