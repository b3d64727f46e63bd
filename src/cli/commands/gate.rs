//! Gate-specific command-line arguments.

use anyhow::{Context, Result};
use clap::{builder::ValueParser, Arg, ArgAction, Command};
use url::Url;

use crate::gate::{BlockedTarget, DEFAULT_ALLOWED_ACTIONS, DEFAULT_LOGIN_PATH};

pub const ARG_SITE_URL: &str = "site-url";
pub const ARG_LOGIN_PATH: &str = "login-path";
pub const ARG_STATE_FILE: &str = "state-file";
pub const ARG_ALLOWED_ACTIONS: &str = "allowed-actions";
pub const ARG_LOOPBACK_BYPASS: &str = "loopback-bypass";
pub const ARG_BLOCKED_REDIRECT: &str = "blocked-redirect";
pub const ARG_SESSION_TTL: &str = "session-ttl";
pub const ARG_ADMIN_USER: &str = "admin-user";
pub const ARG_ADMIN_PASSWORD: &str = "admin-password";

fn validator_site_url() -> ValueParser {
    ValueParser::from(|value: &str| -> std::result::Result<Url, String> {
        let url = Url::parse(value).map_err(|err| format!("invalid site URL: {err}"))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err("site URL must be http or https".to_string());
        }
        if url.host_str().is_none() {
            return Err("site URL must include a host".to_string());
        }
        Ok(url)
    })
}

fn validator_blocked_target() -> ValueParser {
    ValueParser::from(|value: &str| value.parse::<BlockedTarget>())
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SITE_URL)
                .long(ARG_SITE_URL)
                .help("Public base URL of the site, including any sub-directory path")
                .default_value("http://localhost:8080")
                .env("LOGINVEIL_SITE_URL")
                .value_parser(validator_site_url()),
        )
        .arg(
            Arg::new(ARG_LOGIN_PATH)
                .long(ARG_LOGIN_PATH)
                .help("Fixed path of the real login endpoint being concealed")
                .default_value(DEFAULT_LOGIN_PATH)
                .env("LOGINVEIL_LOGIN_PATH"),
        )
        .arg(
            Arg::new(ARG_STATE_FILE)
                .long(ARG_STATE_FILE)
                .help("JSON file persisting the alias; omit for in-memory state")
                .env("LOGINVEIL_STATE_FILE"),
        )
        .arg(
            Arg::new(ARG_ALLOWED_ACTIONS)
                .long(ARG_ALLOWED_ACTIONS)
                .help("Login actions that stay reachable on the real path")
                .value_delimiter(',')
                .default_values(DEFAULT_ALLOWED_ACTIONS)
                .env("LOGINVEIL_ALLOWED_ACTIONS"),
        )
        .arg(
            Arg::new(ARG_LOOPBACK_BYPASS)
                .long(ARG_LOOPBACK_BYPASS)
                .help("Let loopback peers reach the real login path (local development)")
                .env("LOGINVEIL_LOOPBACK_BYPASS")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(ARG_BLOCKED_REDIRECT)
                .long(ARG_BLOCKED_REDIRECT)
                .help("Where blocked requests are sent: root or alias")
                .default_value("root")
                .env("LOGINVEIL_BLOCKED_REDIRECT")
                .value_parser(validator_blocked_target()),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL)
                .long(ARG_SESSION_TTL)
                .help("Session lifetime in seconds")
                .default_value("43200")
                .env("LOGINVEIL_SESSION_TTL")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_ADMIN_USER)
                .long(ARG_ADMIN_USER)
                .help("Operator username for the demo credential verifier")
                .env("LOGINVEIL_ADMIN_USER"),
        )
        .arg(
            Arg::new(ARG_ADMIN_PASSWORD)
                .long(ARG_ADMIN_PASSWORD)
                .help("Operator password for the demo credential verifier")
                .env("LOGINVEIL_ADMIN_PASSWORD"),
        )
}

#[derive(Debug)]
pub struct Options {
    pub site_url: Url,
    pub login_path: String,
    pub state_file: Option<String>,
    pub allowed_actions: Vec<String>,
    pub loopback_bypass: bool,
    pub blocked_target: BlockedTarget,
    pub session_ttl_seconds: u64,
    pub admin_user: Option<String>,
    pub admin_password: Option<String>,
}

impl Options {
    /// Collect the gate options from validated matches.
    ///
    /// # Errors
    /// Returns an error when a defaulted argument is somehow absent.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        Ok(Self {
            site_url: matches
                .get_one::<Url>(ARG_SITE_URL)
                .cloned()
                .context("missing required argument: --site-url")?,
            login_path: matches
                .get_one::<String>(ARG_LOGIN_PATH)
                .cloned()
                .context("missing required argument: --login-path")?,
            state_file: matches.get_one::<String>(ARG_STATE_FILE).cloned(),
            allowed_actions: matches
                .get_many::<String>(ARG_ALLOWED_ACTIONS)
                .map(|values| values.cloned().collect())
                .unwrap_or_default(),
            loopback_bypass: matches.get_flag(ARG_LOOPBACK_BYPASS),
            blocked_target: matches
                .get_one::<BlockedTarget>(ARG_BLOCKED_REDIRECT)
                .copied()
                .unwrap_or_default(),
            session_ttl_seconds: matches
                .get_one::<u64>(ARG_SESSION_TTL)
                .copied()
                .unwrap_or(43200),
            admin_user: matches.get_one::<String>(ARG_ADMIN_USER).cloned(),
            admin_password: matches.get_one::<String>(ARG_ADMIN_PASSWORD).cloned(),
        })
    }
}
