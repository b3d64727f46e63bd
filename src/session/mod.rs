//! Session and credential collaborators.
//!
//! The gate only ever asks two questions here: "does this request carry a
//! valid session?" and "where is the dashboard?". Credential verification is
//! deliberately a seam: this layer performs no cryptography and defers to
//! whatever the host considers a credential check.

use axum::http::{
    header::{InvalidHeaderValue, AUTHORIZATION, COOKIE},
    HeaderMap, HeaderValue,
};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

pub const SESSION_COOKIE_NAME: &str = "loginveil_session";

/// An active session for one authenticated operator.
#[derive(Debug, Clone)]
pub struct Session {
    pub username: String,
    created_at: Instant,
}

/// In-memory session map with a fixed TTL.
///
/// Tokens are opaque and request-scoped lookups take a read lock only;
/// expired entries are dropped lazily on access.
#[derive(Debug)]
pub struct SessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Create a session and return the raw token for the cookie.
    pub async fn create(&self, username: &str) -> String {
        let token = Uuid::new_v4().simple().to_string();
        let session = Session {
            username: username.to_string(),
            created_at: Instant::now(),
        };
        self.sessions
            .write()
            .await
            .insert(token.clone(), session);
        token
    }

    /// Resolve the request headers into an active session, if any.
    ///
    /// Accepts the session cookie or an `Authorization: Bearer` token.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Option<Session> {
        let token = extract_session_token(headers)?;

        {
            let sessions = self.sessions.read().await;
            match sessions.get(&token) {
                Some(session) if session.created_at.elapsed() < self.ttl => {
                    return Some(session.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        // Token exists but expired: drop it.
        self.sessions.write().await.remove(&token);
        None
    }

    /// Destroy the session referenced by the request, if any.
    pub async fn destroy(&self, headers: &HeaderMap) {
        if let Some(token) = extract_session_token(headers) {
            self.sessions.write().await.remove(&token);
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Credential verification seam.
///
/// No hashing or key exchange happens in this crate: implementations are
/// expected to call into the host's existing credential-verification
/// component.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// Rejects everything. Default when no operator credential is configured, so
/// a misconfigured deployment fails closed.
#[derive(Debug, Default)]
pub struct DenyAll;

impl CredentialVerifier for DenyAll {
    fn verify(&self, _username: &str, _password: &str) -> bool {
        false
    }
}

/// Single operator credential taken from flags or environment. Demo wiring
/// for the standalone binary; embedders supply their own verifier.
#[derive(Debug)]
pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    #[must_use]
    pub fn new(username: String, password: String) -> Self {
        Self { username, password }
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        !self.password.is_empty() && username == self.username && password == self.password
    }
}

/// Build the `HttpOnly` session cookie.
///
/// # Errors
/// Returns an error when the token produces an invalid header value.
pub fn session_cookie(
    token: &str,
    ttl: Duration,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let max_age = ttl.as_secs();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Cookie that clears the session on the client.
///
/// # Errors
/// Returns an error when the header value cannot be built.
pub fn clear_session_cookie(secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = extract_bearer_token(headers) {
        return Some(token);
    }
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == SESSION_COOKIE_NAME {
            return Some(val.to_string());
        }
    }
    None
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.trim().strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
