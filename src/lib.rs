//! # Loginveil
//!
//! `loginveil` conceals a well-known administrative login endpoint behind an
//! operator-chosen alias. Direct hits on the real login path are blocked,
//! the alias serves the login flow as if it were the real endpoint, and every
//! outbound login URL is rewritten so the rest of the application never leaks
//! the real path.
//!
//! ## Request pipeline
//!
//! Every inbound request runs through a short, statically ordered pipeline:
//!
//! 1. **Access-control filters**: XML-RPC is always reported disabled, and
//!    the read/write API requires an authenticated session.
//! 2. **Path classifier**: resolves the request to one of three
//!    dispositions: pass through, alias hit, or blocked-with-redirect.
//! 3. **Dispatch**: alias hits invoke the login handler with a
//!    blank-seeded [`gate::LoginVars`]; blocked requests get a `302` and
//!    processing stops.
//!
//! ## Alias lifecycle
//!
//! The alias is a slug (`[a-z0-9-]`) read once per request from the
//! configuration store with a fixed fallback default. It is written only
//! through the settings endpoint, never mutated mid-request, and values that
//! collide with reserved service paths are rejected before persistence.
//!
//! The decision core lives in [`gate`] and is pure: given an alias, a request
//! descriptor, and the session state, every decision is a value. The axum
//! wiring in [`api`] is the only place that touches the network.

pub mod api;
pub mod cli;
pub mod gate;
pub mod session;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
