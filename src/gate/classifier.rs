//! Three-way request classification.

use super::{Alias, BlockedTarget, GateConfig, RequestDescriptor};

/// Destination of a blocked-redirect, resolved to a URL by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTarget {
    SiteRoot,
    Alias,
    Dashboard,
}

/// Outcome of classifying one request. Computed, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Request is unrelated, or an allowed login sub-flow: let it run.
    PassThrough,
    /// Request hit the alias: dispatch to the login handler with
    /// blank-seeded variables.
    AliasHit,
    /// Request directly targeted the real login path without a valid
    /// bypass: redirect and stop.
    Blocked(RedirectTarget),
}

/// Classify a request against the current alias.
///
/// Pure: same inputs, same disposition. Path comparison is case-sensitive
/// and trailing-slash differences were already erased by
/// [`super::request::normalize_path`].
#[must_use]
pub fn classify(
    descriptor: &RequestDescriptor,
    alias: &Alias,
    config: &GateConfig,
) -> Disposition {
    if descriptor.path == config.login_path() {
        // Same-process dispatch is never blocked.
        if descriptor.internal {
            return Disposition::PassThrough;
        }

        // Logout, password-reset, and friends keep their native behavior.
        if config.action_allowed(descriptor.action_str()) {
            return Disposition::PassThrough;
        }

        // A live session asking for the login form goes straight to the
        // dashboard instead of seeing the form again.
        if descriptor.authenticated && descriptor.action.is_none() {
            return Disposition::Blocked(RedirectTarget::Dashboard);
        }

        if config.loopback_bypass() && descriptor.loopback {
            return Disposition::PassThrough;
        }

        let target = match config.blocked_target() {
            BlockedTarget::SiteRoot => RedirectTarget::SiteRoot,
            BlockedTarget::Alias => RedirectTarget::Alias,
        };
        return Disposition::Blocked(target);
    }

    if descriptor.path == alias.as_str() {
        // The alias mimics the real endpoint, including the logged-in
        // shortcut to the dashboard.
        if descriptor.authenticated && descriptor.action.is_none() {
            return Disposition::Blocked(RedirectTarget::Dashboard);
        }
        return Disposition::AliasHit;
    }

    Disposition::PassThrough
}
