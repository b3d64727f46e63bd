//! Alias validation and normalization.
//!
//! The alias is the operator-chosen path segment that stands in for the real
//! login endpoint. It is slug-cased on write and validated against the
//! service's own reserved paths so a saved alias can never shadow a route.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Paths the alias may never collide with: every fixed route this service
/// serves, plus the spellings an operator is most likely to try.
pub const RESERVED_PATHS: &[&str] = &[
    "login",
    "logout",
    "admin",
    "dashboard",
    "settings",
    "health",
    "api",
    "xmlrpc",
    "openapi.json",
];

/// Default alias used when the configuration store has no value yet.
pub const DEFAULT_ALIAS: &str = "myadmin";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AliasError {
    #[error("alias cannot be empty")]
    Empty,
    #[error("alias may only contain letters, digits, and hyphens")]
    InvalidCharacters,
    #[error("'{0}' is a reserved path, choose a different alias")]
    Reserved(String),
}

/// Validated login alias. Construction goes through [`Alias::parse`], so a
/// value of this type is always a non-empty, non-reserved slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Alias(String);

impl Alias {
    /// Normalize and validate operator input.
    ///
    /// Input is slug-cased first (lowercased, spaces and underscores become
    /// hyphens, anything else outside `[a-z0-9-]` is dropped, runs of
    /// hyphens collapse), then checked against the reserved path list.
    ///
    /// # Errors
    /// Returns [`AliasError`] when the input is empty after normalization,
    /// contains no usable characters, or collides with a reserved path.
    pub fn parse(input: &str) -> Result<Self, AliasError> {
        let trimmed = input.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Err(AliasError::Empty);
        }

        let slug = slugify(trimmed);
        if !is_valid_slug(&slug) {
            return Err(AliasError::InvalidCharacters);
        }

        if RESERVED_PATHS.contains(&slug.as_str()) {
            return Err(AliasError::Reserved(slug));
        }

        Ok(Self(slug))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Alias {
    /// The fixed fallback used when the store has no (valid) value.
    fn default() -> Self {
        Self(DEFAULT_ALIAS.to_string())
    }
}

impl fmt::Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Alias {
    type Error = AliasError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Alias> for String {
    fn from(alias: Alias) -> Self {
        alias.0
    }
}

/// Check if the normalized slug is well formed
fn is_valid_slug(slug: &str) -> bool {
    Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").map_or(false, |re| re.is_match(slug))
}

/// Slug-case a path segment: lowercase `[a-z0-9-]` with single hyphens.
fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut last_hyphen = false;

    for ch in input.trim().chars() {
        let mapped = match ch {
            'a'..='z' | '0'..='9' => Some(ch),
            'A'..='Z' => Some(ch.to_ascii_lowercase()),
            ' ' | '_' | '-' => Some('-'),
            _ => None,
        };

        match mapped {
            Some('-') => {
                if !last_hyphen && !slug.is_empty() {
                    slug.push('-');
                    last_hyphen = true;
                }
            }
            Some(ch) => {
                slug.push(ch);
                last_hyphen = false;
            }
            None => {}
        }
    }

    slug.trim_end_matches('-').to_string()
}
