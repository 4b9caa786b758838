//! GitHub token resolution for splitrel.
//!
//! Tokens are resolved, in order, from:
//! - an explicit value (the `--token` flag)
//! - the `GITHUB_TOKEN` environment variable
//! - the `GH_TOKEN` environment variable
//!
//! # Example
//!
//! ```
//! use splitrel_auth::resolve_token;
//!
//! let auth = resolve_token(Some("ghp_example"));
//! assert!(auth.detected);
//! ```

use std::env;

use anyhow::{Result, bail};

/// Primary environment variable for the GitHub token
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Fallback environment variable used by the `gh` CLI
pub const GH_TOKEN_ENV: &str = "GH_TOKEN";

/// Authentication information
#[derive(Debug, Clone)]
pub struct AuthInfo {
    /// The resolved token (if found)
    pub token: Option<String>,
    /// Source of the token
    pub source: TokenSource,
    /// Whether a token was found
    pub detected: bool,
}

impl Default for AuthInfo {
    fn default() -> Self {
        Self {
            token: None,
            source: TokenSource::None,
            detected: false,
        }
    }
}

/// Source of the authentication token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// No token found
    None,
    /// Passed explicitly (`--token`)
    Explicit,
    /// From `GITHUB_TOKEN`
    EnvGithub,
    /// From `GH_TOKEN`
    EnvGh,
}

impl std::fmt::Display for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenSource::None => write!(f, "none"),
            TokenSource::Explicit => write!(f, "--token"),
            TokenSource::EnvGithub => write!(f, "GITHUB_TOKEN"),
            TokenSource::EnvGh => write!(f, "GH_TOKEN"),
        }
    }
}

/// Resolve the GitHub token.
///
/// Blank values are ignored at every step, so an empty `--token ""` falls
/// through to the environment.
pub fn resolve_token(explicit: Option<&str>) -> AuthInfo {
    if let Some(token) = explicit.map(str::trim)
        && !token.is_empty()
    {
        return found(token, TokenSource::Explicit);
    }

    for (var, source) in [
        (GITHUB_TOKEN_ENV, TokenSource::EnvGithub),
        (GH_TOKEN_ENV, TokenSource::EnvGh),
    ] {
        if let Ok(token) = env::var(var) {
            let token = token.trim();
            if !token.is_empty() {
                return found(token, source);
            }
        }
    }

    AuthInfo::default()
}

fn found(token: &str, source: TokenSource) -> AuthInfo {
    AuthInfo {
        token: Some(token.to_string()),
        source,
        detected: true,
    }
}

/// Resolve the token or fail before any network call is made.
pub fn require_token(explicit: Option<&str>) -> Result<String> {
    match resolve_token(explicit).token {
        Some(token) => Ok(token),
        None => bail!("no github token provided (via --token, {GITHUB_TOKEN_ENV} or {GH_TOKEN_ENV})"),
    }
}

/// Mask a token for safe display (show first 4 and last 4 chars).
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}****{tail}")
}
