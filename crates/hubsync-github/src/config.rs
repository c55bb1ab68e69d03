//! Client configuration.

use crate::error::{GitHubError, Result};
use std::fmt;
use std::time::Duration;

/// Default root of the public GitHub API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default root of the latest-commit cache service.
pub const DEFAULT_CACHE_URL: &str = "http://gitdata";

/// Username/password pair sent as HTTP Basic credentials on write requests.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// GitHub username.
    pub username: String,
    /// GitHub password or personal access token.
    pub password: String,
}

impl Credentials {
    /// Create a credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Configuration for a [`GitHubClient`](crate::GitHubClient).
///
/// Set once before the client is built; the client never mutates it.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Root of the GitHub API, e.g. `https://api.github.com` or
    /// `https://git.example.com/api/v3`.
    pub api_url: String,

    /// Credentials for POST/PATCH requests.
    pub credentials: Option<Credentials>,

    /// Resolve latest commits through the cache service instead of the
    /// references API. Intended for tools that poll frequently.
    pub fast_cache: bool,

    /// Root of the latest-commit cache service.
    pub cache_url: String,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl ClientConfig {
    /// Create a configuration for the given API root.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            credentials: None,
            fast_cache: false,
            cache_url: DEFAULT_CACHE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Set the credentials used on write requests.
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::new(username, password));
        self
    }

    /// Enable or disable fast-cache mode.
    pub fn with_fast_cache(mut self, enabled: bool) -> Self {
        self.fast_cache = enabled;
        self
    }

    /// Set the cache service root.
    pub fn with_cache_url(mut self, cache_url: impl Into<String>) -> Self {
        self.cache_url = cache_url.into();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check that both roots are absolute http(s) URLs.
    pub fn validate(&self) -> Result<()> {
        validate_root("api_url", &self.api_url)?;
        if self.fast_cache {
            validate_root("cache_url", &self.cache_url)?;
        }
        Ok(())
    }
}

fn validate_root(field: &str, value: &str) -> Result<()> {
    let parsed = url::Url::parse(value)
        .map_err(|e| GitHubError::InvalidConfig(format!("{field} '{value}': {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(GitHubError::InvalidConfig(format!(
            "{field} '{value}': unsupported scheme '{other}'"
        ))),
    }
}
