//! Configuration file handling.

use anyhow::Context;
use hubsync_github::config::{DEFAULT_API_URL, DEFAULT_CACHE_URL};
use hubsync_github::ClientConfig;
use hubsync_sync::SyncPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Contents of a `hubsync.yaml` file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// GitHub API root.
    pub api_url: Option<String>,
    /// Username for write requests.
    pub username: Option<String>,
    /// Password or token for write requests.
    pub password: Option<String>,
    /// Resolve branch tips through the cache service.
    pub fast_cache: bool,
    /// Cache service root.
    pub cache_url: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Count every untracked entry as a change, including a lone `.git` file.
    pub strict: bool,
}

impl FileConfig {
    /// Load a YAML configuration file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Build the client configuration. Credentials are only used when both
    /// halves are present.
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(self.api_url.as_deref().unwrap_or(DEFAULT_API_URL))
            .with_fast_cache(self.fast_cache)
            .with_cache_url(self.cache_url.as_deref().unwrap_or(DEFAULT_CACHE_URL));

        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            config = config.with_credentials(username.as_str(), password.as_str());
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }

    /// Build the sync policy.
    pub fn sync_policy(&self) -> SyncPolicy {
        if self.strict {
            SyncPolicy::strict()
        } else {
            SyncPolicy::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hubsync_github::Credentials;

    #[test]
    fn empty_file_uses_defaults() {
        let config = FileConfig::parse("{}").unwrap();
        assert_eq!(config, FileConfig::default());

        let client = config.client_config();
        assert_eq!(client.api_url, DEFAULT_API_URL);
        assert!(client.credentials.is_none());
        assert_eq!(config.sync_policy(), SyncPolicy::default());
    }

    #[test]
    fn full_file() {
        let config = FileConfig::parse(
            r"
api_url: https://git.example.com/api/v3
username: build
password: s3cret
fast_cache: true
cache_url: http://gitdata.example.com
timeout_secs: 5
strict: true
",
        )
        .unwrap();

        let client = config.client_config();
        assert_eq!(client.api_url, "https://git.example.com/api/v3");
        assert_eq!(client.credentials, Some(Credentials::new("build", "s3cret")));
        assert!(client.fast_cache);
        assert_eq!(client.cache_url, "http://gitdata.example.com");
        assert_eq!(client.timeout, Duration::from_secs(5));
        assert_eq!(config.sync_policy(), SyncPolicy::strict());
    }

    #[test]
    fn username_without_password_is_anonymous() {
        let config = FileConfig::parse("username: build\n").unwrap();
        assert!(config.client_config().credentials.is_none());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(FileConfig::parse("api_root: https://api.github.com\n").is_err());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hubsync.yaml");
        std::fs::write(&path, "fast_cache: true\n").unwrap();

        assert!(FileConfig::load(&path).unwrap().fast_cache);
        assert!(FileConfig::load(&dir.path().join("missing.yaml")).is_err());
    }
}
