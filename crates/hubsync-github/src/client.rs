//! GitHub git data API client.

use crate::config::ClientConfig;
use crate::error::{GitHubError, Result};
use crate::types::{
    is_valid_sha, Blob, Commit, CommitComparison, CreateCommit, CreateReference, CreateTree,
    GitCommit, Reference, Tree, TreeItem, UpdateReference,
};

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, warn};

/// Fixed `User-Agent` sent with every request.
pub const USER_AGENT: &str = "hubsync";

const ACCEPT_GITHUB_V3: &str = "application/vnd.github.v3+json";
const JSON_UTF8: &str = "application/json; charset=utf-8";

/// Client for the GitHub git data API (<https://docs.github.com/rest/git>).
///
/// Reads are sent anonymously; writes carry HTTP Basic credentials when the
/// configuration has them. Every failure is logged with the request method
/// and URL before it is returned.
///
/// The client is cheap to clone and holds no per-request state.
///
/// # Examples
///
/// ```rust,ignore
/// use hubsync_github::{ClientConfig, GitHubClient};
///
/// let client = GitHubClient::new(ClientConfig::default())?;
/// if let Some(sha) = client.latest_commit_id("rust-lang", "rust", "master").await? {
///     println!("master is at {sha}");
/// }
/// ```
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    config: ClientConfig,
}

impl GitHubClient {
    /// Create a client from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::InvalidConfig`] if a configured URL is not an
    /// absolute http(s) URL or the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .gzip(true)
            .deflate(true)
            .build()
            .map_err(|e| GitHubError::InvalidConfig(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// The configuration the client was built with.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Most recent commit on `branch`.
    ///
    /// In fast-cache mode the cache service is asked; otherwise the branch
    /// reference is read. Returns `None` when the branch does not exist or the
    /// cache service has no entry for it. A cache answer that is not a
    /// 40 character SHA-1 is an [`GitHubError::InvalidResponse`].
    pub async fn latest_commit_id(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<Option<String>> {
        if self.config.fast_cache {
            let url = self.cache_url(owner, repo, branch);
            let body = match self.get_text(&url).await {
                Ok(body) => body,
                Err(e) if e.is_not_found() => return Ok(None),
                Err(e) => return Err(e),
            };

            let trimmed = body.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            if !is_valid_sha(trimmed) {
                let err = GitHubError::InvalidResponse {
                    method: Method::GET,
                    url,
                    message: format!("'{trimmed}' is not a commit SHA"),
                };
                log_failure(&err);
                return Err(err);
            }
            return Ok(Some(trimmed.to_string()));
        }

        match self.get_reference(owner, repo, branch).await {
            Ok(reference) => Ok(Some(reference.object.sha)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Read the `refs/heads/{branch}` reference.
    pub async fn get_reference(&self, owner: &str, repo: &str, branch: &str) -> Result<Reference> {
        self.get(&self.api_url(&format!("repos/{owner}/{repo}/git/refs/heads/{branch}")))
            .await
    }

    /// Commit with its file list.
    pub async fn get_commit(&self, owner: &str, repo: &str, sha: &str) -> Result<Commit> {
        self.get(&self.api_url(&format!("repos/{owner}/{repo}/commits/{sha}")))
            .await
    }

    /// Git-level commit data. A subset of what [`get_commit`](Self::get_commit)
    /// returns.
    pub async fn get_git_commit(&self, owner: &str, repo: &str, sha: &str) -> Result<GitCommit> {
        self.get(&self.api_url(&format!("repos/{owner}/{repo}/git/commits/{sha}")))
            .await
    }

    /// Commits between `base` and `head`.
    pub async fn compare_commits(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<CommitComparison> {
        self.get(&self.api_url(&format!("repos/{owner}/{repo}/compare/{base}...{head}")))
            .await
    }

    /// Upload a blob.
    pub async fn create_blob(&self, owner: &str, repo: &str, blob: &Blob) -> Result<Blob> {
        self.write(
            Method::POST,
            &self.api_url(&format!("repos/{owner}/{repo}/git/blobs")),
            blob,
        )
        .await
    }

    /// Blob referenced by a tree entry.
    pub async fn get_blob(&self, item: &TreeItem) -> Result<Blob> {
        let url = item.url.as_deref().ok_or(GitHubError::MissingUrl("tree item"))?;
        self.get(url).await
    }

    /// Create a commit.
    pub async fn create_commit(
        &self,
        owner: &str,
        repo: &str,
        commit: &CreateCommit,
    ) -> Result<GitCommit> {
        self.write(
            Method::POST,
            &self.api_url(&format!("repos/{owner}/{repo}/git/commits")),
            commit,
        )
        .await
    }

    /// Create a tree.
    pub async fn create_tree(&self, owner: &str, repo: &str, tree: &CreateTree) -> Result<Tree> {
        self.write(
            Method::POST,
            &self.api_url(&format!("repos/{owner}/{repo}/git/trees")),
            tree,
        )
        .await
    }

    /// Tree a commit points to.
    pub async fn get_tree(&self, commit: &GitCommit) -> Result<Tree> {
        if commit.tree.url.is_empty() {
            return Err(GitHubError::MissingUrl("commit tree"));
        }
        self.get(&commit.tree.url).await
    }

    /// Create a reference.
    pub async fn create_reference(
        &self,
        owner: &str,
        repo: &str,
        reference: &CreateReference,
    ) -> Result<Reference> {
        self.write(
            Method::POST,
            &self.api_url(&format!("repos/{owner}/{repo}/git/refs")),
            reference,
        )
        .await
    }

    /// Move `refs/heads/{branch}`.
    ///
    /// In fast-cache mode the cache service is then told to refresh its entry
    /// for the branch, since it would otherwise keep serving the old tip until
    /// GitHub notifies it. That refresh is best effort and its outcome never
    /// affects the result.
    pub async fn update_reference(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        update: &UpdateReference,
    ) -> Result<Reference> {
        let reference = self
            .write(
                Method::PATCH,
                &self.api_url(&format!("repos/{owner}/{repo}/git/refs/heads/{branch}")),
                update,
            )
            .await?;

        if self.config.fast_cache {
            let url = format!("{}?refreshCache=true", self.cache_url(owner, repo, branch));
            let request = self.http.get(&url);
            if let Err(e) = self.send(&Method::GET, &url, request).await {
                warn!(method = "GET", url = %url, error = %e, "Cache refresh failed");
            }
        }

        Ok(reference)
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.api_url.trim_end_matches('/'))
    }

    fn cache_url(&self, owner: &str, repo: &str, branch: &str) -> String {
        format!(
            "{}/commits/latest/git/{owner}/{repo}/{branch}",
            self.config.cache_url.trim_end_matches('/')
        )
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let request = self.http.get(url).header(ACCEPT, ACCEPT_GITHUB_V3);
        self.request_json(Method::GET, url, request).await
    }

    async fn write<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        url: &str,
        body: &B,
    ) -> Result<T> {
        let mut request = self
            .http
            .request(method.clone(), url)
            .header(ACCEPT, ACCEPT_GITHUB_V3)
            .header(CONTENT_TYPE, JSON_UTF8)
            .json(body);

        // sent up front rather than waiting for a 401 challenge
        if let Some(credentials) = &self.config.credentials {
            request = request.basic_auth(&credentials.username, Some(&credentials.password));
        }

        self.request_json(method, url, request).await
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let request = self.http.get(url);
        let result = self.send(&Method::GET, url, request).await;
        if let Err(e) = &result {
            log_failure(e);
        }
        result
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        request: RequestBuilder,
    ) -> Result<T> {
        let result = match self.send(&method, url, request).await {
            Ok(body) => serde_json::from_str(&body).map_err(|e| GitHubError::InvalidResponse {
                method,
                url: url.to_string(),
                message: e.to_string(),
            }),
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            log_failure(e);
        }
        result
    }

    async fn send(&self, method: &Method, url: &str, request: RequestBuilder) -> Result<String> {
        debug!(method = %method, url = %url, "Sending request");

        let response = request.send().await.map_err(|source| GitHubError::Network {
            method: method.clone(),
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(GitHubError::NotFound {
                method: method.clone(),
                url: url.to_string(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GitHubError::Status {
                method: method.clone(),
                url: url.to_string(),
                status,
                body,
            });
        }

        response.text().await.map_err(|source| GitHubError::Network {
            method: method.clone(),
            url: url.to_string(),
            source,
        })
    }
}

fn log_failure(err: &GitHubError) {
    match err {
        GitHubError::NotFound { method, url } => {
            warn!(method = %method, url = %url, "Resource not found");
        }
        GitHubError::Status { method, url, status, .. } => {
            error!(method = %method, url = %url, status = %status, error = %err, "GitHub request failed");
        }
        GitHubError::Network { method, url, .. } | GitHubError::InvalidResponse { method, url, .. } => {
            error!(method = %method, url = %url, error = %err, "GitHub request failed");
        }
        _ => error!(error = %err, "GitHub request failed"),
    }
}
