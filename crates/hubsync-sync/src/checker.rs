//! Local vs. remote synchronization verdict.

use crate::error::{Result, SyncError};
use crate::local::{BranchTip, ChangeKind, GitWorkingCopy, StatusEntry, WorkingCopy};
use hubsync_github::GitHubClient;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Repository metadata marker tolerated as a lone untracked entry.
pub const DEFAULT_MARKER: &str = ".git";

/// Rules that adjust what counts as a dirty working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPolicy {
    /// Path of an untracked entry that is ignored when it is the *only*
    /// change. Submodule checkouts opened with an explicit working directory
    /// report their `.git` pointer file this way. `None` disables the rule.
    pub tolerated_marker: Option<String>,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            tolerated_marker: Some(DEFAULT_MARKER.to_string()),
        }
    }
}

impl SyncPolicy {
    /// A policy where every change counts.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            tolerated_marker: None,
        }
    }

    fn tolerates(&self, status: &[StatusEntry]) -> bool {
        match (&self.tolerated_marker, status) {
            (Some(marker), [only]) => only.kind == ChangeKind::Untracked && only.path == *marker,
            _ => false,
        }
    }
}

/// Outcome of a sync check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Latest commit of the remote branch, if it could be resolved.
    pub latest_commit_id: Option<String>,
    /// Local HEAD commit.
    pub head: Option<String>,
    /// Changes that make the working tree dirty.
    pub dirty_entries: Vec<StatusEntry>,
    /// Some remote-tracking branch points at HEAD.
    pub head_matches_remote: bool,
    /// Some remote-tracking branch points at the latest remote commit.
    pub latest_matches_remote: bool,
}

impl SyncReport {
    /// True if no change counts against the working tree.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.dirty_entries.is_empty()
    }

    /// True if the working tree is clean and a remote-tracking branch is at the
    /// latest remote commit. HEAD itself may still be behind.
    #[must_use]
    pub fn is_synchronized(&self) -> bool {
        self.is_clean() && self.latest_matches_remote
    }
}

/// Compare a working copy against the latest remote commit.
///
/// HEAD lagging behind every remote-tracking branch only produces a warning;
/// it does not affect the verdict.
pub fn evaluate<W: WorkingCopy + ?Sized>(
    working_copy: &W,
    latest_commit_id: Option<&str>,
    policy: &SyncPolicy,
) -> Result<SyncReport> {
    let status = working_copy.status()?;
    let dirty_entries = if status.is_empty() || policy.tolerates(&status) {
        info!("Git repository is clean");
        Vec::new()
    } else {
        error!(changes = status.len(), "Git repository is dirty");
        for entry in &status {
            debug!(kind = %entry.kind, path = %entry.path, "Changed path");
        }
        status
    };

    let remote_tips = working_copy.remote_branch_tips()?;
    let head = working_copy.head_tip()?;

    let head_matches_remote = head
        .as_deref()
        .is_some_and(|head| points_at(&remote_tips, head));
    if !head_matches_remote {
        warn!(
            head = head.as_deref().unwrap_or("<unborn>"),
            "Repository HEAD does not match the tip of any remote branch; local repository is behind"
        );
    }

    let latest_matches_remote =
        latest_commit_id.is_some_and(|latest| points_at(&remote_tips, latest));
    if !latest_matches_remote {
        error!(
            latest = latest_commit_id.unwrap_or("<unknown>"),
            "No remote branch tip is set to the latest remote commit"
        );
    }

    Ok(SyncReport {
        latest_commit_id: latest_commit_id.map(str::to_string),
        head,
        dirty_entries,
        head_matches_remote,
        latest_matches_remote,
    })
}

fn points_at(tips: &[BranchTip], sha: &str) -> bool {
    tips.iter().any(|tip| tip.sha == sha)
}

/// Checks local working copies against branches on GitHub.
#[derive(Debug, Clone)]
pub struct SyncChecker {
    client: GitHubClient,
    policy: SyncPolicy,
}

impl SyncChecker {
    /// Create a checker using the default [`SyncPolicy`].
    pub fn new(client: GitHubClient) -> Self {
        Self {
            client,
            policy: SyncPolicy::default(),
        }
    }

    /// Replace the policy.
    pub fn with_policy(mut self, policy: SyncPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run the check and return the full report.
    ///
    /// A failure to resolve the latest remote commit is logged and leads to an
    /// unsynchronized report rather than an error.
    ///
    /// # Errors
    ///
    /// Fails if the local repository cannot be opened or queried.
    pub async fn check(
        &self,
        path: impl AsRef<Path>,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<SyncReport> {
        let latest = match self.client.latest_commit_id(owner, repo, branch).await {
            Ok(latest) => latest,
            Err(e) => {
                warn!(owner, repo, branch, error = %e, "Could not resolve latest remote commit");
                None
            }
        };

        let path = path.as_ref().to_path_buf();
        let policy = self.policy.clone();

        // the repository handle lives and dies inside this closure
        tokio::task::spawn_blocking(move || {
            let working_copy = GitWorkingCopy::open(&path)?;
            evaluate(&working_copy, latest.as_deref(), &policy)
        })
        .await
        .map_err(|e| SyncError::Task(e.to_string()))?
    }

    /// True if the working copy at `path` is clean and one of its
    /// remote-tracking branches is at the latest commit of `branch`.
    ///
    /// Any error, including an unreadable repository, yields `false`.
    pub async fn is_local_repository_synchronized_to_remote(
        &self,
        path: impl AsRef<Path>,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> bool {
        let path = path.as_ref();
        match self.check(path, owner, repo, branch).await {
            Ok(report) => report.is_synchronized(),
            Err(e) => {
                error!(path = %path.display(), error = %e, "Sync check failed");
                false
            }
        }
    }
}
