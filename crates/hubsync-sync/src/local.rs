//! Local working-copy inspection.

use crate::error::{Result, SyncError};
use git2::{BranchType, ErrorCode, Repository, Status, StatusOptions};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// How a path differs from the committed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Not known to git.
    Untracked,
    /// Staged as a new file.
    Added,
    /// Content differs from HEAD or the index.
    Modified,
    /// Removed from the working tree or the index.
    Deleted,
    /// Detected as a rename.
    Renamed,
    /// Changed between file, symlink and submodule.
    TypeChange,
    /// Unresolved merge conflict.
    Conflicted,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Untracked => "untracked",
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
            Self::Renamed => "renamed",
            Self::TypeChange => "typechange",
            Self::Conflicted => "conflicted",
        };
        f.pad(name)
    }
}

/// A changed path in the working tree or index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// Path relative to the working directory.
    pub path: String,
    /// Kind of change.
    pub kind: ChangeKind,
}

impl StatusEntry {
    /// Create an entry for `path`.
    pub fn new(path: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Tip of a remote-tracking branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchTip {
    /// Short name, e.g. `origin/master`.
    pub name: String,
    /// SHA-1 of the commit the branch points to.
    pub sha: String,
}

impl BranchTip {
    /// Create a tip for branch `name` at `sha`.
    pub fn new(name: impl Into<String>, sha: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sha: sha.into(),
        }
    }
}

/// The queries a sync check needs from a local repository.
pub trait WorkingCopy {
    /// Every changed path, untracked files included and ignored files excluded.
    fn status(&self) -> Result<Vec<StatusEntry>>;

    /// Remote-tracking branches and the commits they point to.
    fn remote_branch_tips(&self) -> Result<Vec<BranchTip>>;

    /// Commit HEAD points to, or `None` on an unborn branch.
    fn head_tip(&self) -> Result<Option<String>>;
}

/// A [`WorkingCopy`] backed by libgit2.
pub struct GitWorkingCopy {
    repo: Repository,
}

impl GitWorkingCopy {
    /// Open the repository at `path`, using `path` itself as the working
    /// directory.
    ///
    /// The override matters for submodules, whose `.git` file points into the
    /// parent repository's `modules` directory; without it the working
    /// directory can resolve somewhere else.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let open_error = |source| SyncError::Open {
            path: path.to_path_buf(),
            source,
        };

        let repo = Repository::open(path).map_err(open_error)?;
        repo.set_workdir(path, false).map_err(open_error)?;
        debug!(path = %path.display(), "Opened repository");

        Ok(Self { repo })
    }
}

impl fmt::Debug for GitWorkingCopy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitWorkingCopy")
            .field("path", &self.repo.path())
            .field("workdir", &self.repo.workdir())
            .finish()
    }
}

impl WorkingCopy for GitWorkingCopy {
    fn status(&self) -> Result<Vec<StatusEntry>> {
        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut options))?;
        let entries = statuses
            .iter()
            .filter(|entry| entry.status() != Status::CURRENT && !entry.status().is_ignored())
            .map(|entry| StatusEntry {
                path: String::from_utf8_lossy(entry.path_bytes()).into_owned(),
                kind: change_kind(entry.status()),
            })
            .collect();

        Ok(entries)
    }

    fn remote_branch_tips(&self) -> Result<Vec<BranchTip>> {
        let mut tips = Vec::new();
        for branch in self.repo.branches(Some(BranchType::Remote))? {
            let (branch, _) = branch?;
            let name = branch.name()?.unwrap_or_default().to_string();
            match branch.get().peel_to_commit() {
                Ok(commit) => tips.push(BranchTip::new(name, commit.id().to_string())),
                Err(e) => debug!(branch = %name, error = %e, "Skipping branch without a commit"),
            }
        }
        Ok(tips)
    }

    fn head_tip(&self) -> Result<Option<String>> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?.id().to_string())),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn change_kind(status: Status) -> ChangeKind {
    if status.is_conflicted() {
        ChangeKind::Conflicted
    } else if status.is_wt_new() {
        ChangeKind::Untracked
    } else if status.is_index_new() {
        ChangeKind::Added
    } else if status.intersects(Status::INDEX_DELETED | Status::WT_DELETED) {
        ChangeKind::Deleted
    } else if status.intersects(Status::INDEX_RENAMED | Status::WT_RENAMED) {
        ChangeKind::Renamed
    } else if status.intersects(Status::INDEX_TYPECHANGE | Status::WT_TYPECHANGE) {
        ChangeKind::TypeChange
    } else {
        ChangeKind::Modified
    }
}
