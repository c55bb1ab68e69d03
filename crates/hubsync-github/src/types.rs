//! GitHub git data resources.
//!
//! These mirror the JSON documents of the GitHub v3 git data API. Every value
//! is a snapshot of remote state at the time it was fetched; nothing here is
//! cached or shared.

use crate::error::BlobError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Returns true if `sha` is a 40 character hexadecimal SHA-1.
#[must_use]
pub fn is_valid_sha(sha: &str) -> bool {
    sha.len() == 40 && sha.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Kind of git object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    /// A commit.
    Commit,
    /// A tree (directory listing).
    Tree,
    /// A blob (file content).
    Blob,
    /// An annotated tag.
    Tag,
}

impl ObjectType {
    /// Wire name of the type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Commit => "commit",
            Self::Tree => "tree",
            Self::Blob => "blob",
            Self::Tag => "tag",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A named pointer to a git object, e.g. `refs/heads/master`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Fully qualified reference name.
    #[serde(rename = "ref")]
    pub ref_name: String,
    /// API URL of the reference.
    pub url: String,
    /// The object the reference points to.
    pub object: GitObject,
}

/// The target of a [`Reference`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitObject {
    /// Object type.
    #[serde(rename = "type")]
    pub object_type: ObjectType,
    /// SHA-1 of the object.
    pub sha: String,
    /// API URL of the object.
    pub url: String,
}

/// A commit as returned by `GET repos/{owner}/{repo}/commits/{sha}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// SHA-1 of the commit.
    pub sha: String,
    /// Git-level commit details.
    #[serde(rename = "commit")]
    pub git_commit: GitCommit,
    /// Files touched by the commit. Absent in comparison listings.
    #[serde(default)]
    pub files: Vec<CommitFile>,
}

/// A commit as returned by the git data API.
///
/// This is also the `commit` object nested in [`Commit`], where GitHub omits
/// the SHA.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitCommit {
    /// Commit message.
    pub message: String,
    /// SHA-1 of the commit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    /// Tree the commit points to.
    pub tree: CommitTree,
    /// Author of the change.
    pub author: Person,
    /// Person who committed the change.
    pub committer: Person,
}

/// Tree pointer embedded in a [`GitCommit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitTree {
    /// API URL of the tree.
    pub url: String,
    /// SHA-1 of the tree.
    pub sha: String,
}

/// Commit author or committer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Timestamp, in whatever format the API returned.
    pub date: String,
}

/// Commits between two revisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitComparison {
    /// Number of commits between the revisions.
    #[serde(rename = "total_commits")]
    pub total_commits: u32,
    /// The commits, in API order.
    pub commits: Vec<Commit>,
}

/// How a file changed in a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileChange {
    /// New file.
    Added,
    /// Content changed.
    Modified,
    /// File deleted.
    Removed,
    /// File moved, possibly with changes.
    Renamed,
    /// File copied from another path.
    Copied,
    /// Mode or other metadata changed.
    Changed,
    /// Listed without changes.
    Unchanged,
}

/// A file touched by a [`Commit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitFile {
    /// Kind of change.
    pub status: FileChange,
    /// Path of the file.
    pub filename: String,
}

/// Blob encoding for UTF-8 text content.
pub const ENCODING_UTF8: &str = "utf-8";

/// Blob encoding for base64 content.
pub const ENCODING_BASE64: &str = "base64";

/// Raw file content. Sent to and returned from the API.
///
/// The reply to a blob upload only carries `url` and `sha`; `encoding` and
/// `content` are empty in that case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    /// Either `utf-8` or `base64`.
    #[serde(default)]
    pub encoding: String,
    /// Content, encoded as described by `encoding`.
    #[serde(default)]
    pub content: String,
    /// API URL of the blob.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// SHA-1 of the blob.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

impl Blob {
    /// A blob carrying UTF-8 text as-is.
    pub fn utf8(text: impl Into<String>) -> Self {
        Self {
            encoding: ENCODING_UTF8.to_string(),
            content: text.into(),
            url: None,
            size: None,
            sha: None,
        }
    }

    /// A blob carrying arbitrary bytes, base64 encoded.
    pub fn base64(bytes: impl AsRef<[u8]>) -> Self {
        Self {
            encoding: ENCODING_BASE64.to_string(),
            content: STANDARD.encode(bytes),
            url: None,
            size: None,
            sha: None,
        }
    }

    /// Decode the content according to `encoding`.
    ///
    /// GitHub wraps base64 content at 60 columns; line breaks are ignored.
    ///
    /// # Errors
    ///
    /// Fails for encodings other than `utf-8` and `base64`, and for base64
    /// content that is malformed or does not decode to UTF-8.
    pub fn content(&self) -> Result<String, BlobError> {
        match self.encoding.as_str() {
            ENCODING_UTF8 => Ok(self.content.clone()),
            ENCODING_BASE64 => {
                let compact: String = self
                    .content
                    .chars()
                    .filter(|c| !c.is_ascii_whitespace())
                    .collect();
                let bytes = STANDARD
                    .decode(compact)
                    .map_err(|e| BlobError::InvalidBase64(e.to_string()))?;
                String::from_utf8(bytes).map_err(|_| BlobError::InvalidUtf8)
            }
            other => Err(BlobError::UnsupportedEncoding(other.to_string())),
        }
    }
}

/// A directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    /// API URL of the tree.
    pub url: String,
    /// SHA-1 of the tree.
    pub sha: String,
    /// Entries of the tree.
    #[serde(rename = "tree")]
    pub items: Vec<TreeItem>,
    /// Set when GitHub cut the listing short.
    #[serde(default)]
    pub truncated: bool,
}

/// File mode of a [`TreeItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileMode {
    /// `100644`
    Regular,
    /// `100755`
    Executable,
    /// `040000`
    Directory,
    /// `160000`
    Submodule,
    /// `120000`
    Symlink,
}

impl FileMode {
    /// Parse the octal mode string used by the API.
    #[must_use]
    pub fn parse(mode: &str) -> Option<Self> {
        match mode {
            "100644" => Some(Self::Regular),
            "100755" => Some(Self::Executable),
            // git itself writes directories without the leading zero
            "040000" | "40000" => Some(Self::Directory),
            "160000" => Some(Self::Submodule),
            "120000" => Some(Self::Symlink),
            _ => None,
        }
    }

    /// Mode string as the API expects it.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "100644",
            Self::Executable => "100755",
            Self::Directory => "040000",
            Self::Submodule => "160000",
            Self::Symlink => "120000",
        }
    }
}

/// An entry of a [`Tree`], also used when creating trees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeItem {
    /// `blob`, `tree` or `commit`.
    #[serde(rename = "type")]
    pub item_type: ObjectType,
    /// API URL of the entry's object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Size in bytes, for blobs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// SHA-1 of the entry's object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    /// Path relative to the tree.
    pub path: String,
    /// Octal mode string, see [`FileMode`].
    pub mode: String,
}

impl TreeItem {
    /// Entry pointing at an existing object, for use in [`CreateTree`].
    pub fn new(path: impl Into<String>, mode: FileMode, item_type: ObjectType, sha: impl Into<String>) -> Self {
        Self {
            item_type,
            url: None,
            size: None,
            sha: Some(sha.into()),
            path: path.into(),
            mode: mode.as_str().to_string(),
        }
    }

    /// The parsed mode, or `None` for modes git does not define.
    #[must_use]
    pub fn file_mode(&self) -> Option<FileMode> {
        FileMode::parse(&self.mode)
    }
}

/// Payload for `POST repos/{owner}/{repo}/git/commits`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCommit {
    /// Commit message.
    pub message: String,
    /// Parent SHAs. Empty for a root commit, several for a merge.
    pub parents: Vec<String>,
    /// SHA of the tree the commit points to.
    pub tree: String,
}

/// Payload for `POST repos/{owner}/{repo}/git/trees`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTree {
    /// SHA of the tree to update; omitted to create a tree from scratch.
    #[serde(rename = "base_tree", default, skip_serializing_if = "Option::is_none")]
    pub base_tree: Option<String>,
    /// Entries to write.
    pub tree: Vec<TreeItem>,
}

/// Payload for `POST repos/{owner}/{repo}/git/refs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateReference {
    /// Fully qualified name, e.g. `refs/heads/master`. GitHub rejects names
    /// that do not start with `refs` and contain at least two slashes.
    #[serde(rename = "ref")]
    pub ref_name: String,
    /// SHA the reference should point to.
    pub sha: String,
}

/// Payload for `PATCH repos/{owner}/{repo}/git/refs/heads/{branch}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateReference {
    /// SHA the reference should point to.
    pub sha: String,
    /// Allow a non fast-forward update.
    #[serde(default)]
    pub force: bool,
}
