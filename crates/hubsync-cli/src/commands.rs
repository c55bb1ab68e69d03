//! CLI command implementations.

use anyhow::{anyhow, bail, Result};
use hubsync_github::{FileMode, GitHubClient, Tree, TreeItem};
use hubsync_sync::{SyncChecker, SyncPolicy};
use std::path::Path;

/// Check a local working copy. Returns whether it is synchronized.
pub async fn check(
    client: GitHubClient,
    policy: SyncPolicy,
    path: &Path,
    owner: &str,
    repo: &str,
    branch: &str,
) -> Result<bool> {
    tracing::info!(path = %path.display(), owner, repo, branch, "Checking repository");

    let report = SyncChecker::new(client)
        .with_policy(policy)
        .check(path, owner, repo, branch)
        .await?;

    println!(
        "latest:  {}",
        report.latest_commit_id.as_deref().unwrap_or("(unknown)")
    );
    println!("head:    {}", report.head.as_deref().unwrap_or("(unborn)"));
    for entry in &report.dirty_entries {
        println!("  {:<11} {}", entry.kind, entry.path);
    }
    if !report.head_matches_remote {
        println!("warning: HEAD is behind every remote-tracking branch");
    }

    let synchronized = report.is_synchronized();
    println!(
        "{} is {}synchronized with {owner}/{repo}@{branch}",
        path.display(),
        if synchronized { "" } else { "not " }
    );
    Ok(synchronized)
}

/// Print the latest commit of a branch.
pub async fn latest(client: &GitHubClient, owner: &str, repo: &str, branch: &str) -> Result<()> {
    match client.latest_commit_id(owner, repo, branch).await? {
        Some(sha) => {
            println!("{sha}");
            Ok(())
        }
        None => bail!("branch '{branch}' not found in {owner}/{repo}"),
    }
}

/// Print the commits between two revisions.
pub async fn compare(
    client: &GitHubClient,
    owner: &str,
    repo: &str,
    base: &str,
    head: &str,
) -> Result<()> {
    let comparison = client.compare_commits(owner, repo, base, head).await?;

    println!("{} commit(s) between {base} and {head}", comparison.total_commits);
    for commit in &comparison.commits {
        let summary = commit.git_commit.message.lines().next().unwrap_or_default();
        println!(
            "{} {} <{}> {summary}",
            short_sha(&commit.sha),
            commit.git_commit.author.name,
            commit.git_commit.author.email
        );
    }
    Ok(())
}

/// Print the root tree of a commit.
pub async fn tree(client: &GitHubClient, owner: &str, repo: &str, sha: &str) -> Result<()> {
    let tree = commit_tree(client, owner, repo, sha).await?;

    for item in &tree.items {
        println!(
            "{} {:<6} {} {}{}",
            item.mode,
            item.item_type,
            item.sha.as_deref().unwrap_or("-"),
            item.path,
            classify(item)
        );
    }
    if tree.truncated {
        println!("(listing truncated by GitHub)");
    }
    Ok(())
}

/// Print a file from the root tree of a commit.
pub async fn show_blob(
    client: &GitHubClient,
    owner: &str,
    repo: &str,
    sha: &str,
    path: &str,
) -> Result<()> {
    let tree = commit_tree(client, owner, repo, sha).await?;
    let item = tree
        .items
        .iter()
        .find(|item| item.path == path)
        .ok_or_else(|| anyhow!("'{path}' not found in tree {}", tree.sha))?;

    let blob = client.get_blob(item).await?;
    print!("{}", blob.content()?);
    Ok(())
}

async fn commit_tree(client: &GitHubClient, owner: &str, repo: &str, sha: &str) -> Result<Tree> {
    let commit = client.get_git_commit(owner, repo, sha).await?;
    Ok(client.get_tree(&commit).await?)
}

/// `ls -F` style suffix for a tree entry.
fn classify(item: &TreeItem) -> &'static str {
    match item.file_mode() {
        Some(FileMode::Directory) => "/",
        Some(FileMode::Executable) => "*",
        Some(FileMode::Symlink) => "@",
        Some(FileMode::Submodule) => " (submodule)",
        Some(FileMode::Regular) | None => "",
    }
}

fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}
