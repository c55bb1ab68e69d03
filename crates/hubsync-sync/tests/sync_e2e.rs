//! End-to-end sync checks against a mocked GitHub API and real git
//! repositories in temporary directories.

use std::path::{Path, PathBuf};

use git2::{Oid, Repository, Signature};
use hubsync_github::{ClientConfig, GitHubClient};
use hubsync_sync::{SyncChecker, SyncError};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a commit containing `name` on the current branch.
fn commit_file(repo: &Repository, name: &str, contents: &str) -> Oid {
    let workdir = repo.workdir().unwrap();
    std::fs::write(workdir.join(name), contents).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(name)).unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();

    let sig = Signature::now("Test", "test@example.com").unwrap();
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, "commit", &tree, &parents)
        .unwrap()
}

/// A repository with one commit and `origin/master` pointing at it.
fn tracked_repo() -> (TempDir, Repository, Oid) {
    let temp = TempDir::new().unwrap();
    let repo = Repository::init(temp.path()).unwrap();
    let oid = commit_file(&repo, "README.md", "# hello\n");
    repo.reference("refs/remotes/origin/master", oid, true, "fetch")
        .unwrap();
    (temp, repo, oid)
}

/// A checkout laid out like a submodule: its `.git` is a file pointing at a
/// git directory inside the parent's `.git/modules`.
fn gitlink_checkout() -> (TempDir, PathBuf, Oid) {
    let temp = TempDir::new().unwrap();
    let gitdir = temp.path().join("parent/.git/modules/sub");
    let workdir = temp.path().join("parent/sub");
    std::fs::create_dir_all(&gitdir).unwrap();
    std::fs::create_dir_all(&workdir).unwrap();

    let repo = Repository::init_bare(&gitdir).unwrap();
    std::fs::write(workdir.join(".git"), format!("gitdir: {}\n", gitdir.display())).unwrap();
    repo.set_workdir(&workdir, false).unwrap();

    let oid = commit_file(&repo, "README.md", "# sub\n");
    repo.reference("refs/remotes/origin/master", oid, true, "fetch")
        .unwrap();
    (temp, workdir, oid)
}

async fn mount_branch(server: &MockServer, sha: &str) {
    Mock::given(method("GET"))
        .and(path("/repos/octocat/hello/git/refs/heads/master"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ref": "refs/heads/master",
            "url": "https://api.github.com/repos/octocat/hello/git/refs/heads/master",
            "object": {
                "type": "commit",
                "sha": sha,
                "url": "https://api.github.com/repos/octocat/hello/git/commits/x"
            }
        })))
        .mount(server)
        .await;
}

fn checker(server: &MockServer) -> SyncChecker {
    SyncChecker::new(GitHubClient::new(ClientConfig::new(server.uri())).unwrap())
}

#[tokio::test]
async fn clean_repository_at_latest_commit_is_synchronized() {
    let server = MockServer::start().await;
    let (temp, _repo, oid) = tracked_repo();
    mount_branch(&server, &oid.to_string()).await;

    let checker = checker(&server);
    let report = checker
        .check(temp.path(), "octocat", "hello", "master")
        .await
        .unwrap();

    assert!(report.is_clean());
    assert!(report.head_matches_remote);
    assert!(report.is_synchronized());
    assert!(
        checker
            .is_local_repository_synchronized_to_remote(temp.path(), "octocat", "hello", "master")
            .await
    );
}

#[tokio::test]
async fn modified_file_is_not_synchronized() {
    let server = MockServer::start().await;
    let (temp, _repo, oid) = tracked_repo();
    mount_branch(&server, &oid.to_string()).await;
    std::fs::write(temp.path().join("README.md"), "# edited locally\n").unwrap();

    let report = checker(&server)
        .check(temp.path(), "octocat", "hello", "master")
        .await
        .unwrap();

    assert_eq!(report.dirty_entries.len(), 1);
    assert_eq!(report.dirty_entries[0].path, "README.md");
    assert!(!report.is_synchronized());
}

#[tokio::test]
async fn remote_moved_ahead_is_not_synchronized() {
    let server = MockServer::start().await;
    let (temp, _repo, _oid) = tracked_repo();
    mount_branch(&server, "827efc6d56897b048c772eb4087f854f46256132").await;

    let synchronized = checker(&server)
        .is_local_repository_synchronized_to_remote(temp.path(), "octocat", "hello", "master")
        .await;

    assert!(!synchronized);
}

#[tokio::test]
async fn local_head_behind_fetched_remote_is_still_synchronized() {
    let server = MockServer::start().await;
    let (temp, repo, first) = tracked_repo();
    // a fetch brought in an upstream commit that HEAD has not caught up with
    let base = repo.find_commit(first).unwrap();
    let sig = Signature::now("Upstream", "upstream@example.com").unwrap();
    let second = repo
        .commit(
            Some("refs/remotes/origin/master"),
            &sig,
            &sig,
            "upstream change",
            &base.tree().unwrap(),
            &[&base],
        )
        .unwrap();
    mount_branch(&server, &second.to_string()).await;

    let report = checker(&server)
        .check(temp.path(), "octocat", "hello", "master")
        .await
        .unwrap();

    assert!(!report.head_matches_remote);
    assert!(report.is_synchronized());
}

#[tokio::test]
async fn api_failure_is_not_synchronized() {
    let server = MockServer::start().await;
    let (temp, _repo, _oid) = tracked_repo();
    Mock::given(method("GET"))
        .and(path("/repos/octocat/hello/git/refs/heads/master"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let report = checker(&server)
        .check(temp.path(), "octocat", "hello", "master")
        .await
        .unwrap();

    assert_eq!(report.latest_commit_id, None);
    assert!(!report.is_synchronized());
}

#[tokio::test]
async fn fast_cache_mode_resolves_latest_from_cache_service() {
    let server = MockServer::start().await;
    let (temp, _repo, oid) = tracked_repo();
    Mock::given(method("GET"))
        .and(path("/commits/latest/git/octocat/hello/master"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!("{oid}\n")))
        .expect(1)
        .mount(&server)
        .await;

    let client = GitHubClient::new(
        ClientConfig::new(server.uri())
            .with_fast_cache(true)
            .with_cache_url(server.uri()),
    )
    .unwrap();

    assert!(
        SyncChecker::new(client)
            .is_local_repository_synchronized_to_remote(temp.path(), "octocat", "hello", "master")
            .await
    );
}

#[tokio::test]
async fn missing_repository_is_an_error() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    mount_branch(&server, "827efc6d56897b048c772eb4087f854f46256132").await;

    let checker = checker(&server);
    let err = checker
        .check(temp.path(), "octocat", "hello", "master")
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Open { .. }));

    assert!(
        !checker
            .is_local_repository_synchronized_to_remote(temp.path(), "octocat", "hello", "master")
            .await
    );
}

#[tokio::test]
async fn gitlink_checkout_is_checked_in_place() {
    let server = MockServer::start().await;
    let (_temp, workdir, oid) = gitlink_checkout();
    mount_branch(&server, &oid.to_string()).await;

    let checker = checker(&server);
    let report = checker
        .check(&workdir, "octocat", "hello", "master")
        .await
        .unwrap();

    // the .git pointer file is either skipped or tolerated, never dirty
    assert!(report.dirty_entries.is_empty());
    assert_eq!(report.head, Some(oid.to_string()));
    assert!(report.is_synchronized());

    std::fs::write(workdir.join("notes.txt"), "scratch\n").unwrap();
    let report = checker
        .check(&workdir, "octocat", "hello", "master")
        .await
        .unwrap();

    assert!(report
        .dirty_entries
        .iter()
        .any(|entry| entry.path == "notes.txt"));
    assert!(!report.is_synchronized());
}
