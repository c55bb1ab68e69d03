//! # GitHub git data client
//!
//! A typed client for the part of the GitHub v3 REST API that deals with raw
//! git data: references, commits, trees and blobs.
//!
//! ## Features
//!
//! - **Typed resources**: serde models of references, commits, comparisons,
//!   trees and blobs, plus the payloads used to create them
//! - **Write support**: create blobs, trees, commits and references, move
//!   branches
//! - **Fast-cache mode**: resolve branch tips through a latest-commit cache
//!   service for tools that poll frequently
//!
//! ## Example
//!
//! ```rust,ignore
//! use hubsync_github::{ClientConfig, GitHubClient};
//!
//! #[tokio::main]
//! async fn main() -> hubsync_github::Result<()> {
//!     let client = GitHubClient::new(ClientConfig::default())?;
//!     let commit = client.get_git_commit("octocat", "Hello-World", "7fd1a60").await?;
//!     let tree = client.get_tree(&commit).await?;
//!     for item in &tree.items {
//!         println!("{} {}", item.mode, item.path);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::GitHubClient;
pub use config::{ClientConfig, Credentials};
pub use error::{BlobError, GitHubError, Result};
pub use types::*;
