//! hubsync - GitHub git data client and working-copy sync checker.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use config::FileConfig;

/// hubsync - Inspect GitHub git data and check local working copies
#[derive(Parser, Debug)]
#[command(name = "hubsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// GitHub API root (overrides the configuration file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Resolve branch tips through the cache service
    #[arg(long, global = true)]
    fast_cache: bool,

    /// Cache service root (overrides the configuration file)
    #[arg(long, global = true)]
    cache_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check whether a local working copy is synchronized with a branch
    Check {
        /// Repository owner
        owner: String,
        /// Repository name
        repo: String,
        /// Branch name
        branch: String,
        /// Path to the local working copy
        #[arg(short, long, default_value = ".")]
        path: PathBuf,
        /// Count a lone untracked .git file as a change
        #[arg(long)]
        strict: bool,
    },

    /// Print the latest commit of a branch
    Latest {
        /// Repository owner
        owner: String,
        /// Repository name
        repo: String,
        /// Branch name
        branch: String,
    },

    /// List the commits between two revisions
    Compare {
        /// Repository owner
        owner: String,
        /// Repository name
        repo: String,
        /// Base revision
        base: String,
        /// Head revision
        head: String,
    },

    /// List the root tree of a commit
    Tree {
        /// Repository owner
        owner: String,
        /// Repository name
        repo: String,
        /// Commit SHA
        sha: String,
    },

    /// Print a file from the root tree of a commit
    ShowBlob {
        /// Repository owner
        owner: String,
        /// Repository name
        repo: String,
        /// Commit SHA
        sha: String,
        /// Path of the file in the tree
        path: String,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<FileConfig> {
    let mut config = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };

    if let Some(api_url) = &cli.api_url {
        config.api_url = Some(api_url.clone());
    }
    if let Some(cache_url) = &cli.cache_url {
        config.cache_url = Some(cache_url.clone());
    }
    if cli.fast_cache {
        config.fast_cache = true;
    }
    if let Commands::Check { strict: true, .. } = cli.command {
        config.strict = true;
    }
    Ok(config)
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = load_config(&cli)?;
    let client = hubsync_github::GitHubClient::new(config.client_config())?;

    match cli.command {
        Commands::Check {
            owner,
            repo,
            branch,
            path,
            ..
        } => {
            commands::check(client, config.sync_policy(), &path, &owner, &repo, &branch).await
        }
        Commands::Latest { owner, repo, branch } => {
            commands::latest(&client, &owner, &repo, &branch).await?;
            Ok(true)
        }
        Commands::Compare {
            owner,
            repo,
            base,
            head,
        } => {
            commands::compare(&client, &owner, &repo, &base, &head).await?;
            Ok(true)
        }
        Commands::Tree { owner, repo, sha } => {
            commands::tree(&client, &owner, &repo, &sha).await?;
            Ok(true)
        }
        Commands::ShowBlob {
            owner,
            repo,
            sha,
            path,
        } => {
            commands::show_blob(&client, &owner, &repo, &sha, &path).await?;
            Ok(true)
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("hubsync={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "hubsync",
            "--api-url",
            "https://git.example.com/api/v3",
            "--fast-cache",
            "check",
            "octocat",
            "hello",
            "master",
            "--strict",
        ]);

        let config = load_config(&cli).unwrap();
        assert_eq!(config.api_url.as_deref(), Some("https://git.example.com/api/v3"));
        assert!(config.fast_cache);
        assert!(config.strict);
    }

    #[test]
    fn check_defaults_to_current_directory() {
        let cli = Cli::parse_from(["hubsync", "check", "octocat", "hello", "master"]);
        match cli.command {
            Commands::Check { path, strict, .. } => {
                assert_eq!(path, PathBuf::from("."));
                assert!(!strict);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
