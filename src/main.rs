// src/main.rs

use anyhow::Result;
use aptlyctl::aptly::{Aptly, AptlyCli};
use aptlyctl::config::{Config, Overrides, SearchPaths};
use clap::{CommandFactory, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands, MultiarchCommands, PublishCommands, RepoCommands, SnapshotCommands};
use commands::Context;

/// Log level used when RUST_LOG is not set
fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout only carries results
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter(cli.verbose))),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "aptlyctl", &mut std::io::stdout());
        return Ok(());
    }

    let (mut config, source) = Config::load(cli.config.as_deref(), &SearchPaths::from_env())?;
    if let Some(path) = &source {
        debug!("Using config file {}", path.display());
    }
    config.apply(&Overrides {
        aptly_bin: cli.aptly_bin.clone(),
        aptly_config: cli.aptly_config.clone(),
        dry_run: cli.dry_run,
    });

    let runner = AptlyCli::new(config.aptly_bin(), config.aptly_config.clone());
    let aptly = Aptly::new(Box::new(runner), config.exec_mode());
    let ctx = Context { aptly, config };

    match cli.command {
        Commands::Repo(cmd) => match cmd {
            RepoCommands::Create { name, architectures } => {
                commands::cmd_repo_create(&ctx, &name, architectures.as_deref())
            }
            RepoCommands::Drop { name, force } => commands::cmd_repo_drop(&ctx, &name, force),
            RepoCommands::Add {
                name,
                files,
                remove_files,
            } => commands::cmd_repo_add(&ctx, &name, &files, remove_files),
            RepoCommands::List { json } => commands::cmd_repo_list(&ctx, json),
        },
        Commands::Snapshot(cmd) => match cmd {
            SnapshotCommands::Create { repo, suffix } => {
                commands::cmd_snapshot_create(&ctx, &repo, suffix.as_deref())
            }
            SnapshotCommands::Merge {
                dest,
                sources,
                latest,
            } => commands::cmd_snapshot_merge(&ctx, &dest, &sources, latest),
            SnapshotCommands::Drop { name, force } => {
                commands::cmd_snapshot_drop(&ctx, &name, force)
            }
            SnapshotCommands::List { repo, json } => {
                commands::cmd_snapshot_list(&ctx, repo.as_deref(), json)
            }
        },
        Commands::Multiarch(cmd) => match cmd {
            MultiarchCommands::Create { repos, suffix } => {
                commands::cmd_multiarch_create(&ctx, &repos, suffix.as_deref())
            }
            MultiarchCommands::Drop { name, json } => {
                commands::cmd_multiarch_drop(&ctx, &name, json)
            }
        },
        Commands::Publish(cmd) => match cmd {
            PublishCommands::Create { snapshots, prefix } => {
                commands::cmd_publish_create(&ctx, &snapshots, prefix.as_deref())
            }
            PublishCommands::Drop {
                publication,
                all,
                json,
            } => commands::cmd_publish_drop(&ctx, &publication, all, json),
            PublishCommands::List { names, json } => {
                commands::cmd_publish_list(&ctx, &names, json)
            }
            PublishCommands::Show { publication } => {
                commands::cmd_publish_show(&ctx, &publication)
            }
        },
        Commands::Completions { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_from_verbosity() {
        assert_eq!(default_filter(0), "warn");
        assert_eq!(default_filter(1), "info");
        assert_eq!(default_filter(2), "debug");
        assert_eq!(default_filter(5), "debug");
    }
}
