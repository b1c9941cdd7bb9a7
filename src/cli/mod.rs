// src/cli/mod.rs
//! CLI definitions for aptlyctl
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.
//!
//! Management contexts:
//! - `repo` - Local repositories (`base-arch-component`)
//! - `snapshot` - Snapshots of repositories and merges of snapshots
//! - `multiarch` - Unified multi-architecture snapshots
//! - `publish` - Publications (`prefix/distribution`)

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

mod multiarch;
mod publish;
mod repo;
mod snapshot;

pub use multiarch::MultiarchCommands;
pub use publish::PublishCommands;
pub use repo::RepoCommands;
pub use snapshot::SnapshotCommands;

#[derive(Parser)]
#[command(name = "aptlyctl")]
#[command(version)]
#[command(about = "Manage aptly repositories, snapshots and publications", long_about = None)]
pub struct Cli {
    /// Configuration file (default: $APTLYCTL_CONFIG, then the XDG and home locations)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// aptly binary to run
    #[arg(long, global = true, value_name = "BIN")]
    pub aptly_bin: Option<String>,

    /// aptly configuration file, passed as -config=
    #[arg(long, global = true, value_name = "FILE")]
    pub aptly_config: Option<PathBuf>,

    /// Print mutating aptly commands instead of running them
    #[arg(short = 'n', long, global = true)]
    pub dry_run: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Local repository management
    #[command(subcommand)]
    Repo(RepoCommands),

    /// Snapshot management
    #[command(subcommand)]
    Snapshot(SnapshotCommands),

    /// Multi-architecture snapshot management
    #[command(subcommand)]
    Multiarch(MultiarchCommands),

    /// Publication management
    #[command(subcommand)]
    Publish(PublishCommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["aptlyctl", "repo", "list", "-n", "-vv"]).unwrap();
        assert!(cli.dry_run);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Commands::Repo(RepoCommands::List { json: false })
        ));
    }

    #[test]
    fn test_architectures_are_comma_separated() {
        let cli =
            Cli::try_parse_from(["aptlyctl", "repo", "create", "myapp-amd64-main", "-a", "amd64,all"])
                .unwrap();
        match cli.command {
            Commands::Repo(RepoCommands::Create { name, architectures }) => {
                assert_eq!(name, "myapp-amd64-main");
                assert_eq!(architectures, Some(vec!["amd64".to_string(), "all".to_string()]));
            }
            _ => panic!("expected repo create"),
        }
    }

    #[test]
    fn test_teardown_commands_accept_json() {
        let cli = Cli::try_parse_from(["aptlyctl", "publish", "drop", "1/myapp", "-a", "--json"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Publish(PublishCommands::Drop {
                all: true,
                json: true,
                ..
            })
        ));
        let cli = Cli::try_parse_from(["aptlyctl", "multiarch", "drop", "myapp-main-1", "--json"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Multiarch(MultiarchCommands::Drop { json: true, .. })
        ));
    }

    #[test]
    fn test_multiarch_create_requires_repos() {
        assert!(Cli::try_parse_from(["aptlyctl", "multiarch", "create"]).is_err());
    }
}
