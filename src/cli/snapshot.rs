// src/cli/snapshot.rs
//! Snapshot commands

use clap::Subcommand;

#[derive(Subcommand)]
pub enum SnapshotCommands {
    /// Snapshot a repository as <repo>-<suffix>
    Create {
        /// Repository name
        repo: String,

        /// Snapshot suffix (default: today's date)
        #[arg(short, long)]
        suffix: Option<String>,
    },

    /// Merge snapshots into a new snapshot
    ///
    /// With no sources an empty snapshot is created.
    Merge {
        /// Name of the merged snapshot
        dest: String,

        /// Source snapshots, in merge order
        sources: Vec<String>,

        /// Keep only the latest version of each package
        #[arg(long)]
        latest: bool,
    },

    /// Drop a snapshot
    Drop {
        /// Snapshot name
        name: String,

        /// Drop even if other snapshots were merged from it
        #[arg(short, long)]
        force: bool,
    },

    /// List snapshots
    List {
        /// Only snapshots taken from this repository
        #[arg(long)]
        repo: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
