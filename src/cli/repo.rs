// src/cli/repo.rs
//! Local repository commands

use clap::Subcommand;

#[derive(Subcommand)]
pub enum RepoCommands {
    /// Create a local repository named base-arch-component
    Create {
        /// Repository name
        name: String,

        /// Architectures to accept (default: the name's arch segment)
        #[arg(short, long, value_delimiter = ',')]
        architectures: Option<Vec<String>>,
    },

    /// Drop a local repository
    Drop {
        /// Repository name
        name: String,

        /// Drop even if snapshots were taken from it or it is published
        #[arg(short, long)]
        force: bool,
    },

    /// Add package files or directories to a repository
    Add {
        /// Repository name
        name: String,

        /// Package files or directories
        #[arg(required = true)]
        files: Vec<String>,

        /// Remove the files once they have been imported
        #[arg(short, long)]
        remove_files: bool,
    },

    /// List local repositories
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
