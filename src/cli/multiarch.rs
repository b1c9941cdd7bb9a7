// src/cli/multiarch.rs
//! Multi-architecture snapshot commands

use clap::Subcommand;

#[derive(Subcommand)]
pub enum MultiarchCommands {
    /// Snapshot per-arch repositories and merge them as base-component-suffix
    Create {
        /// Per-arch repositories (base-arch-component), in merge order
        #[arg(required = true)]
        repos: Vec<String>,

        /// Snapshot suffix (default: today's date)
        #[arg(short, long)]
        suffix: Option<String>,
    },

    /// Drop a unified snapshot and its per-arch constituents
    Drop {
        /// Unified snapshot name (base-component-suffix)
        name: String,

        /// Output the teardown report as JSON
        #[arg(long)]
        json: bool,
    },
}
