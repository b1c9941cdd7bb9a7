// src/cli/publish.rs
//! Publication commands

use clap::Subcommand;

#[derive(Subcommand)]
pub enum PublishCommands {
    /// Publish snapshots, one component per snapshot
    Create {
        /// Snapshots to publish
        #[arg(required = true)]
        snapshots: Vec<String>,

        /// Publication prefix, or prefix/distribution
        ///
        /// Defaults to the first snapshot's suffix and base.
        #[arg(short, long, value_name = "PREFIX[/DIST]")]
        prefix: Option<String>,
    },

    /// Drop a publication
    Drop {
        /// Publication (prefix/distribution)
        publication: String,

        /// Also drop the snapshots backing the publication
        #[arg(short = 'a', long)]
        all: bool,

        /// Output the teardown report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List publications
    List {
        /// Only publications that mention every one of these names
        names: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the snapshots backing a publication
    Show {
        /// Publication (prefix/distribution)
        publication: String,
    },
}
