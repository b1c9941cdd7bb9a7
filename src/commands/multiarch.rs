// src/commands/multiarch.rs
//! Multi-architecture snapshot commands

use super::{print_report, Context};
use anyhow::Result;
use aptlyctl::multiarch::MultiArch;
use tracing::info;

pub fn cmd_multiarch_create(ctx: &Context, repos: &[String], suffix: Option<&str>) -> Result<()> {
    info!("Creating multi-arch snapshot from {} repositories", repos.len());
    let unified = MultiArch::new(&ctx.aptly)
        .with_suffix_format(ctx.config.suffix_format())
        .snapshot_multiarch(repos, suffix)?;
    println!("{}", unified);
    Ok(())
}

pub fn cmd_multiarch_drop(ctx: &Context, name: &str, json: bool) -> Result<()> {
    let report = MultiArch::new(&ctx.aptly).drop_multiarch(name)?;
    print_report(ctx, &report, json)
}
