// src/commands/snapshot.rs
//! Snapshot commands

use super::{print_json, Context};
use anyhow::Result;
use aptlyctl::probe::Probe;
use aptlyctl::snapshot::SnapshotManager;

fn manager(ctx: &Context) -> SnapshotManager<'_> {
    SnapshotManager::new(&ctx.aptly).with_suffix_format(ctx.config.suffix_format())
}

pub fn cmd_snapshot_create(ctx: &Context, repo: &str, suffix: Option<&str>) -> Result<()> {
    let name = manager(ctx).snapshot_repo(repo, suffix)?;
    println!("{}", name);
    Ok(())
}

pub fn cmd_snapshot_merge(ctx: &Context, dest: &str, sources: &[String], latest: bool) -> Result<()> {
    manager(ctx).merge_snapshots(dest, sources, latest)?;
    println!("{}", dest);
    Ok(())
}

pub fn cmd_snapshot_drop(ctx: &Context, name: &str, force: bool) -> Result<()> {
    manager(ctx).drop_snapshot(name, force)?;
    println!("{}", name);
    Ok(())
}

pub fn cmd_snapshot_list(ctx: &Context, repo: Option<&str>, json: bool) -> Result<()> {
    let snapshots = Probe::new(&ctx.aptly).list_snapshots(repo);
    if json {
        return print_json(&snapshots);
    }
    for snapshot in &snapshots {
        println!("{}", snapshot);
    }
    Ok(())
}
