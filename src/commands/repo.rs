// src/commands/repo.rs
//! Local repository commands

use super::{print_json, Context};
use anyhow::Result;
use aptlyctl::probe::Probe;
use aptlyctl::repo::RepoManager;
use tracing::info;

pub fn cmd_repo_create(ctx: &Context, name: &str, architectures: Option<&[String]>) -> Result<()> {
    info!("Creating repository: {}", name);
    let repo = RepoManager::new(&ctx.aptly).create_repo(name, architectures)?;
    println!("{}", repo);
    Ok(())
}

pub fn cmd_repo_drop(ctx: &Context, name: &str, force: bool) -> Result<()> {
    info!("Dropping repository: {}", name);
    RepoManager::new(&ctx.aptly).drop_repo(name, force)?;
    println!("{}", name);
    Ok(())
}

pub fn cmd_repo_add(ctx: &Context, name: &str, files: &[String], remove_files: bool) -> Result<()> {
    info!("Adding {} path(s) to repository {}", files.len(), name);
    RepoManager::new(&ctx.aptly).add_packages(name, files, remove_files)?;
    println!("{}", name);
    Ok(())
}

pub fn cmd_repo_list(ctx: &Context, json: bool) -> Result<()> {
    let repos = Probe::new(&ctx.aptly).list_repos();
    if json {
        return print_json(&repos);
    }
    for repo in &repos {
        println!("{}", repo);
    }
    Ok(())
}
