// src/commands/mod.rs
//! Command handlers for the aptlyctl CLI

mod multiarch;
mod publish;
mod repo;
mod snapshot;

pub use multiarch::{cmd_multiarch_create, cmd_multiarch_drop};
pub use publish::{cmd_publish_create, cmd_publish_drop, cmd_publish_list, cmd_publish_show};
pub use repo::{cmd_repo_add, cmd_repo_create, cmd_repo_drop, cmd_repo_list};
pub use snapshot::{cmd_snapshot_create, cmd_snapshot_drop, cmd_snapshot_list, cmd_snapshot_merge};

use anyhow::Result;
use aptlyctl::aptly::{Aptly, ExecMode};
use aptlyctl::config::Config;
use aptlyctl::plan::TeardownReport;
use serde::Serialize;

/// Everything a handler needs: the aptly handle and the resolved config
pub struct Context {
    pub aptly: Aptly,
    pub config: Config,
}

/// One line per executed teardown step, or the whole report as JSON
fn print_report(ctx: &Context, report: &TeardownReport, json: bool) -> Result<()> {
    if json {
        return print_json(report);
    }
    for line in report_lines(ctx.aptly.mode(), report) {
        println!("{}", line);
    }
    Ok(())
}

fn report_lines(mode: ExecMode, report: &TeardownReport) -> Vec<String> {
    let marker = match mode {
        ExecMode::DryRun => "[dry-run] ",
        ExecMode::Live => "",
    };
    report
        .entries
        .iter()
        .map(|(step, outcome)| format!("{}{}: {}", marker, step, outcome))
        .collect()
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
