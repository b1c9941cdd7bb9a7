// src/commands/publish.rs
//! Publication commands

use super::{print_json, print_report, Context};
use anyhow::Result;
use aptlyctl::naming::PublicationName;
use aptlyctl::publish::{PublicationManager, PublishTarget};

fn manager(ctx: &Context) -> PublicationManager<'_> {
    PublicationManager::new(&ctx.aptly).with_options(ctx.config.publish_options())
}

pub fn cmd_publish_create(ctx: &Context, snapshots: &[String], prefix: Option<&str>) -> Result<()> {
    let target = prefix.map(PublishTarget::parse);
    let publication = manager(ctx).publish_multiarch(target.as_ref(), snapshots)?;
    println!("{}", publication);
    Ok(())
}

pub fn cmd_publish_drop(ctx: &Context, publication: &str, all: bool, json: bool) -> Result<()> {
    let publication = PublicationName::parse(publication)?;
    let report = manager(ctx).drop_publication(&publication, all)?;
    print_report(ctx, &report, json)
}

pub fn cmd_publish_list(ctx: &Context, names: &[String], json: bool) -> Result<()> {
    let publications = manager(ctx).list_publications(names);
    if json {
        return print_json(&publications);
    }
    for publication in &publications {
        println!("{}", publication);
    }
    Ok(())
}

pub fn cmd_publish_show(ctx: &Context, publication: &str) -> Result<()> {
    let publication = PublicationName::parse(publication)?;
    for name in manager(ctx).list_publication_backing(&publication)? {
        println!("{}", name);
    }
    Ok(())
}
