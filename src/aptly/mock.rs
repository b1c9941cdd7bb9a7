// src/aptly/mock.rs

//! In-memory aptly emulator
//!
//! `MockAptly` understands the subset of aptly commands this crate issues
//! and reproduces aptly's listing formats and refusal rules:
//!
//! - duplicate repo/snapshot/publication names are rejected
//! - a published snapshot cannot be dropped, even with `-force`
//! - a snapshot used as a merge source needs `-force` to be dropped
//! - a repo with snapshots needs `-force` to be dropped
//!
//! Clones share state, so a test can hand one clone to [`super::Aptly`] and
//! inspect the store through another.

use super::{AptlyRunner, ToolOutput};
use crate::error::Result;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

#[derive(Debug, Clone, Default)]
struct MockRepo {
    architectures: Vec<String>,
    comment: String,
    packages: Vec<String>,
}

#[derive(Debug, Clone)]
struct MockSnapshot {
    name: String,
    description: String,
    sources: Vec<String>,
    architectures: Vec<String>,
}

#[derive(Debug, Clone)]
struct MockPublication {
    prefix: String,
    distribution: String,
    architectures: Vec<String>,
    components: Vec<(String, String)>,
}

impl MockPublication {
    fn key(&self) -> String {
        format!("{}/{}", self.prefix, self.distribution)
    }
}

#[derive(Debug, Default)]
struct MockState {
    repos: BTreeMap<String, MockRepo>,
    snapshots: Vec<MockSnapshot>,
    publications: Vec<MockPublication>,
    calls: Vec<Vec<String>>,
    failures: Vec<String>,
}

/// Shared-state aptly stand-in for tests
#[derive(Debug, Clone, Default)]
pub struct MockAptly {
    state: Rc<RefCell<MockState>>,
}

/// Flags (`-name` / `-name=value`) and positional arguments of one command
struct ParsedArgs {
    flags: BTreeMap<String, String>,
    positional: Vec<String>,
}

impl ParsedArgs {
    fn parse(args: &[String]) -> Self {
        let mut flags = BTreeMap::new();
        let mut positional = Vec::new();
        for arg in args {
            match arg.strip_prefix('-') {
                Some(flag) if !flag.is_empty() => match flag.split_once('=') {
                    Some((key, value)) => {
                        flags.insert(key.to_string(), value.to_string());
                    }
                    None => {
                        flags.insert(flag.to_string(), String::new());
                    }
                },
                _ => positional.push(arg.clone()),
            }
        }
        Self { flags, positional }
    }

    fn has(&self, flag: &str) -> bool {
        self.flags.contains_key(flag)
    }

    fn list(&self, flag: &str) -> Vec<String> {
        self.flags
            .get(flag)
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn fail(message: impl Into<String>) -> ToolOutput {
    ToolOutput::failed(format!("ERROR: {}", message.into()))
}

impl MockAptly {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every command whose joined arguments start with `prefix` fail
    pub fn fail_on(&self, prefix: &str) {
        self.state.borrow_mut().failures.push(prefix.to_string());
    }

    pub fn clear_failures(&self) {
        self.state.borrow_mut().failures.clear();
    }

    /// Every invocation seen so far
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.state.borrow().calls.clone()
    }

    /// Invocations other than `show`/`list` queries
    pub fn mutation_calls(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c.get(1).map(String::as_str), Some("show" | "list")))
            .collect()
    }

    pub fn has_repo(&self, name: &str) -> bool {
        self.state.borrow().repos.contains_key(name)
    }

    pub fn has_snapshot(&self, name: &str) -> bool {
        self.state.borrow().snapshots.iter().any(|s| s.name == name)
    }

    pub fn has_publication(&self, prefix_dist: &str) -> bool {
        self.state
            .borrow()
            .publications
            .iter()
            .any(|p| p.key() == prefix_dist)
    }

    pub fn repo_comment(&self, name: &str) -> Option<String> {
        self.state.borrow().repos.get(name).map(|r| r.comment.clone())
    }

    pub fn repo_architectures(&self, name: &str) -> Vec<String> {
        self.state
            .borrow()
            .repos
            .get(name)
            .map(|r| r.architectures.clone())
            .unwrap_or_default()
    }

    pub fn repo_packages(&self, name: &str) -> Vec<String> {
        self.state
            .borrow()
            .repos
            .get(name)
            .map(|r| r.packages.clone())
            .unwrap_or_default()
    }

    pub fn snapshot_sources(&self, name: &str) -> Vec<String> {
        self.state
            .borrow()
            .snapshots
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.sources.clone())
            .unwrap_or_default()
    }

    /// Components of a publication as `(component, snapshot)` pairs
    pub fn publication_components(&self, prefix_dist: &str) -> Vec<(String, String)> {
        self.state
            .borrow()
            .publications
            .iter()
            .find(|p| p.key() == prefix_dist)
            .map(|p| p.components.clone())
            .unwrap_or_default()
    }

    fn dispatch(&self, args: &[String]) -> ToolOutput {
        let (Some(noun), Some(verb)) = (args.first(), args.get(1)) else {
            return fail("missing command");
        };
        let parsed = ParsedArgs::parse(&args[2..]);
        let mut state = self.state.borrow_mut();

        match (noun.as_str(), verb.as_str()) {
            ("repo", "create") => state.repo_create(&parsed),
            ("repo", "show") => state.repo_show(&parsed),
            ("repo", "list") => state.repo_list(),
            ("repo", "add") => state.repo_add(&parsed),
            ("repo", "drop") => state.repo_drop(&parsed),
            ("snapshot", "create") => state.snapshot_create(&parsed),
            ("snapshot", "merge") => state.snapshot_merge(&parsed),
            ("snapshot", "show") => state.snapshot_show(&parsed),
            ("snapshot", "list") => state.snapshot_list(),
            ("snapshot", "drop") => state.snapshot_drop(&parsed),
            ("publish", "snapshot") => state.publish_snapshot(&parsed),
            ("publish", "show") => state.publish_show(&parsed),
            ("publish", "list") => state.publish_list(),
            ("publish", "drop") => state.publish_drop(&parsed),
            _ => fail(format!("unknown command: {} {}", noun, verb)),
        }
    }
}

impl AptlyRunner for MockAptly {
    fn run(&self, args: &[String]) -> Result<ToolOutput> {
        let joined = args.join(" ");
        let injected = {
            let mut state = self.state.borrow_mut();
            state.calls.push(args.to_vec());
            state.failures.iter().any(|f| joined.starts_with(f.as_str()))
        };
        if injected {
            return Ok(fail(format!("injected failure for '{}'", joined)));
        }
        Ok(self.dispatch(args))
    }
}

impl MockState {
    fn snapshot(&self, name: &str) -> Option<&MockSnapshot> {
        self.snapshots.iter().find(|s| s.name == name)
    }

    fn publication_index(&self, parsed: &ParsedArgs) -> Option<usize> {
        let distribution = parsed.positional.first()?;
        let prefix = parsed
            .positional
            .get(1)
            .map(String::as_str)
            .unwrap_or(".");
        self.publications
            .iter()
            .position(|p| &p.distribution == distribution && p.prefix == prefix)
    }

    fn repo_create(&mut self, parsed: &ParsedArgs) -> ToolOutput {
        let Some(name) = parsed.positional.first() else {
            return fail("repo create requires a name");
        };
        if self.repos.contains_key(name) {
            return fail(format!("local repo with name {} already exists", name));
        }
        let repo = MockRepo {
            architectures: parsed.list("architectures"),
            comment: parsed.flags.get("comment").cloned().unwrap_or_default(),
            packages: Vec::new(),
        };
        self.repos.insert(name.clone(), repo);
        ToolOutput::ok(format!(
            "\nLocal repo [{}] successfully added.\nYou can run 'aptly repo add {} ...' to add packages to repository.\n",
            name, name
        ))
    }

    fn repo_show(&self, parsed: &ParsedArgs) -> ToolOutput {
        let Some(name) = parsed.positional.first() else {
            return fail("repo show requires a name");
        };
        match self.repos.get(name) {
            Some(repo) => ToolOutput::ok(format!(
                "Name: {}\nComment: {}\nNumber of packages: {}\n",
                name,
                repo.comment,
                repo.packages.len()
            )),
            None => fail(format!("unable to show: local repo with name {} not found", name)),
        }
    }

    fn repo_list(&self) -> ToolOutput {
        if self.repos.is_empty() {
            return ToolOutput::ok("No local repositories found, create one with `aptly repo create ...`.\n");
        }
        let mut out = String::from("List of local repos:\n");
        for (name, repo) in &self.repos {
            if repo.comment.is_empty() {
                out.push_str(&format!(" * [{}] (packages: {})\n", name, repo.packages.len()));
            } else {
                out.push_str(&format!(
                    " * [{}]: {} (packages: {})\n",
                    name,
                    repo.comment,
                    repo.packages.len()
                ));
            }
        }
        out.push_str("\nTo get more information about local repository, run `aptly repo show <name>`.\n");
        ToolOutput::ok(out)
    }

    fn repo_add(&mut self, parsed: &ParsedArgs) -> ToolOutput {
        let Some((name, files)) = parsed.positional.split_first() else {
            return fail("repo add requires a name");
        };
        let Some(repo) = self.repos.get_mut(name) else {
            return fail(format!("unable to add: local repo with name {} not found", name));
        };
        repo.packages.extend(files.iter().cloned());
        ToolOutput::ok(format!("Loading packages...\nAdded {} package(s)\n", files.len()))
    }

    fn repo_drop(&mut self, parsed: &ParsedArgs) -> ToolOutput {
        let Some(name) = parsed.positional.first() else {
            return fail("repo drop requires a name");
        };
        if !self.repos.contains_key(name) {
            return fail(format!("unable to drop: local repo with name {} not found", name));
        }
        let origin = format!("Snapshot from local repo [{}]", name);
        let has_snapshots = self.snapshots.iter().any(|s| s.description == origin);
        if has_snapshots && !parsed.has("force") {
            return fail(format!(
                "unable to drop: local repo {} has snapshots, use -force to override",
                name
            ));
        }
        self.repos.remove(name);
        ToolOutput::ok(format!("Local repo `{}` has been removed.\n", name))
    }

    fn snapshot_create(&mut self, parsed: &ParsedArgs) -> ToolOutput {
        let positional: Vec<&str> = parsed.positional.iter().map(String::as_str).collect();
        let (name, description, architectures) = match positional.as_slice() {
            [name, "from", "repo", repo] => {
                let Some(source) = self.repos.get(*repo) else {
                    return fail(format!("unable to create snapshot: local repo with name {} not found", repo));
                };
                (
                    name.to_string(),
                    format!("Snapshot from local repo [{}]", repo),
                    source.architectures.clone(),
                )
            }
            [name, "empty"] => (name.to_string(), "Created as empty".to_string(), Vec::new()),
            _ => return fail("unsupported snapshot create syntax"),
        };
        if self.snapshot(&name).is_some() {
            return fail(format!("unable to create snapshot: snapshot with name {} already exists", name));
        }
        self.snapshots.push(MockSnapshot {
            name: name.clone(),
            description,
            sources: Vec::new(),
            architectures,
        });
        ToolOutput::ok(format!(
            "\nSnapshot {} successfully created.\nYou can run 'aptly publish snapshot {}' to publish snapshot as Debian repository.\n",
            name, name
        ))
    }

    fn snapshot_merge(&mut self, parsed: &ParsedArgs) -> ToolOutput {
        let Some((dest, sources)) = parsed.positional.split_first() else {
            return fail("snapshot merge requires a destination");
        };
        if sources.is_empty() {
            return fail("snapshot merge requires at least one source");
        }
        if self.snapshot(dest).is_some() {
            return fail(format!("unable to create snapshot: snapshot with name {} already exists", dest));
        }
        let mut architectures = BTreeSet::new();
        for source in sources {
            match self.snapshot(source) {
                Some(s) => architectures.extend(s.architectures.iter().cloned()),
                None => return fail(format!("unable to load snapshot: snapshot with name {} not found", source)),
            }
        }
        let quoted: Vec<String> = sources.iter().map(|s| format!("'{}'", s)).collect();
        self.snapshots.push(MockSnapshot {
            name: dest.clone(),
            description: format!("Merged from sources: {}", quoted.join(", ")),
            sources: sources.to_vec(),
            architectures: architectures.into_iter().collect(),
        });
        ToolOutput::ok(format!("\nSnapshot {} successfully created.\n", dest))
    }

    fn snapshot_show(&self, parsed: &ParsedArgs) -> ToolOutput {
        let Some(name) = parsed.positional.first() else {
            return fail("snapshot show requires a name");
        };
        match self.snapshot(name) {
            Some(s) => ToolOutput::ok(format!("Name: {}\nDescription: {}\n", s.name, s.description)),
            None => fail(format!("unable to show: snapshot with name {} not found", name)),
        }
    }

    fn snapshot_list(&self) -> ToolOutput {
        if self.snapshots.is_empty() {
            return ToolOutput::ok("\nNo snapshots found, create one with `aptly snapshot create...`.\n");
        }
        let mut out = String::from("List of snapshots:\n");
        for s in &self.snapshots {
            out.push_str(&format!(" * [{}]: {}\n", s.name, s.description));
        }
        out.push_str("\nTo get more information about snapshot, run `aptly snapshot show <name>`.\n");
        ToolOutput::ok(out)
    }

    fn snapshot_drop(&mut self, parsed: &ParsedArgs) -> ToolOutput {
        let Some(name) = parsed.positional.first() else {
            return fail("snapshot drop requires a name");
        };
        if self.snapshot(name).is_none() {
            return fail(format!("unable to drop: snapshot with name {} not found", name));
        }
        let published = self
            .publications
            .iter()
            .any(|p| p.components.iter().any(|(_, s)| s == name));
        if published {
            return fail("unable to drop: snapshot is published");
        }
        let referenced = self.snapshots.iter().any(|s| s.sources.contains(name));
        if referenced && !parsed.has("force") {
            return fail("won't delete snapshot that was used as source for other snapshots, use -force to override");
        }
        self.snapshots.retain(|s| &s.name != name);
        ToolOutput::ok(format!("Snapshot `{}` has been dropped.\n", name))
    }

    fn publish_snapshot(&mut self, parsed: &ParsedArgs) -> ToolOutput {
        let distribution = parsed.flags.get("distribution").cloned().unwrap_or_default();
        if distribution.is_empty() {
            return fail("unable to publish: distribution is required");
        }
        let mut components = parsed.list("component");
        if components.is_empty() {
            components.push("main".to_string());
        }
        if parsed.positional.len() < components.len() {
            return fail("mismatch in number of components and snapshots");
        }
        let snapshots = &parsed.positional[..components.len()];
        let prefix = parsed
            .positional
            .get(components.len())
            .cloned()
            .unwrap_or_else(|| ".".to_string());

        let unique: BTreeSet<&String> = components.iter().collect();
        if unique.len() != components.len() {
            return fail("duplicate component name");
        }
        let key = format!("{}/{}", prefix, distribution);
        if self.publications.iter().any(|p| p.key() == key) {
            return fail(format!(
                "prefix/distribution {} already used by another published repo",
                key
            ));
        }
        let mut architectures: BTreeSet<String> = parsed.list("architectures").into_iter().collect();
        for snapshot in snapshots {
            match self.snapshot(snapshot) {
                Some(s) if parsed.list("architectures").is_empty() => {
                    architectures.extend(s.architectures.iter().cloned())
                }
                Some(_) => {}
                None => return fail(format!("unable to publish: snapshot with name {} not found", snapshot)),
            }
        }

        self.publications.push(MockPublication {
            prefix,
            distribution,
            architectures: architectures.into_iter().collect(),
            components: components
                .into_iter()
                .zip(snapshots.iter().cloned())
                .collect(),
        });
        ToolOutput::ok(format!("\nSnapshot has been successfully published as {}.\n", key))
    }

    fn publish_show(&self, parsed: &ParsedArgs) -> ToolOutput {
        match self.publication_index(parsed) {
            Some(idx) => {
                let p = &self.publications[idx];
                ToolOutput::ok(format!(
                    "Prefix: {}\nDistribution: {}\nArchitectures: {}\n",
                    p.prefix,
                    p.distribution,
                    p.architectures.join(" ")
                ))
            }
            None => fail("unable to show: published repo not found"),
        }
    }

    fn publish_list(&self) -> ToolOutput {
        if self.publications.is_empty() {
            return ToolOutput::ok("No snapshots/local repos have been published. Publish a snapshot by running `aptly publish snapshot ...`.\n");
        }
        let mut out = String::from("Published repositories:\n");
        for p in &self.publications {
            let name = if p.prefix == "." {
                p.distribution.clone()
            } else {
                p.key()
            };
            let groups: Vec<String> = p
                .components
                .iter()
                .map(|(component, snapshot)| {
                    let description = self
                        .snapshot(snapshot)
                        .map(|s| s.description.clone())
                        .unwrap_or_default();
                    format!("{{{}: [{}]: {}}}", component, snapshot, description)
                })
                .collect();
            out.push_str(&format!(
                "  * {} [{}] publishes {}\n",
                name,
                p.architectures.join(", "),
                groups.join(", ")
            ));
        }
        ToolOutput::ok(out)
    }

    fn publish_drop(&mut self, parsed: &ParsedArgs) -> ToolOutput {
        match self.publication_index(parsed) {
            Some(idx) => {
                self.publications.remove(idx);
                ToolOutput::ok("\nPublished repository has been removed successfully.\n")
            }
            None => fail("unable to remove: published repo not found"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(mock: &MockAptly, args: &[&str]) -> ToolOutput {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        mock.run(&args).unwrap()
    }

    #[test]
    fn test_repo_lifecycle() {
        let mock = MockAptly::new();
        assert!(run(&mock, &["repo", "create", "-architectures=amd64", "myapp-amd64-main"]).success);
        assert!(!run(&mock, &["repo", "create", "myapp-amd64-main"]).success);
        assert!(run(&mock, &["repo", "show", "myapp-amd64-main"]).success);
        assert_eq!(mock.repo_architectures("myapp-amd64-main"), vec!["amd64"]);
        assert!(run(&mock, &["repo", "drop", "myapp-amd64-main"]).success);
        assert!(!mock.has_repo("myapp-amd64-main"));
    }

    #[test]
    fn test_merge_source_needs_force() {
        let mock = MockAptly::new();
        run(&mock, &["repo", "create", "a-amd64-main"]);
        run(&mock, &["snapshot", "create", "a-amd64-main-1", "from", "repo", "a-amd64-main"]);
        run(&mock, &["snapshot", "merge", "a-main-1", "a-amd64-main-1"]);

        assert!(!run(&mock, &["snapshot", "drop", "a-amd64-main-1"]).success);
        assert!(run(&mock, &["snapshot", "drop", "-force", "a-amd64-main-1"]).success);
    }

    #[test]
    fn test_published_snapshot_cannot_be_dropped() {
        let mock = MockAptly::new();
        run(&mock, &["snapshot", "create", "s-empty", "empty"]);
        assert!(run(&mock, &["publish", "snapshot", "-distribution=s", "-component=main", "s-empty", "p"]).success);
        assert!(mock.has_publication("p/s"));
        assert!(!run(&mock, &["snapshot", "drop", "-force", "s-empty"]).success);
        assert!(run(&mock, &["publish", "drop", "s", "p"]).success);
        assert!(run(&mock, &["snapshot", "drop", "s-empty"]).success);
    }

    #[test]
    fn test_injected_failure() {
        let mock = MockAptly::new();
        mock.fail_on("repo create");
        assert!(!run(&mock, &["repo", "create", "a-amd64-main"]).success);
        assert!(!mock.has_repo("a-amd64-main"));
        assert_eq!(mock.calls().len(), 1);
    }
}
