// src/probe.rs

//! Existence checks and typed listings over aptly
//!
//! Probes are fail-closed: if aptly cannot be run or rejects the query, the
//! entity is reported as absent and listings come back empty. Callers turn
//! that into "doesn't exist" diagnostics instead of crashing.

use crate::aptly::Aptly;
use crate::aptly::listing::{self, PublicationEntry};
use crate::naming::PublicationName;
use std::collections::BTreeSet;

/// Read-only view of the aptly store
pub struct Probe<'a> {
    aptly: &'a Aptly,
}

impl<'a> Probe<'a> {
    pub fn new(aptly: &'a Aptly) -> Self {
        Self { aptly }
    }

    pub fn repo_exists(&self, name: &str) -> bool {
        self.aptly.query(&["repo", "show", name]).is_some()
    }

    pub fn snapshot_exists(&self, name: &str) -> bool {
        self.aptly.query(&["snapshot", "show", name]).is_some()
    }

    pub fn publication_exists(&self, publication: &PublicationName) -> bool {
        self.aptly
            .query(&[
                "publish",
                "show",
                publication.distribution.as_str(),
                publication.prefix.as_str(),
            ])
            .is_some()
    }

    /// All local repository names
    pub fn list_repos(&self) -> BTreeSet<String> {
        let output = self.aptly.query(&["repo", "list"]).unwrap_or_default();
        listing::parse_bracketed_entries(&output)
            .into_iter()
            .map(|(name, _)| name)
            .collect()
    }

    /// Snapshot names, optionally only those whose listing mentions `[repo]`
    pub fn list_snapshots(&self, filter_repo: Option<&str>) -> BTreeSet<String> {
        let output = self.aptly.query(&["snapshot", "list"]).unwrap_or_default();
        listing::parse_bracketed_entries(&output)
            .into_iter()
            .filter(|(_, line)| filter_repo.is_none_or(|repo| listing::mentions(line, repo)))
            .map(|(name, _)| name)
            .collect()
    }

    fn publication_entries(&self) -> Vec<PublicationEntry> {
        let output = self.aptly.query(&["publish", "list"]).unwrap_or_default();
        listing::parse_publications(&output)
    }

    /// Publications whose listing mentions every name in `names`
    ///
    /// This is a substring match on `[name]`, so a name that is bracketed
    /// inside another entity's description also matches.
    pub fn list_publications<S: AsRef<str>>(&self, names: &[S]) -> BTreeSet<PublicationName> {
        self.publication_entries()
            .into_iter()
            .filter(|entry| {
                names
                    .iter()
                    .all(|name| listing::mentions(&entry.line, name.as_ref()))
            })
            .map(|entry| entry.name)
            .collect()
    }

    /// Names backing one publication, in component order
    pub fn list_publication_backing(&self, publication: &PublicationName) -> Vec<String> {
        self.publication_entries()
            .into_iter()
            .find(|entry| &entry.name == publication)
            .map(|entry| listing::parse_publishes_clause(&entry.line))
            .unwrap_or_default()
    }

    pub fn is_published<S: AsRef<str>>(&self, names: &[S]) -> bool {
        !self.list_publications(names).is_empty()
    }

    pub fn has_snapshots(&self, repo: &str) -> bool {
        !self.list_snapshots(Some(repo)).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aptly::ExecMode;
    use crate::aptly::mock::MockAptly;
    use crate::aptly::AptlyRunner;

    fn seeded() -> (MockAptly, Aptly) {
        let mock = MockAptly::new();
        for args in [
            "repo create -architectures=amd64 myapp-amd64-main",
            "repo create -architectures=arm64 myapp-arm64-main",
            "snapshot create myapp-amd64-main-1 from repo myapp-amd64-main",
            "snapshot create myapp-arm64-main-1 from repo myapp-arm64-main",
            "publish snapshot -distribution=myapp -component=main myapp-amd64-main-1 1",
        ] {
            let args: Vec<String> = args.split(' ').map(String::from).collect();
            assert!(mock.run(&args).unwrap().success, "seed failed: {:?}", args);
        }
        let aptly = Aptly::new(Box::new(mock.clone()), ExecMode::Live);
        (mock, aptly)
    }

    #[test]
    fn test_existence_checks() {
        let (_mock, aptly) = seeded();
        let probe = Probe::new(&aptly);
        assert!(probe.repo_exists("myapp-amd64-main"));
        assert!(!probe.repo_exists("myapp-i386-main"));
        assert!(probe.snapshot_exists("myapp-amd64-main-1"));
        assert!(!probe.snapshot_exists("myapp-amd64-main-2"));
        assert!(probe.publication_exists(&PublicationName::new("1", "myapp")));
        assert!(!probe.publication_exists(&PublicationName::new("2", "myapp")));
    }

    #[test]
    fn test_list_snapshots_filter() {
        let (_mock, aptly) = seeded();
        let probe = Probe::new(&aptly);
        assert_eq!(probe.list_repos().len(), 2);
        assert_eq!(probe.list_snapshots(None).len(), 2);
        let filtered = probe.list_snapshots(Some("myapp-arm64-main"));
        assert_eq!(
            filtered.into_iter().collect::<Vec<_>>(),
            vec!["myapp-arm64-main-1"]
        );
        assert!(probe.has_snapshots("myapp-amd64-main"));
        assert!(!probe.has_snapshots("other-amd64-main"));
    }

    #[test]
    fn test_publication_filter_is_conjunctive() {
        let (_mock, aptly) = seeded();
        let probe = Probe::new(&aptly);
        assert!(probe.is_published(&["myapp-amd64-main-1"]));
        // The repo is bracketed in the snapshot's description
        assert!(probe.is_published(&["myapp-amd64-main"]));
        assert!(!probe.is_published(&["myapp-amd64-main-1", "myapp-arm64-main-1"]));
        assert!(!probe.is_published(&["myapp-arm64-main-1"]));
        assert_eq!(probe.list_publications::<&str>(&[]).len(), 1);
    }

    #[test]
    fn test_publication_backing() {
        let (_mock, aptly) = seeded();
        let probe = Probe::new(&aptly);
        assert_eq!(
            probe.list_publication_backing(&PublicationName::new("1", "myapp")),
            vec!["myapp-amd64-main-1"]
        );
        assert!(probe
            .list_publication_backing(&PublicationName::new("9", "myapp"))
            .is_empty());
    }

    #[test]
    fn test_missing_tool_reads_as_absent() {
        let cli = crate::aptly::AptlyCli::new("/nonexistent/bin/aptly", None);
        let aptly = Aptly::new(Box::new(cli), ExecMode::Live);
        let probe = Probe::new(&aptly);
        assert!(!probe.repo_exists("myapp-amd64-main"));
        assert!(probe.list_repos().is_empty());
        assert!(!probe.is_published(&["anything"]));
    }
}
