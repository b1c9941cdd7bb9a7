// src/snapshot.rs

//! Snapshot creation, merging and teardown

use crate::aptly::Aptly;
use crate::error::{EntityKind, Error, Result};
use crate::naming;
use crate::probe::Probe;
use tracing::info;

/// Creates, merges and drops snapshots
pub struct SnapshotManager<'a> {
    aptly: &'a Aptly,
    suffix_format: String,
}

impl<'a> SnapshotManager<'a> {
    pub fn new(aptly: &'a Aptly) -> Self {
        Self {
            aptly,
            suffix_format: naming::DEFAULT_SUFFIX_FORMAT.to_string(),
        }
    }

    /// Use a different strftime format for default suffixes
    pub fn with_suffix_format(mut self, format: impl Into<String>) -> Self {
        self.suffix_format = format.into();
        self
    }

    /// Suffix to use when the caller supplies none
    pub fn default_suffix(&self) -> String {
        naming::today_suffix(&self.suffix_format)
    }

    pub(crate) fn resolve_suffix(&self, suffix: Option<&str>) -> Result<String> {
        let suffix = match suffix {
            Some(s) => s.to_string(),
            None => self.default_suffix(),
        };
        if suffix.is_empty() || suffix.contains('-') {
            return Err(Error::malformed(
                suffix,
                "snapshot suffix must be a single non-empty segment",
            ));
        }
        Ok(suffix)
    }

    /// Take a point-in-time snapshot of `repo` named `repo-suffix`
    pub fn snapshot_repo(&self, repo: &str, suffix: Option<&str>) -> Result<String> {
        let suffix = self.resolve_suffix(suffix)?;
        let name = naming::snapshot_name(repo, &suffix);
        let probe = Probe::new(self.aptly);

        if !probe.repo_exists(repo) {
            return Err(Error::not_found(EntityKind::Repo, repo));
        }
        if probe.snapshot_exists(&name) {
            return Err(Error::already_exists(EntityKind::Snapshot, name));
        }

        self.create_from_repo(&name, repo)?;
        Ok(name)
    }

    pub(crate) fn create_from_repo(&self, name: &str, repo: &str) -> Result<()> {
        self.aptly.mutate(
            "create snapshot",
            &["snapshot", "create", name, "from", "repo", repo],
        )?;
        info!("Created snapshot {} from repository {}", name, repo);
        Ok(())
    }

    /// Merge `sources` into a new snapshot `dest`
    ///
    /// With no sources an empty snapshot is created. Sources are passed in
    /// order, so later sources win on conflicts; `latest` asks aptly to keep
    /// the newest version instead.
    pub fn merge_snapshots<S: AsRef<str>>(&self, dest: &str, sources: &[S], latest: bool) -> Result<()> {
        let probe = Probe::new(self.aptly);
        if probe.snapshot_exists(dest) {
            return Err(Error::already_exists(EntityKind::Snapshot, dest));
        }
        if let Some(missing) = sources.iter().find(|s| !probe.snapshot_exists(s.as_ref())) {
            return Err(Error::not_found(EntityKind::Snapshot, missing.as_ref()));
        }

        self.merge_unchecked(dest, sources, latest)
    }

    /// Merge without existence checks; callers have established them
    pub(crate) fn merge_unchecked<S: AsRef<str>>(&self, dest: &str, sources: &[S], latest: bool) -> Result<()> {
        if sources.is_empty() {
            self.aptly
                .mutate("create empty snapshot", &["snapshot", "create", dest, "empty"])?;
            info!("Created empty snapshot {}", dest);
            return Ok(());
        }

        let mut args = vec!["snapshot".to_string(), "merge".to_string()];
        if latest {
            args.push("-latest".to_string());
        }
        args.push(dest.to_string());
        args.extend(sources.iter().map(|s| s.as_ref().to_string()));
        self.aptly.mutate("merge snapshots", &args)?;

        info!("Merged {} snapshot(s) into {}", sources.len(), dest);
        Ok(())
    }

    /// Drop a snapshot that no publication references
    ///
    /// `force` lets aptly drop a snapshot other merges were built from.
    pub fn drop_snapshot(&self, name: &str, force: bool) -> Result<()> {
        let probe = Probe::new(self.aptly);
        if !probe.snapshot_exists(name) {
            return Err(Error::not_found(EntityKind::Snapshot, name));
        }
        let publications = probe.list_publications(&[name]);
        if !publications.is_empty() {
            return Err(Error::StillPublished {
                name: name.to_string(),
                publications: publications.iter().map(ToString::to_string).collect(),
            });
        }

        self.drop_unchecked(name, force)
    }

    pub(crate) fn drop_unchecked(&self, name: &str, force: bool) -> Result<()> {
        let mut args = vec!["snapshot", "drop"];
        if force {
            args.push("-force");
        }
        args.push(name);
        self.aptly.mutate("drop snapshot", &args)?;

        info!("Dropped snapshot {}", name);
        Ok(())
    }
}
