// src/publish.rs

//! Publishing snapshots and tearing publications down

use crate::aptly::Aptly;
use crate::error::{EntityKind, Error, Result};
use crate::multiarch::MultiArch;
use crate::naming::{self, PublicationName};
use crate::plan::{StepOutcome, TeardownPlan, TeardownReport, TeardownStep};
use crate::probe::Probe;
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Explicit prefix and/or distribution for a publication
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishTarget {
    pub prefix: Option<String>,
    pub distribution: Option<String>,
}

impl PublishTarget {
    /// Interpret `prefix` or `prefix/distribution`
    pub fn parse(value: &str) -> Self {
        match value.rsplit_once('/') {
            Some((prefix, distribution)) => Self {
                prefix: Some(prefix.to_string()),
                distribution: Some(distribution.to_string()),
            },
            None => Self {
                prefix: Some(value.to_string()),
                distribution: None,
            },
        }
    }
}

/// Extra `aptly publish snapshot` options carried from configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishOptions {
    pub architectures: Vec<String>,
    pub gpg_key: Option<String>,
    pub skip_signing: bool,
}

impl PublishOptions {
    fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if !self.architectures.is_empty() {
            args.push(format!("-architectures={}", self.architectures.join(",")));
        }
        if let Some(key) = &self.gpg_key {
            args.push(format!("-gpg-key={}", key));
        }
        if self.skip_signing {
            args.push("-skip-signing".to_string());
        }
        args
    }
}

/// Publication component contributed by a snapshot
///
/// Per-arch snapshots `base-arch-component-suffix` contribute `component`.
/// Unified snapshots `base-component-suffix` have no arch segment, so the
/// segment after the base is the component.
pub fn publication_component(snapshot: &str) -> &str {
    let repo = naming::snapshot_repo(snapshot);
    match naming::component(repo) {
        "" => naming::arch(repo),
        component => component,
    }
}

/// Publishes snapshots and drops publications
pub struct PublicationManager<'a> {
    aptly: &'a Aptly,
    options: PublishOptions,
}

impl<'a> PublicationManager<'a> {
    pub fn new(aptly: &'a Aptly) -> Self {
        Self {
            aptly,
            options: PublishOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PublishOptions) -> Self {
        self.options = options;
        self
    }

    fn probe(&self) -> Probe<'a> {
        Probe::new(self.aptly)
    }

    /// Publish `snapshots` as one publication, one component per snapshot
    ///
    /// Prefix and distribution default to the suffix and base of the first
    /// snapshot name.
    pub fn publish_multiarch<S: AsRef<str>>(
        &self,
        target: Option<&PublishTarget>,
        snapshots: &[S],
    ) -> Result<PublicationName> {
        let Some(first) = snapshots.first() else {
            return Err(Error::malformed("", "no snapshots given"));
        };
        let first: &str = first.as_ref();
        let target = target.cloned().unwrap_or_default();
        let prefix = target
            .prefix
            .unwrap_or_else(|| naming::snapshot_suffix(first).to_string());
        let distribution = target
            .distribution
            .unwrap_or_else(|| naming::base(first).to_string());

        if prefix.is_empty() {
            return Err(Error::malformed(first, "cannot derive publication prefix"));
        }
        if distribution.is_empty() {
            return Err(Error::malformed(first, "cannot derive publication distribution"));
        }
        let publication = PublicationName::new(prefix, distribution);

        let probe = self.probe();
        if probe.publication_exists(&publication) {
            return Err(Error::already_exists(
                EntityKind::Publication,
                publication.to_string(),
            ));
        }
        if let Some(missing) = snapshots.iter().find(|s| !probe.snapshot_exists(s.as_ref())) {
            return Err(Error::not_found(EntityKind::Snapshot, missing.as_ref()));
        }

        let mut components = Vec::with_capacity(snapshots.len());
        for snapshot in snapshots {
            let snapshot = snapshot.as_ref();
            let component = publication_component(snapshot);
            if component.is_empty() {
                return Err(Error::malformed(snapshot, "cannot derive publication component"));
            }
            components.push(component);
        }
        let unique: BTreeSet<&str> = components.iter().copied().collect();
        if unique.len() != components.len() {
            warn!(
                "Duplicate components in {}: aptly will reject the publication",
                components.join(",")
            );
        }

        let mut args = vec![
            "publish".to_string(),
            "snapshot".to_string(),
            format!("-distribution={}", publication.distribution),
            format!("-component={}", components.join(",")),
        ];
        args.extend(self.options.to_args());
        args.extend(snapshots.iter().map(|s| s.as_ref().to_string()));
        args.push(publication.prefix.clone());
        self.aptly.mutate("publish snapshots", &args)?;

        info!("Published {} snapshot(s) as {}", snapshots.len(), publication);
        Ok(publication)
    }

    pub fn publication_exists(&self, publication: &PublicationName) -> bool {
        self.probe().publication_exists(publication)
    }

    /// Publications whose listing mentions every one of `names`
    pub fn list_publications<S: AsRef<str>>(&self, names: &[S]) -> BTreeSet<PublicationName> {
        self.probe().list_publications(names)
    }

    /// Names backing a publication, in component order
    pub fn list_publication_backing(&self, publication: &PublicationName) -> Result<Vec<String>> {
        let probe = self.probe();
        if !probe.publication_exists(publication) {
            return Err(Error::not_found(
                EntityKind::Publication,
                publication.to_string(),
            ));
        }
        Ok(probe.list_publication_backing(publication))
    }

    /// Drop a publication, optionally cascading into its backing snapshots
    ///
    /// The backing list is read before the drop. Cascade failures abort the
    /// remaining cascade but do not restore the publication.
    pub fn drop_publication(&self, publication: &PublicationName, cascade: bool) -> Result<TeardownReport> {
        let probe = self.probe();
        if !probe.publication_exists(publication) {
            return Err(Error::not_found(
                EntityKind::Publication,
                publication.to_string(),
            ));
        }
        let backing = if cascade {
            probe.list_publication_backing(publication)
        } else {
            Vec::new()
        };

        let multiarch = MultiArch::new(self.aptly);
        let plan = TeardownPlan::new().with_step(TeardownStep::DropPublication {
            name: publication.to_string(),
        });
        let mut report = multiarch.execute(&probe, plan, None)?;

        for name in backing {
            if !probe.snapshot_exists(&name) {
                report.record(
                    TeardownStep::DropSnapshot { name, strict: false },
                    StepOutcome::Skipped("not a snapshot".to_string()),
                );
                continue;
            }
            report.absorb(multiarch.drop_multiarch_excluding(&name, Some(publication))?);
        }

        Ok(report)
    }
}
