// src/multiarch.rs

//! Multi-architecture snapshot orchestration
//!
//! A unified snapshot `base-component-suffix` is the merge of one per-arch
//! snapshot `base-<arch>-component-suffix` per input repository. Neither
//! creation nor teardown is transactional: each step checks its own
//! precondition so that re-running the same call converges.

use crate::aptly::Aptly;
use crate::error::{EntityKind, Error, Result};
use crate::naming::{self, PublicationName, RepoName};
use crate::plan::{StepOutcome, TeardownPlan, TeardownReport, TeardownStep};
use crate::probe::Probe;
use crate::snapshot::SnapshotManager;
use tracing::{info, warn};

/// Builds and tears down unified multi-arch snapshots
pub struct MultiArch<'a> {
    aptly: &'a Aptly,
    snapshots: SnapshotManager<'a>,
}

impl<'a> MultiArch<'a> {
    pub fn new(aptly: &'a Aptly) -> Self {
        Self {
            aptly,
            snapshots: SnapshotManager::new(aptly),
        }
    }

    pub fn with_suffix_format(mut self, format: impl Into<String>) -> Self {
        self.snapshots = self.snapshots.with_suffix_format(format);
        self
    }

    /// Snapshot every repository and merge the results into one snapshot
    ///
    /// Existing per-arch snapshots with the same suffix are reused, so a
    /// call that failed halfway can be repeated with the same suffix.
    pub fn snapshot_multiarch<S: AsRef<str>>(&self, repos: &[S], suffix: Option<&str>) -> Result<String> {
        let probe = Probe::new(self.aptly);
        let Some(first) = repos.first() else {
            return Err(Error::malformed("", "no repositories given"));
        };
        let first = RepoName::parse(first.as_ref())?;

        for repo in repos {
            let repo = repo.as_ref();
            if !probe.repo_exists(repo) {
                return Err(Error::not_found(EntityKind::Repo, repo));
            }
            if naming::base(repo) != first.base || naming::component(repo) != first.component {
                warn!(
                    "Repository {} does not share base/component with {}",
                    repo, first
                );
            }
        }

        let suffix = self.snapshots.resolve_suffix(suffix)?;
        let unified = naming::multiarch_name(&first.to_string(), &suffix);
        if probe.snapshot_exists(&unified) {
            return Err(Error::already_exists(EntityKind::Snapshot, unified));
        }

        let mut per_arch = Vec::with_capacity(repos.len());
        for repo in repos {
            let repo = repo.as_ref();
            let name = naming::snapshot_name(repo, &suffix);
            if probe.snapshot_exists(&name) {
                info!("Snapshot {} already exists, reusing it", name);
            } else {
                self.snapshots.create_from_repo(&name, repo)?;
            }
            per_arch.push(name);
        }

        self.snapshots.merge_unchecked(&unified, &per_arch, false)?;
        info!("Created multi-arch snapshot {} from {} architecture(s)", unified, per_arch.len());
        Ok(unified)
    }

    /// Drop a unified snapshot together with its per-arch constituents
    pub fn drop_multiarch(&self, name: &str) -> Result<TeardownReport> {
        self.drop_multiarch_excluding(name, None)
    }

    /// Same as [`Self::drop_multiarch`], but publications equal to `ignored`
    /// do not count as references
    pub(crate) fn drop_multiarch_excluding(
        &self,
        name: &str,
        ignored: Option<&PublicationName>,
    ) -> Result<TeardownReport> {
        let probe = Probe::new(self.aptly);
        if !probe.snapshot_exists(name) {
            return Err(Error::not_found(EntityKind::Snapshot, name));
        }
        let publications = self.publications_of(&probe, name, ignored);
        if !publications.is_empty() {
            return Err(Error::StillPublished {
                name: name.to_string(),
                publications,
            });
        }

        let plan = self.plan_teardown(&probe, name);
        self.execute(&probe, plan, ignored)
    }

    /// Umbrella first: aptly refuses to drop merge sources while the merge exists
    fn plan_teardown(&self, probe: &Probe<'_>, name: &str) -> TeardownPlan {
        let mut plan = TeardownPlan::new().with_step(TeardownStep::DropSnapshot {
            name: name.to_string(),
            strict: true,
        });
        for candidate in probe.list_snapshots(None) {
            if naming::constituent_of(name, &candidate) {
                plan.push(TeardownStep::DropSnapshot {
                    name: candidate,
                    strict: false,
                });
            }
        }
        plan
    }

    /// Run `plan` step by step, stopping at the first hard failure
    ///
    /// Non-strict snapshot steps are skipped when the snapshot is gone or
    /// still published somewhere other than `ignored`.
    pub(crate) fn execute(
        &self,
        probe: &Probe<'_>,
        plan: TeardownPlan,
        ignored: Option<&PublicationName>,
    ) -> Result<TeardownReport> {
        let mut report = TeardownReport::default();

        for step in plan.steps {
            let outcome = match &step {
                TeardownStep::DropPublication { name } => {
                    let publication = PublicationName::parse(name)?;
                    self.aptly.mutate(
                        "drop publication",
                        &[
                            "publish",
                            "drop",
                            publication.distribution.as_str(),
                            publication.prefix.as_str(),
                        ],
                    )?;
                    info!("Dropped publication {}", publication);
                    StepOutcome::Done
                }
                TeardownStep::DropSnapshot { name, strict } => {
                    let skip = if *strict {
                        None
                    } else {
                        self.skip_reason(probe, name, ignored)
                    };
                    match skip {
                        Some(reason) => StepOutcome::Skipped(reason),
                        None => {
                            self.snapshots.drop_unchecked(name, false)?;
                            StepOutcome::Done
                        }
                    }
                }
            };
            report.record(step, outcome);
        }

        Ok(report)
    }

    fn skip_reason(
        &self,
        probe: &Probe<'_>,
        name: &str,
        ignored: Option<&PublicationName>,
    ) -> Option<String> {
        if !probe.snapshot_exists(name) {
            return Some("already gone".to_string());
        }
        let publications = self.publications_of(probe, name, ignored);
        if publications.is_empty() {
            return None;
        }
        warn!("Skipping {}: published by {}", name, publications.join(", "));
        Some(format!("published by {}", publications.join(", ")))
    }

    fn publications_of(
        &self,
        probe: &Probe<'_>,
        name: &str,
        ignored: Option<&PublicationName>,
    ) -> Vec<String> {
        probe
            .list_publications(&[name])
            .into_iter()
            .filter(|p| Some(p) != ignored)
            .map(|p| p.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aptly::ExecMode;
    use crate::aptly::mock::MockAptly;
    use crate::repo::RepoManager;

    const REPOS: [&str; 2] = ["base-amd64-comp", "base-arm64-comp"];

    fn setup(mode: ExecMode) -> (MockAptly, Aptly) {
        let mock = MockAptly::new();
        {
            let live = Aptly::new(Box::new(mock.clone()), ExecMode::Live);
            let repos = RepoManager::new(&live);
            for repo in REPOS {
                repos.create_repo(repo, None).unwrap();
            }
        }
        let aptly = Aptly::new(Box::new(mock.clone()), mode);
        (mock, aptly)
    }

    #[test]
    fn test_snapshot_multiarch_merges_in_order() {
        let (mock, aptly) = setup(ExecMode::Live);
        let unified = MultiArch::new(&aptly)
            .snapshot_multiarch(&REPOS, Some("20240101"))
            .unwrap();
        assert_eq!(unified, "base-comp-20240101");
        assert_eq!(
            mock.snapshot_sources(&unified),
            vec!["base-amd64-comp-20240101", "base-arm64-comp-20240101"]
        );
    }

    #[test]
    fn test_snapshot_multiarch_missing_repo_mutates_nothing() {
        let (mock, aptly) = setup(ExecMode::Live);
        let before = mock.mutation_calls().len();
        let result = MultiArch::new(&aptly)
            .snapshot_multiarch(&["base-amd64-comp", "base-i386-comp"], Some("1"));
        match result {
            Err(Error::NotFound { kind, name }) => {
                assert_eq!(kind, EntityKind::Repo);
                assert_eq!(name, "base-i386-comp");
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(mock.mutation_calls().len(), before);
    }

    #[test]
    fn test_snapshot_multiarch_resumes_after_partial_failure() {
        let (mock, aptly) = setup(ExecMode::Live);
        let multiarch = MultiArch::new(&aptly);

        mock.fail_on("snapshot create base-arm64-comp-1");
        let first = multiarch.snapshot_multiarch(&REPOS, Some("1"));
        assert!(matches!(first, Err(Error::ExternalTool { .. })));
        assert!(mock.has_snapshot("base-amd64-comp-1"));
        assert!(!mock.has_snapshot("base-comp-1"));

        mock.clear_failures();
        let unified = multiarch.snapshot_multiarch(&REPOS, Some("1")).unwrap();
        assert_eq!(unified, "base-comp-1");
        let creates = mock
            .mutation_calls()
            .into_iter()
            .filter(|c| c.get(2).map(String::as_str) == Some("base-amd64-comp-1"))
            .count();
        assert_eq!(creates, 1);
    }

    #[test]
    fn test_snapshot_multiarch_twice_is_already_exists() {
        let (mock, aptly) = setup(ExecMode::Live);
        let multiarch = MultiArch::new(&aptly);
        multiarch.snapshot_multiarch(&REPOS, Some("1")).unwrap();
        let before = mock.mutation_calls().len();

        let again = multiarch.snapshot_multiarch(&REPOS, Some("1"));
        assert!(matches!(again, Err(Error::AlreadyExists { .. })));
        assert_eq!(mock.mutation_calls().len(), before);
    }

    #[test]
    fn test_drop_multiarch_removes_constituents() {
        let (mock, aptly) = setup(ExecMode::Live);
        let multiarch = MultiArch::new(&aptly);
        multiarch.snapshot_multiarch(&REPOS, Some("20240101")).unwrap();

        let report = multiarch.drop_multiarch("base-comp-20240101").unwrap();
        assert_eq!(
            report.dropped(),
            vec![
                "base-comp-20240101",
                "base-amd64-comp-20240101",
                "base-arm64-comp-20240101"
            ]
        );
        assert!(report.skipped().is_empty());
        assert!(!mock.has_snapshot("base-amd64-comp-20240101"));
    }

    #[test]
    fn test_drop_multiarch_skips_published_constituent() {
        let (mock, aptly) = setup(ExecMode::Live);
        let multiarch = MultiArch::new(&aptly);
        multiarch.snapshot_multiarch(&REPOS, Some("20240101")).unwrap();
        aptly
            .mutate(
                "publish",
                &[
                    "publish",
                    "snapshot",
                    "-distribution=base",
                    "-component=comp",
                    "base-arm64-comp-20240101",
                    "arm",
                ],
            )
            .unwrap();

        let report = multiarch.drop_multiarch("base-comp-20240101").unwrap();
        assert_eq!(
            report.dropped(),
            vec!["base-comp-20240101", "base-amd64-comp-20240101"]
        );
        assert_eq!(report.skipped(), vec!["base-arm64-comp-20240101"]);
        assert!(mock.has_snapshot("base-arm64-comp-20240101"));
    }

    #[test]
    fn test_drop_multiarch_published_umbrella_is_strict() {
        let (mock, aptly) = setup(ExecMode::Live);
        let multiarch = MultiArch::new(&aptly);
        multiarch.snapshot_multiarch(&REPOS, Some("1")).unwrap();
        aptly
            .mutate(
                "publish",
                &["publish", "snapshot", "-distribution=base", "-component=comp", "base-comp-1", "1"],
            )
            .unwrap();

        let result = multiarch.drop_multiarch("base-comp-1");
        assert!(matches!(result, Err(Error::StillPublished { .. })));
        assert!(mock.has_snapshot("base-amd64-comp-1"));
    }

    #[test]
    fn test_execute_runs_publication_then_snapshot_steps() {
        let (mock, aptly) = setup(ExecMode::Live);
        let multiarch = MultiArch::new(&aptly);
        let unified = multiarch.snapshot_multiarch(&REPOS, Some("1")).unwrap();
        aptly
            .mutate(
                "publish",
                &["publish", "snapshot", "-distribution=base", "-component=comp", unified.as_str(), "1"],
            )
            .unwrap();

        let plan = TeardownPlan::new()
            .with_step(TeardownStep::DropPublication {
                name: "1/base".to_string(),
            })
            .with_step(TeardownStep::DropSnapshot {
                name: unified.clone(),
                strict: true,
            });
        let report = multiarch
            .execute(&Probe::new(&aptly), plan, None)
            .unwrap();
        assert_eq!(report.dropped(), vec!["1/base", "base-comp-1"]);
        assert!(!mock.has_publication("1/base"));
        assert!(!mock.has_snapshot(&unified));
    }

    #[test]
    fn test_dry_run_previews_without_mutation() {
        let (mock, aptly) = setup(ExecMode::DryRun);
        let before = mock.mutation_calls().len();
        let unified = MultiArch::new(&aptly)
            .snapshot_multiarch(&REPOS, Some("1"))
            .unwrap();
        assert_eq!(unified, "base-comp-1");
        assert_eq!(mock.mutation_calls().len(), before);
        assert!(!mock.has_snapshot("base-comp-1"));
    }
}
