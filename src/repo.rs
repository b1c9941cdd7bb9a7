// src/repo.rs

//! Local repository creation and teardown

use crate::aptly::Aptly;
use crate::error::{EntityKind, Error, Result};
use crate::naming::RepoName;
use crate::probe::Probe;
use tracing::info;

/// Creates, populates and drops base repositories
pub struct RepoManager<'a> {
    aptly: &'a Aptly,
}

impl<'a> RepoManager<'a> {
    pub fn new(aptly: &'a Aptly) -> Self {
        Self { aptly }
    }

    fn probe(&self) -> Probe<'a> {
        Probe::new(self.aptly)
    }

    /// Create a repository whose metadata is derived from its name
    ///
    /// `architectures` replaces the architecture decoded from the name.
    /// Duplicate names are left to aptly to reject.
    pub fn create_repo(&self, name: &str, architectures: Option<&[String]>) -> Result<RepoName> {
        let repo = RepoName::parse(name)?;
        let architectures = match architectures {
            Some(list) if !list.is_empty() => list.join(","),
            _ => repo.arch.clone(),
        };
        let comment = format!(
            "Repository for {} {} packages ({})",
            repo.base, repo.component, architectures
        );

        self.aptly.mutate(
            "create repo",
            &[
                "repo".to_string(),
                "create".to_string(),
                format!("-architectures={}", architectures),
                format!("-component={}", repo.component),
                format!("-distribution={}", repo.base),
                format!("-comment={}", comment),
                repo.to_string(),
            ],
        )?;

        info!("Created repository {}", repo);
        Ok(repo)
    }

    /// Drop a repository
    ///
    /// Without `force`, refuses while anything publishes it, then while it
    /// still has snapshots. With `force`, aptly is told to drop regardless.
    pub fn drop_repo(&self, name: &str, force: bool) -> Result<()> {
        let probe = self.probe();
        if !probe.repo_exists(name) {
            return Err(Error::not_found(EntityKind::Repo, name));
        }

        if !force {
            let publications = probe.list_publications(&[name]);
            if !publications.is_empty() {
                return Err(Error::StillPublished {
                    name: name.to_string(),
                    publications: publications.iter().map(ToString::to_string).collect(),
                });
            }
            let snapshots = probe.list_snapshots(Some(name));
            if !snapshots.is_empty() {
                return Err(Error::HasDependents {
                    name: name.to_string(),
                    snapshots: snapshots.into_iter().collect(),
                });
            }
        }

        let mut args = vec!["repo", "drop"];
        if force {
            args.push("-force");
        }
        args.push(name);
        self.aptly.mutate("drop repo", &args)?;

        info!("Dropped repository {}", name);
        Ok(())
    }

    /// Add package files to an existing repository
    pub fn add_packages(&self, name: &str, paths: &[String], remove_files: bool) -> Result<()> {
        if !self.probe().repo_exists(name) {
            return Err(Error::not_found(EntityKind::Repo, name));
        }

        let mut args = vec!["repo".to_string(), "add".to_string()];
        if remove_files {
            args.push("-remove-files".to_string());
        }
        args.push(name.to_string());
        args.extend(paths.iter().cloned());
        self.aptly.mutate("add packages", &args)?;

        info!("Added {} path(s) to repository {}", paths.len(), name);
        Ok(())
    }
}
