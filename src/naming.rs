// src/naming.rs

//! Name algebra for repositories, snapshots and publications
//!
//! Every aptly entity managed here is identified by a hyphen-joined name:
//!
//! - Repository: `base-arch-component` (the component may contain hyphens)
//! - Snapshot: `<repository>-suffix`
//! - Multi-arch snapshot: `base-component-suffix`
//! - Publication: `prefix/distribution`
//!
//! The free functions below are total string functions. They never fail and
//! return an empty string when the requested part is absent, so callers must
//! validate non-emptiness before trusting a derived part. The identifier types
//! (`RepoName`, `PublicationName`) do that validation once at the boundary.
//!
//! Known limitation: `snapshot_suffix`/`snapshot_repo` split on the last
//! hyphen while `component` takes everything after the second one, so a
//! component containing a hyphen makes the two disagree.

use crate::error::{Error, Result};
use std::fmt;

/// Default strftime format for snapshot suffixes
pub const DEFAULT_SUFFIX_FORMAT: &str = "%Y%m%d";

/// Prefix aptly uses when a publication has none
pub const DEFAULT_PREFIX: &str = ".";

/// Segment before the first hyphen
pub fn base(name: &str) -> &str {
    match name.split_once('-') {
        Some((base, _)) => base,
        None => "",
    }
}

/// Segment between the first and second hyphen
pub fn arch(name: &str) -> &str {
    match name.split_once('-') {
        Some((_, rest)) => rest.split('-').next().unwrap_or(""),
        None => "",
    }
}

/// Everything after the second hyphen
pub fn component(name: &str) -> &str {
    name.splitn(3, '-').nth(2).unwrap_or("")
}

/// Segment after the last hyphen
pub fn snapshot_suffix(name: &str) -> &str {
    match name.rsplit_once('-') {
        Some((_, suffix)) => suffix,
        None => "",
    }
}

/// Everything before the last hyphen
pub fn snapshot_repo(name: &str) -> &str {
    match name.rsplit_once('-') {
        Some((repo, _)) => repo,
        None => "",
    }
}

/// Render the snapshot name for `repo` taken with `suffix`
pub fn snapshot_name(repo: &str, suffix: &str) -> String {
    format!("{}-{}", repo, suffix)
}

/// Render the unified multi-arch snapshot name for a per-arch repository
pub fn multiarch_name(repo: &str, suffix: &str) -> String {
    format!("{}-{}-{}", base(repo), component(repo), suffix)
}

/// Check whether `candidate` is a per-arch constituent of `umbrella`
///
/// Constituents are `base-<arch>-rest` where `rest` is the umbrella name with
/// its base segment removed and `<arch>` is a single non-empty segment.
pub fn constituent_of(umbrella: &str, candidate: &str) -> bool {
    let base = base(umbrella);
    if base.is_empty() {
        return false;
    }
    let rest = &umbrella[base.len() + 1..];
    if rest.is_empty() {
        return false;
    }

    let Some(tail) = candidate
        .strip_prefix(base)
        .and_then(|s| s.strip_prefix('-'))
    else {
        return false;
    };
    let Some(middle) = tail.strip_suffix(rest).and_then(|s| s.strip_suffix('-')) else {
        return false;
    };

    !middle.is_empty() && !middle.contains('-')
}

/// Today's local date rendered with a strftime format
///
/// `format` must pass [`is_valid_suffix_format`].
pub fn today_suffix(format: &str) -> String {
    chrono::Local::now().format(format).to_string()
}

/// Check that a strftime format has no invalid specifiers
pub fn is_valid_suffix_format(format: &str) -> bool {
    use chrono::format::{Item, StrftimeItems};
    !format.is_empty() && !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// A validated `base-arch-component` repository name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoName {
    pub base: String,
    pub arch: String,
    pub component: String,
}

impl RepoName {
    /// Decode a repository name, rejecting any empty segment
    pub fn parse(name: &str) -> Result<Self> {
        let base = base(name);
        let arch = name.splitn(3, '-').nth(1).unwrap_or("");
        let component = component(name);

        if base.is_empty() {
            return Err(Error::malformed(name, "missing base segment"));
        }
        if arch.is_empty() {
            return Err(Error::malformed(name, "missing architecture segment"));
        }
        if component.is_empty() {
            return Err(Error::malformed(name, "missing component segment"));
        }

        Ok(Self {
            base: base.to_string(),
            arch: arch.to_string(),
            component: component.to_string(),
        })
    }
}

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.base, self.arch, self.component)
    }
}

/// A `prefix/distribution` publication identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct PublicationName {
    pub prefix: String,
    pub distribution: String,
}

impl PublicationName {
    pub fn new(prefix: impl Into<String>, distribution: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            distribution: distribution.into(),
        }
    }

    /// Parse `prefix/distribution`, splitting on the last slash
    pub fn parse(name: &str) -> Result<Self> {
        let (prefix, distribution) = name
            .rsplit_once('/')
            .ok_or_else(|| Error::malformed(name, "expected prefix/distribution"))?;

        if prefix.is_empty() {
            return Err(Error::malformed(name, "missing prefix"));
        }
        if distribution.is_empty() {
            return Err(Error::malformed(name, "missing distribution"));
        }

        Ok(Self::new(prefix, distribution))
    }

    /// Interpret a name token from `aptly publish list`
    ///
    /// aptly omits the prefix for publications under the default `.` prefix.
    pub fn from_listing(token: &str) -> Option<Self> {
        match token.rsplit_once('/') {
            Some((prefix, dist)) if !prefix.is_empty() && !dist.is_empty() => {
                Some(Self::new(prefix, dist))
            }
            Some(_) => None,
            None if !token.is_empty() => Some(Self::new(DEFAULT_PREFIX, token)),
            None => None,
        }
    }
}

impl fmt::Display for PublicationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.prefix, self.distribution)
    }
}
