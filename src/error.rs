// src/error.rs

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Kind of aptly entity an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Repo,
    Snapshot,
    Publication,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Repo => "Repository",
            EntityKind::Snapshot => "Snapshot",
            EntityKind::Publication => "Publication",
        };
        f.write_str(label)
    }
}

/// Core error types for aptlyctl
#[derive(Error, Debug)]
pub enum Error {
    /// Name does not decode into its base/arch/component/suffix parts
    #[error("Malformed name '{name}': {reason}")]
    MalformedName { name: String, reason: String },

    /// Referenced repo, snapshot or publication is absent
    #[error("{kind} '{name}' doesn't exist")]
    NotFound { kind: EntityKind, name: String },

    /// Target name collides with an existing entity
    #[error("{kind} '{name}' already exists")]
    AlreadyExists { kind: EntityKind, name: String },

    /// Deletion blocked by a publication referencing the entity
    #[error("'{name}' is still published by: {}", publications.join(", "))]
    StillPublished {
        name: String,
        publications: Vec<String>,
    },

    /// Repository deletion blocked by existing snapshots
    #[error("Repository '{name}' has snapshots: {}", snapshots.join(", "))]
    HasDependents { name: String, snapshots: Vec<String> },

    /// The aptly call itself failed
    #[error("aptly {command} failed: {message}")]
    ExternalTool { command: String, message: String },

    /// Configuration file could not be read or is invalid
    #[error("Invalid configuration in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn malformed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(kind: EntityKind, name: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub(crate) fn already_exists(kind: EntityKind, name: impl Into<String>) -> Self {
        Error::AlreadyExists {
            kind,
            name: name.into(),
        }
    }
}

/// Result type alias using aptlyctl's Error type
pub type Result<T> = std::result::Result<T, Error>;
