// src/lib.rs

//! aptly lifecycle management
//!
//! Thin orchestration over the `aptly` command line for managing local
//! repositories, snapshots, unified multi-architecture snapshots and
//! publications.
//!
//! # Architecture
//!
//! - aptly is the only state store: every precondition is probed live
//! - Naming conventions carry the relationships between entities
//! - Mutations go through one [`aptly::Aptly`] handle that owns the
//!   execution mode, so dry runs print instead of mutating
//! - Teardowns are planned up front and report every step's outcome

pub mod aptly;
pub mod config;
mod error;
pub mod multiarch;
pub mod naming;
pub mod plan;
pub mod probe;
pub mod publish;
pub mod repo;
pub mod snapshot;

pub use error::{EntityKind, Error, Result};
