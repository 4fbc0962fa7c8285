//! Error taxonomy for the search engine.
//!
//! Candidate-level failures (a vanishing denominator, an overflowing series,
//! a transform that does not depend on the constant) are not errors: the
//! per-candidate code paths return `Option` and the candidate is dropped on
//! the spot. Everything in this module is fatal for the orchestrator or the
//! pool that produced it.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by table construction, persistence and the worker pool.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("LHS table snapshot {path} could not be read: {source}")]
    SnapshotUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("LHS table snapshot {path} is corrupt: {reason}")]
    SnapshotCorrupt { path: PathBuf, reason: String },

    #[error("failed to write LHS table snapshot {path}: {reason}")]
    SnapshotWrite { path: PathBuf, reason: String },

    #[error("misconfigured partition: {0}")]
    MisconfiguredPartition(String),

    #[error("worker {index} failed: {reason}")]
    WorkerFailure { index: usize, reason: String },

    #[error("failed to start worker pool: {0}")]
    PoolSetup(String),

    #[error("invalid constant: {0}")]
    Constant(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SearchError {
    /// Short machine-readable category, used for JSON error output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SnapshotUnavailable { .. } => "snapshot_unavailable",
            Self::SnapshotCorrupt { .. } => "snapshot_corrupt",
            Self::SnapshotWrite { .. } => "snapshot_write",
            Self::MisconfiguredPartition(_) => "misconfigured_partition",
            Self::WorkerFailure { .. } => "worker_failure",
            Self::PoolSetup(_) => "pool_setup",
            Self::Constant(_) => "constant",
            Self::Config(_) => "config",
        }
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Constant(_) | Self::MisconfiguredPartition(_) => 2,
            Self::SnapshotUnavailable { .. }
            | Self::SnapshotCorrupt { .. }
            | Self::SnapshotWrite { .. } => 3,
            Self::WorkerFailure { .. } | Self::PoolSetup(_) => 4,
        }
    }

    /// A recovery hint for the user, when one exists.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::SnapshotUnavailable { .. } => {
                Some("Check the snapshot path, or omit it to rebuild the table in memory.")
            }
            Self::SnapshotCorrupt { .. } => {
                Some("Delete the snapshot file; it will be rebuilt on the next run.")
            }
            Self::MisconfiguredPartition(_) => {
                Some("Pass at most one tile size per poly_a term.")
            }
            Self::WorkerFailure { .. } => Some("Re-run with RUST_LOG=debug to see the failing candidate."),
            _ => None,
        }
    }
}
