//! Error types for the load pipeline.
//!
//! Everything here is fatal: per-row rejections are
//! [`flatload_ingest::RowError`] values that the loader counts and logs
//! without raising.

use thiserror::Error;

use flatload_ingest::IngestError;

/// Failure executing against the destination.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The database driver reported an error (statement rejected,
    /// connection lost, constraint violation).
    #[error("database error: {0}")]
    Database(#[from] postgres::Error),
}

/// Fatal failure during a load run.
///
/// Batches committed before the failure remain committed.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Reading the source stream failed.
    #[error(transparent)]
    Source(#[from] IngestError),

    /// Executing DDL or a batch insert against the destination failed.
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Result type for load operations.
pub type Result<T> = std::result::Result<T, LoadError>;
