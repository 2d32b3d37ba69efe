//! Destination side of flat-file loading.
//!
//! Sanitizes the target table name, generates dialect-specific DDL/DML
//! text, and drives the batch loader against a [`sink::Sink`] — the
//! PostgreSQL implementation for real runs, the in-memory one for tests
//! and dry runs.

pub mod error;
pub mod identifier;
pub mod loader;
pub mod postgres;
pub mod sink;
pub mod sql;

pub use error::{LoadError, Result, SinkError};
pub use identifier::{MAX_IDENTIFIER_LENGTH, default_table_name, sanitize_table_name};
pub use loader::{
    BatchLoader, DEFAULT_MEMORY_BUDGET, Disposition, LoadCounters, LoadOptions,
    compute_batch_rows, prepare_table,
};
pub use postgres::{ConnectParams, PostgresSink};
pub use sink::{MemorySink, Sink};
pub use sql::SqlDialect;
