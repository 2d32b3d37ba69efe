//! Error types for flat-file ingestion.

use std::path::PathBuf;
use thiserror::Error;

use flatload_model::TypeCode;

/// Fatal errors raised while opening or reading a source file.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Source file not found.
    #[error("source file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read the source file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file carries a BOM for an encoding the line reader cannot honor.
    #[error("unsupported encoding {encoding} in {path}")]
    UnsupportedEncoding {
        path: PathBuf,
        encoding: &'static str,
    },

    /// The configured encoding name is not a known label.
    #[error("unknown encoding label '{label}'")]
    UnknownEncodingLabel { label: String },
}

/// Recoverable per-row rejection.
///
/// A `RowError` never aborts a run: the loader skips the row, counts the
/// rejection, and moves on. The raw line is logged by the caller, which
/// still owns it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RowError {
    /// The line produced fewer fields than the schema expects.
    #[error("truncated row: got {got} of {expected} fields, ends after '{last_field}'")]
    Truncated {
        got: usize,
        expected: usize,
        last_field: String,
    },

    /// A single field's value failed to convert to its declared type.
    #[error("field '{field}' ({code}): cannot convert '{value}'")]
    Conversion {
        field: String,
        code: TypeCode,
        value: String,
    },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
