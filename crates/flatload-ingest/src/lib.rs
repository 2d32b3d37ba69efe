//! Flat-file ingestion: line reading, character decoding, field
//! splitting, and row conversion.
//!
//! The crate turns raw extract bytes into typed rows in three steps:
//! [`source::LineReader`] yields decoded lines, [`split::split_line`]
//! breaks a line into fields under the qualifier/escape rules, and
//! [`convert::convert_row`] applies the schema's type codes positionally.

pub mod convert;
pub mod error;
pub mod source;
pub mod split;

pub use convert::{convert_field, convert_row};
pub use error::{IngestError, Result, RowError};
pub use source::{
    DecodePolicy, LineReader, NextLine, SourceStats, resolve_encoding, scan_source,
    validate_encoding,
};
pub use split::{LineFormat, split_line};
