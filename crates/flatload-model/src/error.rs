use thiserror::Error;

/// Errors raised while building a record schema from a field manifest.
///
/// All of these are configuration errors: they terminate the run before
/// any source or destination I/O happens.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The field manifest contained no entries.
    #[error("field manifest is empty")]
    EmptyManifest,

    /// A manifest entry was not a `NAME CODE` pair.
    #[error("manifest entry '{entry}' must be in format: FIELD TYPE")]
    MalformedEntry { entry: String },

    /// A manifest entry used a type code outside the known set.
    #[error("unknown type code '{code}' for field '{field}'")]
    UnknownTypeCode { field: String, code: String },

    /// A manifest entry had a blank field name.
    #[error("field name at position {position} is empty")]
    EmptyFieldName { position: usize },
}

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
