//! Record schemas built from field manifests.
//!
//! A manifest is the ordered `NAME CODE` list from the configuration file,
//! e.g. `MANDT N, BUKRS C, BELNR N, BUDAT D`. Order is significant: it is
//! both the positional mapping applied to every source line and the column
//! order of the generated SQL.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SchemaError};
use crate::typecode::TypeCode;

/// One field of the record: a column name plus its type code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub code: TypeCode,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, code: TypeCode) -> Self {
        Self {
            name: name.into(),
            code,
        }
    }
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.code)
    }
}

/// Ordered, non-empty sequence of field specs describing one logical record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSchema {
    fields: Vec<FieldSpec>,
}

impl RecordSchema {
    /// Builds a schema from already-typed field specs.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::EmptyManifest`] when `fields` is empty and
    /// [`SchemaError::EmptyFieldName`] when a field name is blank.
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self> {
        if fields.is_empty() {
            return Err(SchemaError::EmptyManifest);
        }
        for (position, field) in fields.iter().enumerate() {
            if field.name.trim().is_empty() {
                return Err(SchemaError::EmptyFieldName { position });
            }
        }
        Ok(Self { fields })
    }

    /// Parses the legacy comma-separated manifest format: `NAME CODE, NAME CODE, ...`.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] for an empty manifest, a malformed entry,
    /// or an unknown type code.
    pub fn from_manifest(manifest: &str) -> Result<Self> {
        let mut fields = Vec::new();
        for entry in manifest.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let mut parts = entry.split_whitespace();
            let (Some(name), Some(code), None) = (parts.next(), parts.next(), parts.next())
            else {
                return Err(SchemaError::MalformedEntry {
                    entry: entry.to_string(),
                });
            };
            let code =
                TypeCode::from_str(code).map_err(|_| SchemaError::UnknownTypeCode {
                    field: name.to_string(),
                    code: code.to_string(),
                })?;
            fields.push(FieldSpec::new(name, code));
        }
        Self::new(fields)
    }

    /// Number of fields in one record.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false: construction rejects empty manifests.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The fields in record order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Iterates the fields in record order.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldSpec> {
        self.fields.iter()
    }
}

impl<'a> IntoIterator for &'a RecordSchema {
    type Item = &'a FieldSpec;
    type IntoIter = std::slice::Iter<'a, FieldSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
