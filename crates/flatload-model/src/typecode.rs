//! Legacy field type codes.
//!
//! Extract manifests describe each field with a one-letter type code
//! carried over from the source system's data dictionary (`STRING` is
//! the one multi-character code). The code decides both the SQL column
//! type of the destination table and the string conversion applied to
//! every value in that position.

use std::fmt;
use std::str::FromStr;

/// Field type code from the extract manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCode {
    /// `I`: base-10 integer.
    Integer,
    /// `F`: exact decimal.
    Decimal,
    /// `P`: packed decimal with thousands separators and a trailing sign.
    Packed,
    /// `C`: character data, passed through unchanged.
    Char,
    /// `N`: numeric text (leading zeros significant), passed through unchanged.
    Numc,
    /// `STRING`: unbounded character data, passed through unchanged.
    Text,
    /// `D`: calendar date, `YYYYMMDD` or `YYYY-MM-DD`.
    Date,
    /// `T`: time of day, `HHMMSS` or `HH:MM:SS`.
    Time,
}

impl TypeCode {
    /// Returns the manifest code as it appears in configuration files.
    pub fn as_code(&self) -> &'static str {
        match self {
            TypeCode::Integer => "I",
            TypeCode::Decimal => "F",
            TypeCode::Packed => "P",
            TypeCode::Char => "C",
            TypeCode::Numc => "N",
            TypeCode::Text => "STRING",
            TypeCode::Date => "D",
            TypeCode::Time => "T",
        }
    }

    /// Returns true for the three codes whose values pass through as text.
    pub fn is_textual(&self) -> bool {
        matches!(self, TypeCode::Char | TypeCode::Numc | TypeCode::Text)
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_code())
    }
}

impl FromStr for TypeCode {
    type Err = String;

    /// Parse a manifest type code (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();

        match normalized.as_str() {
            "I" => Ok(TypeCode::Integer),
            "F" => Ok(TypeCode::Decimal),
            "P" => Ok(TypeCode::Packed),
            "C" => Ok(TypeCode::Char),
            "N" => Ok(TypeCode::Numc),
            "STRING" => Ok(TypeCode::Text),
            "D" => Ok(TypeCode::Date),
            "T" => Ok(TypeCode::Time),
            _ => Err(format!("Unknown type code: {s}")),
        }
    }
}
