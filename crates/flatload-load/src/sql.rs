//! DDL/DML text generation per SQL dialect.
//!
//! Statement text is assembled structurally from the record schema;
//! nothing here validates it against a live catalog. A backend that
//! rejects the generated SQL surfaces as a fatal sink error.

use std::fmt;
use std::str::FromStr;

use flatload_model::{RecordSchema, TypeCode};

/// Destination SQL dialect: column type names, placeholder syntax, and
/// the conditional drop-table form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlDialect {
    Postgres,
    Mssql,
}

impl SqlDialect {
    /// Destination column type for a manifest type code.
    pub fn column_type(&self, code: TypeCode) -> &'static str {
        match self {
            SqlDialect::Postgres => match code {
                TypeCode::Integer => "integer",
                TypeCode::Decimal | TypeCode::Packed => "numeric",
                TypeCode::Char | TypeCode::Numc | TypeCode::Text => "text",
                TypeCode::Date => "date",
                TypeCode::Time => "time",
            },
            // MSSQL targets still run the legacy numeric declaration
            SqlDialect::Mssql => match code {
                TypeCode::Integer => "integer",
                TypeCode::Decimal | TypeCode::Packed => "numeric(38,38)",
                TypeCode::Char | TypeCode::Numc | TypeCode::Text => "nvarchar(max)",
                TypeCode::Date => "date",
                TypeCode::Time => "time",
            },
        }
    }

    /// Positional parameter placeholder, 1-based.
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            SqlDialect::Postgres => format!("${index}"),
            SqlDialect::Mssql => "?".to_string(),
        }
    }

    /// Conditional drop of the destination table.
    pub fn drop_table_sql(&self, table: &str) -> String {
        match self {
            SqlDialect::Postgres => format!("DROP TABLE IF EXISTS {table}"),
            SqlDialect::Mssql => format!(
                "IF EXISTS (SELECT 1 from INFORMATION_SCHEMA.TABLES \
                 WHERE TABLE_NAME = '{table}') DROP TABLE {table}"
            ),
        }
    }

    /// `CREATE TABLE` with one column per schema field, in schema order.
    pub fn create_table_sql(&self, table: &str, schema: &RecordSchema) -> String {
        let columns: Vec<String> = schema
            .iter()
            .map(|field| format!("{} {}", field.name, self.column_type(field.code)))
            .collect();
        format!("CREATE TABLE {table} ({})", columns.join(","))
    }

    /// Parameterized `INSERT` with one positional placeholder per column.
    pub fn insert_sql(&self, table: &str, schema: &RecordSchema) -> String {
        let columns: Vec<&str> = schema.iter().map(|field| field.name.as_str()).collect();
        let placeholders: Vec<String> = (1..=schema.len())
            .map(|index| self.placeholder(index))
            .collect();
        format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            columns.join(","),
            placeholders.join(",")
        )
    }
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlDialect::Postgres => write!(f, "postgres"),
            SqlDialect::Mssql => write!(f, "mssql"),
        }
    }
}

impl FromStr for SqlDialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(SqlDialect::Postgres),
            "mssql" => Ok(SqlDialect::Mssql),
            _ => Err(format!(
                "servertype must be one of 'postgres' or 'mssql'; got '{s}'"
            )),
        }
    }
}
