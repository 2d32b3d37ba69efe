//! Configuration loading and resolution.
//!
//! A run is described by a TOML file with `[flatfile]`, `[database]`,
//! and `[target]` sections, mirroring the key set of the legacy `.ini`
//! files these extracts were loaded with. CLI flags override the file
//! where both are present. Everything that can be rejected before
//! touching the source or the destination is rejected here.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use flatload_ingest::{DecodePolicy, LineFormat, resolve_encoding};
use flatload_load::{
    ConnectParams, MAX_IDENTIFIER_LENGTH, SqlDialect, default_table_name, sanitize_table_name,
};
use flatload_model::{RecordSchema, SchemaError};

/// Errors that terminate the run before any I/O against source or sink.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("no source file: set [flatfile] source or pass -f/--from")]
    MissingSource,

    #[error("no field manifest: set [flatfile] fields")]
    MissingFields,

    #[error("no delimiter: set [flatfile] delimiter or pass --delim")]
    MissingDelimiter,

    #[error("{what} must be exactly one character, got '{value}'")]
    NotOneChar { what: &'static str, value: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("{0}")]
    Invalid(String),

    #[error("table name '{name}' has no usable identifier characters")]
    EmptyTableName { name: String },

    #[error("servertype 'mssql' generates SQL but ships no driver; use a postgres target or --dry-run")]
    MssqlNotShipped,
}

/// The TOML file, as written.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub flatfile: FlatfileSection,
    #[serde(default)]
    pub database: DatabaseSection,
    #[serde(default)]
    pub target: TargetSection,
}

#[derive(Debug, Default, Deserialize)]
pub struct FlatfileSection {
    pub source: Option<PathBuf>,
    pub delimiter: Option<String>,
    pub qualifier: Option<String>,
    pub escape: Option<String>,
    pub encoding: Option<String>,
    pub decoding_error_handler: Option<String>,
    pub skiplines: Option<u64>,
    /// Legacy manifest format: `NAME CODE, NAME CODE, ...`.
    pub fields: Option<String>,
    pub memory_budget: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DatabaseSection {
    pub servertype: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub dbname: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TargetSection {
    pub table: Option<String>,
    pub yes: Option<bool>,
    pub append: Option<bool>,
}

/// CLI-side overrides, already parsed but not yet validated.
#[derive(Debug, Default)]
pub struct Overrides {
    pub source: Option<PathBuf>,
    pub table: Option<String>,
    pub delimiter: Option<String>,
    pub qualifier: Option<String>,
    pub escape: Option<String>,
    pub encoding: Option<String>,
    pub policy: Option<DecodePolicy>,
    pub skip_lines: Option<u64>,
    pub yes: bool,
    pub append: bool,
    pub dry_run: bool,
}

/// Fully resolved, validated run settings.
#[derive(Debug)]
pub struct Settings {
    pub source: PathBuf,
    pub format: LineFormat,
    pub encoding: String,
    pub policy: DecodePolicy,
    pub skip_lines: u64,
    pub memory_budget: u64,
    pub schema: RecordSchema,
    pub dialect: SqlDialect,
    pub connect: ConnectParams,
    pub table: String,
    pub yes: bool,
    pub append: bool,
    pub dry_run: bool,
}

/// Reads and parses the TOML configuration file.
///
/// # Errors
///
/// Returns a [`ConfigError`] when the file is unreadable or malformed.
pub fn load_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&text).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Merges file and overrides into validated [`Settings`].
///
/// # Errors
///
/// Returns the first [`ConfigError`] found: missing source, fields, or
/// delimiter; malformed single-character specs; an unknown encoding
/// label, policy, type code, or server type; a table name with nothing
/// usable in it; or an `mssql` target outside `--dry-run`.
pub fn resolve(file: FileConfig, overrides: Overrides) -> Result<Settings, ConfigError> {
    let source = overrides
        .source
        .or(file.flatfile.source)
        .ok_or(ConfigError::MissingSource)?;

    let delimiter = overrides
        .delimiter
        .or(file.flatfile.delimiter)
        .ok_or(ConfigError::MissingDelimiter)?;
    let delimiter = single_char("delimiter", &delimiter)?;
    let qualifier = optional_char(
        "qualifier",
        overrides.qualifier.or(file.flatfile.qualifier),
    )?;
    let escape = optional_char("escape", overrides.escape.or(file.flatfile.escape))?;

    let manifest = file.flatfile.fields.ok_or(ConfigError::MissingFields)?;
    let schema = RecordSchema::from_manifest(&manifest)?;

    let encoding = overrides
        .encoding
        .or(file.flatfile.encoding)
        .unwrap_or_else(|| "utf-8".to_string());
    resolve_encoding(&encoding).map_err(|e| ConfigError::Invalid(e.to_string()))?;

    let policy = match overrides.policy {
        Some(policy) => policy,
        None => match file.flatfile.decoding_error_handler {
            Some(name) => name.parse::<DecodePolicy>().map_err(ConfigError::Invalid)?,
            None => DecodePolicy::Strict,
        },
    };

    let dialect = match file.database.servertype {
        Some(name) => name.parse::<SqlDialect>().map_err(ConfigError::Invalid)?,
        None => SqlDialect::Postgres,
    };
    let dry_run = overrides.dry_run;
    if dialect == SqlDialect::Mssql && !dry_run {
        return Err(ConfigError::MssqlNotShipped);
    }

    let named = overrides
        .table
        .or(file.target.table)
        .filter(|name| !name.trim().is_empty());
    let raw_table = named.unwrap_or_else(|| default_table_name(&source));
    let table = sanitize_table_name(&raw_table, MAX_IDENTIFIER_LENGTH);
    if table.is_empty() {
        return Err(ConfigError::EmptyTableName { name: raw_table });
    }

    Ok(Settings {
        source,
        format: LineFormat::new(delimiter, qualifier, escape),
        encoding,
        policy,
        skip_lines: overrides
            .skip_lines
            .or(file.flatfile.skiplines)
            .unwrap_or(0),
        memory_budget: file
            .flatfile
            .memory_budget
            .unwrap_or(flatload_load::DEFAULT_MEMORY_BUDGET),
        schema,
        dialect,
        connect: ConnectParams {
            host: file.database.host.unwrap_or_else(|| "localhost".to_string()),
            port: file.database.port.unwrap_or(5432),
            dbname: file.database.dbname.unwrap_or_else(|| "postgres".to_string()),
            user: file.database.user.unwrap_or_else(|| "postgres".to_string()),
            password: file.database.password.unwrap_or_default(),
        },
        table,
        yes: overrides.yes || file.target.yes.unwrap_or(false),
        append: overrides.append || file.target.append.unwrap_or(false),
        dry_run,
    })
}

fn single_char(what: &'static str, value: &str) -> Result<char, ConfigError> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ConfigError::NotOneChar {
            what,
            value: value.to_string(),
        }),
    }
}

/// Empty string (or an absent key) disables the character.
fn optional_char(
    what: &'static str,
    value: Option<String>,
) -> Result<Option<char>, ConfigError> {
    match value {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => single_char(what, &s).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_file() -> FileConfig {
        toml::from_str(
            r#"
            [flatfile]
            source = "/data/BKPF.txt"
            delimiter = ";"
            fields = "MANDT N, BUKRS C, WRBTR P"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_minimal_resolves_with_defaults() {
        let settings = resolve(minimal_file(), Overrides::default()).unwrap();
        assert_eq!(settings.format.delimiter, ';');
        assert_eq!(settings.format.qualifier, None);
        assert_eq!(settings.encoding, "utf-8");
        assert_eq!(settings.policy, DecodePolicy::Strict);
        assert_eq!(settings.dialect, SqlDialect::Postgres);
        assert_eq!(settings.table, "BKPF");
        assert_eq!(settings.skip_lines, 0);
        assert_eq!(settings.connect.port, 5432);
    }

    #[test]
    fn test_missing_fields_is_a_config_error() {
        let file: FileConfig = toml::from_str(
            r#"
            [flatfile]
            source = "x.txt"
            delimiter = ","
            "#,
        )
        .unwrap();
        assert!(matches!(
            resolve(file, Overrides::default()),
            Err(ConfigError::MissingFields)
        ));
    }

    #[test]
    fn test_overrides_win_over_file() {
        let overrides = Overrides {
            table: Some("monthly loads!".to_string()),
            delimiter: Some("|".to_string()),
            encoding: Some("cp1252".to_string()),
            skip_lines: Some(2),
            ..Overrides::default()
        };
        let settings = resolve(minimal_file(), overrides).unwrap();
        assert_eq!(settings.format.delimiter, '|');
        assert_eq!(settings.encoding, "cp1252");
        assert_eq!(settings.skip_lines, 2);
        assert_eq!(settings.table, "monthly_loads_");
    }

    #[test]
    fn test_wide_delimiter_rejected() {
        let overrides = Overrides {
            delimiter: Some("||".to_string()),
            ..Overrides::default()
        };
        assert!(matches!(
            resolve(minimal_file(), overrides),
            Err(ConfigError::NotOneChar { .. })
        ));
    }

    #[test]
    fn test_empty_qualifier_disables() {
        let mut file = minimal_file();
        file.flatfile.qualifier = Some(String::new());
        let settings = resolve(file, Overrides::default()).unwrap();
        assert_eq!(settings.format.qualifier, None);
    }

    #[test]
    fn test_unknown_encoding_rejected() {
        let overrides = Overrides {
            encoding: Some("klingon-8".to_string()),
            ..Overrides::default()
        };
        assert!(matches!(
            resolve(minimal_file(), overrides),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_mssql_requires_dry_run() {
        let mut file = minimal_file();
        file.database.servertype = Some("mssql".to_string());
        assert!(matches!(
            resolve(file, Overrides::default()),
            Err(ConfigError::MssqlNotShipped)
        ));

        let mut file = minimal_file();
        file.database.servertype = Some("mssql".to_string());
        let settings = resolve(
            file,
            Overrides {
                dry_run: true,
                ..Overrides::default()
            },
        )
        .unwrap();
        assert_eq!(settings.dialect, SqlDialect::Mssql);
    }

    #[test]
    fn test_numeric_table_name_rejected() {
        let overrides = Overrides {
            table: Some("20231105".to_string()),
            ..Overrides::default()
        };
        assert!(matches!(
            resolve(minimal_file(), overrides),
            Err(ConfigError::EmptyTableName { .. })
        ));
    }

    #[test]
    fn test_blank_table_name_defers_to_source_basename() {
        let mut file = minimal_file();
        file.target.table = Some("   ".to_string());
        let settings = resolve(file, Overrides::default()).unwrap();
        assert_eq!(settings.table, "BKPF");
    }
}
