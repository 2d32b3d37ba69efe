//! CLI argument definitions for `flatload`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use flatload_cli::config::Overrides;
use flatload_ingest::DecodePolicy;

#[derive(Parser)]
#[command(
    name = "flatload",
    version,
    about = "Load delimited text extracts into a relational table",
    long_about = "Load large delimited text extracts (mainframe/ERP exports) into a \
                  relational table.\n\n\
                  The destination schema is created from the configured field manifest \
                  and rows stream in memory-bounded batches; rejected rows are counted \
                  and logged, never silently dropped."
)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(
        short = 'c',
        long = "config",
        value_name = "PATH",
        default_value = "flatload.toml"
    )]
    pub config: PathBuf,

    /// Source flat file (overrides the configured source).
    #[arg(short = 'f', long = "from", value_name = "PATH")]
    pub source: Option<PathBuf>,

    /// Target table name (overrides the configured name).
    #[arg(short = 't', long = "to", value_name = "TABLE")]
    pub table: Option<String>,

    /// Field delimiter, one character.
    #[arg(long = "delim", value_name = "CHAR")]
    pub delimiter: Option<String>,

    /// Qualifier character; empty disables qualifying.
    #[arg(long = "qual", value_name = "CHAR")]
    pub qualifier: Option<String>,

    /// Escape character inside qualified fields; empty disables escaping.
    #[arg(long = "escape", value_name = "CHAR")]
    pub escape: Option<String>,

    /// Source character encoding label (e.g. utf-8, cp1252).
    #[arg(long = "encoding", value_name = "LABEL")]
    pub encoding: Option<String>,

    /// What to do with bytes that do not decode under the encoding.
    #[arg(long = "decoding-error-handler", value_enum)]
    pub decoding_error_handler: Option<PolicyArg>,

    /// Header lines to skip before the first data line.
    #[arg(long = "skip-lines", value_name = "N")]
    pub skip_lines: Option<u64>,

    /// Drop and recreate an existing target table without prompting.
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,

    /// Append to an existing target table without prompting.
    #[arg(short = 'a', long = "append")]
    pub append: bool,

    /// Read, parse, and convert without connecting to a database.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Collect the config-file overrides out of the parsed flags.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            source: self.source.clone(),
            table: self.table.clone(),
            delimiter: self.delimiter.clone(),
            qualifier: self.qualifier.clone(),
            escape: self.escape.clone(),
            encoding: self.encoding.clone(),
            policy: self.decoding_error_handler.map(PolicyArg::into_policy),
            skip_lines: self.skip_lines,
            yes: self.yes,
            append: self.append,
            dry_run: self.dry_run,
        }
    }
}

/// CLI decode policy choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum PolicyArg {
    Strict,
    Ignore,
    Replace,
}

impl PolicyArg {
    fn into_policy(self) -> DecodePolicy {
        match self {
            PolicyArg::Strict => DecodePolicy::Strict,
            PolicyArg::Ignore => DecodePolicy::Ignore,
            PolicyArg::Replace => DecodePolicy::Replace,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
