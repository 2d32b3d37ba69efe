//! Destination table name sanitizing.

use std::path::Path;

/// Postgres truncates identifiers at 63 bytes; the historical default.
pub const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Normalizes a table name into a valid, bounded-length SQL identifier.
///
/// In order: strips any leading run of decimal digits, replaces every
/// character outside `[A-Za-z0-9]` with `_`, then strips whatever
/// non-letter run is left at the front so the identifier starts with a
/// letter. Names longer than `max_length` truncate to `max_length - 1`
/// characters; existing deployments were created under that bound and
/// changing it would fork table identities on reruns.
///
/// The result may be empty (a name with no letters at all); callers
/// treat that as a configuration error.
pub fn sanitize_table_name(name: &str, max_length: usize) -> String {
    let stripped = name.trim_start_matches(|c: char| c.is_ascii_digit());
    let cleaned: String = stripped
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let mut result = cleaned
        .trim_start_matches(|c: char| !c.is_ascii_alphabetic())
        .to_string();
    if result.len() > max_length {
        result.truncate(max_length.saturating_sub(1));
    }
    result
}

/// Default table name when none is configured: the source file's base
/// name up to the first `.`.
pub fn default_table_name(path: &Path) -> String {
    let base = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    base.split('.').next().unwrap_or("").to_string()
}
