//! Byte-oriented line reading with configurable character decoding.
//!
//! Lines are split on raw `\n` bytes and decoded one at a time, so a
//! bad byte sequence poisons only its own line. UTF-16 inputs are
//! rejected up front: splitting double-byte text on single `\n` bytes
//! would shear code units in half.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use encoding_rs::Encoding;

use crate::error::{IngestError, Result};

/// What to do with bytes that do not decode under the declared encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodePolicy {
    /// Reject the line (the loader counts it and moves on).
    #[default]
    Strict,
    /// Drop the offending bytes.
    Ignore,
    /// Substitute U+FFFD for the offending bytes.
    Replace,
}

impl FromStr for DecodePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(DecodePolicy::Strict),
            "ignore" => Ok(DecodePolicy::Ignore),
            "replace" => Ok(DecodePolicy::Replace),
            _ => Err(format!(
                "decoding error handler must be one of strict, ignore, replace; got '{s}'"
            )),
        }
    }
}

/// Resolves a configured encoding name to an `encoding_rs` encoding.
///
/// Accepts WHATWG labels, which cover the legacy names these extracts
/// use (`cp1252` via `windows-1252`, `latin1`, `utf-8`, ...).
///
/// # Errors
///
/// Returns [`IngestError::UnknownEncodingLabel`] for an unrecognized name.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| IngestError::UnknownEncodingLabel {
        label: label.to_string(),
    })
}

/// Rejects files carrying a UTF-16 byte order mark.
pub fn validate_encoding(path: &Path) -> Result<()> {
    let mut file = open_source(path)?;
    let mut buffer = [0u8; 2];
    let bytes_read = file.read(&mut buffer).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    if bytes_read >= 2 {
        if buffer == [0xFF, 0xFE] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 LE",
            });
        }
        if buffer == [0xFE, 0xFF] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 BE",
            });
        }
    }
    Ok(())
}

/// Result of the pre-scan pass over a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceStats {
    /// Total file size in bytes.
    pub file_size: u64,
    /// Number of lines, counting a trailing unterminated line.
    pub line_count: u64,
}

impl SourceStats {
    /// Average line width in bytes, at least 1.
    pub fn average_line_bytes(&self) -> u64 {
        if self.line_count == 0 {
            return 1;
        }
        (self.file_size / self.line_count).max(1)
    }
}

/// Scans the whole file once, collecting its byte size and line count.
///
/// This is the one extra pass the batch sizer pays for a predictable
/// memory footprint; the count also serves as the progress bar total.
pub fn scan_source(path: &Path) -> Result<SourceStats> {
    let file = open_source(path)?;
    let file_size = file
        .metadata()
        .map_err(|e| IngestError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?
        .len();

    let mut reader = BufReader::new(file);
    let mut line_count: u64 = 0;
    let mut last_byte: Option<u8> = None;
    loop {
        let buf = reader.fill_buf().map_err(|e| IngestError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        if buf.is_empty() {
            break;
        }
        line_count += buf.iter().filter(|&&b| b == b'\n').count() as u64;
        last_byte = Some(buf[buf.len() - 1]);
        let len = buf.len();
        reader.consume(len);
    }
    if let Some(b) = last_byte
        && b != b'\n'
    {
        line_count += 1;
    }
    tracing::debug!(path = %path.display(), file_size, line_count, "scanned source");
    Ok(SourceStats {
        file_size,
        line_count,
    })
}

/// Outcome of one line read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextLine {
    /// A decoded line, end-of-line terminator stripped.
    Line(String),
    /// The line's bytes do not decode under the strict policy.
    Malformed,
    /// End of input.
    Eof,
}

/// Streaming line reader: raw byte lines, decoded on demand.
pub struct LineReader {
    reader: BufReader<File>,
    path: PathBuf,
    encoding: &'static Encoding,
    policy: DecodePolicy,
    buf: Vec<u8>,
    first_line: bool,
}

impl LineReader {
    /// Opens `path` for line reading under the given encoding and policy.
    ///
    /// # Errors
    ///
    /// Returns an [`IngestError`] when the file cannot be opened.
    pub fn open(path: &Path, encoding: &'static Encoding, policy: DecodePolicy) -> Result<Self> {
        let file = open_source(path)?;
        Ok(Self {
            reader: BufReader::new(file),
            path: path.to_path_buf(),
            encoding,
            policy,
            buf: Vec::new(),
            first_line: true,
        })
    }

    /// Reads and decodes the next line.
    ///
    /// Decode failures are per-line and recoverable ([`NextLine::Malformed`]);
    /// I/O failures are fatal.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::FileRead`] on an underlying I/O failure.
    pub fn next_line(&mut self) -> Result<NextLine> {
        self.buf.clear();
        let read = self
            .reader
            .read_until(b'\n', &mut self.buf)
            .map_err(|e| IngestError::FileRead {
                path: self.path.clone(),
                source: e,
            })?;
        if read == 0 {
            return Ok(NextLine::Eof);
        }

        // strip the terminator before decoding
        while matches!(self.buf.last(), Some(b'\n' | b'\r')) {
            self.buf.pop();
        }

        // no per-line BOM sniffing: a data line that happens to start with
        // BOM-like bytes must not switch the encoding mid-file
        let (decoded, had_errors) = self.encoding.decode_without_bom_handling(&self.buf);
        let mut line = match (had_errors, self.policy) {
            (true, DecodePolicy::Strict) => return Ok(NextLine::Malformed),
            // encoding_rs substitutes U+FFFD; for `ignore` we drop the
            // substitutions, which also drops any genuine U+FFFD input
            (true, DecodePolicy::Ignore) => decoded.replace('\u{FFFD}', ""),
            _ => decoded.into_owned(),
        };
        if self.first_line {
            self.first_line = false;
            if let Some(stripped) = line.strip_prefix('\u{FEFF}') {
                line = stripped.to_string();
            }
        }
        Ok(NextLine::Line(line))
    }
}

fn open_source(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file
    }

    fn utf8() -> &'static Encoding {
        resolve_encoding("utf-8").unwrap()
    }

    #[test]
    fn test_scan_counts_lines_and_bytes() {
        let file = temp_file(b"A,1\nB,2\nC,x\n");
        let stats = scan_source(file.path()).unwrap();
        assert_eq!(stats.file_size, 12);
        assert_eq!(stats.line_count, 3);
        assert_eq!(stats.average_line_bytes(), 4);
    }

    #[test]
    fn test_scan_counts_unterminated_last_line() {
        let file = temp_file(b"A,1\nB,2");
        let stats = scan_source(file.path()).unwrap();
        assert_eq!(stats.line_count, 2);
    }

    #[test]
    fn test_scan_empty_file() {
        let file = temp_file(b"");
        let stats = scan_source(file.path()).unwrap();
        assert_eq!(stats.file_size, 0);
        assert_eq!(stats.line_count, 0);
        assert_eq!(stats.average_line_bytes(), 1);
    }

    #[test]
    fn test_read_lines_strips_terminators() {
        let file = temp_file(b"first\r\nsecond\nthird");
        let mut reader = LineReader::open(file.path(), utf8(), DecodePolicy::Strict).unwrap();
        assert_eq!(reader.next_line().unwrap(), NextLine::Line("first".into()));
        assert_eq!(reader.next_line().unwrap(), NextLine::Line("second".into()));
        assert_eq!(reader.next_line().unwrap(), NextLine::Line("third".into()));
        assert_eq!(reader.next_line().unwrap(), NextLine::Eof);
    }

    #[test]
    fn test_utf8_bom_stripped_from_first_line() {
        let file = temp_file(b"\xEF\xBB\xBFa,b\nc,d\n");
        let mut reader = LineReader::open(file.path(), utf8(), DecodePolicy::Strict).unwrap();
        assert_eq!(reader.next_line().unwrap(), NextLine::Line("a,b".into()));
    }

    #[test]
    fn test_strict_policy_rejects_bad_bytes() {
        let file = temp_file(b"good\nbad\xFF\xFEline\nalso good\n");
        let mut reader = LineReader::open(file.path(), utf8(), DecodePolicy::Strict).unwrap();
        assert_eq!(reader.next_line().unwrap(), NextLine::Line("good".into()));
        assert_eq!(reader.next_line().unwrap(), NextLine::Malformed);
        assert_eq!(
            reader.next_line().unwrap(),
            NextLine::Line("also good".into())
        );
    }

    #[test]
    fn test_replace_policy_substitutes() {
        let file = temp_file(b"bad\xFFline\n");
        let mut reader = LineReader::open(file.path(), utf8(), DecodePolicy::Replace).unwrap();
        assert_eq!(
            reader.next_line().unwrap(),
            NextLine::Line("bad\u{FFFD}line".into())
        );
    }

    #[test]
    fn test_ignore_policy_drops_bad_bytes() {
        let file = temp_file(b"bad\xFFline\n");
        let mut reader = LineReader::open(file.path(), utf8(), DecodePolicy::Ignore).unwrap();
        assert_eq!(reader.next_line().unwrap(), NextLine::Line("badline".into()));
    }

    #[test]
    fn test_cp1252_decodes() {
        // 0x80 is the euro sign in windows-1252
        let file = temp_file(b"price;\x80 5\n");
        let encoding = resolve_encoding("cp1252").unwrap();
        let mut reader = LineReader::open(file.path(), encoding, DecodePolicy::Strict).unwrap();
        assert_eq!(
            reader.next_line().unwrap(),
            NextLine::Line("price;\u{20AC} 5".into())
        );
    }

    #[test]
    fn test_utf16_bom_rejected() {
        let file = temp_file(b"\xFF\xFEa\x00,\x00b\x00\n\x00");
        let err = validate_encoding(file.path()).unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedEncoding { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = scan_source(Path::new("/no/such/extract.txt")).unwrap_err();
        assert!(matches!(err, IngestError::FileNotFound { .. }));
    }

    #[test]
    fn test_decode_policy_from_str() {
        assert_eq!(
            "strict".parse::<DecodePolicy>().unwrap(),
            DecodePolicy::Strict
        );
        assert_eq!(
            "Replace".parse::<DecodePolicy>().unwrap(),
            DecodePolicy::Replace
        );
        assert!("drop".parse::<DecodePolicy>().is_err());
    }
}
