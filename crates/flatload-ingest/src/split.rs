//! Qualifier-aware field splitting.
//!
//! Legacy extracts wrap fields that contain the delimiter in a qualifier
//! character, and mark a literal qualifier inside such a field by prefixing
//! it with an escape character. The rules are context-sensitive (an escaped
//! qualifier must not end quoting), so the splitter is a two-state scan
//! with one character of lookback rather than a regex.

/// Splitting state: inside or outside a qualified region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    Unqualified,
    Qualified,
}

/// Delimiter, qualifier, and escape configuration for one source file.
///
/// A `None` qualifier or escape disables that character's special handling;
/// with both disabled, splitting degrades to a plain split on the delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineFormat {
    pub delimiter: char,
    pub qualifier: Option<char>,
    pub escape: Option<char>,
}

impl LineFormat {
    pub fn new(delimiter: char, qualifier: Option<char>, escape: Option<char>) -> Self {
        Self {
            delimiter,
            qualifier,
            escape,
        }
    }
}

/// Splits one line (terminator already stripped) into its fields.
///
/// Scans left to right, one character at a time, looking back at the
/// previous raw character:
///
/// - A qualifier right after a delimiter or at start of line opens a
///   qualified region; the matching unescaped qualifier closes it. Both are
///   consumed, not emitted.
/// - A qualifier preceded by the escape character inside a qualified region
///   is emitted literally and quoting continues.
/// - A qualifier in the middle of an unqualified field is kept as ordinary
///   text (tolerates the malformed quoting some extracts produce).
/// - The delimiter splits only while unqualified.
///
/// There is always one more field than there are unqualified delimiters,
/// so even an empty line yields one (empty) field.
pub fn split_line(line: &str, format: &LineFormat) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut state = QuoteState::Unqualified;
    let mut prev: Option<char> = None;

    for c in line.chars() {
        if format.qualifier == Some(c) {
            match state {
                QuoteState::Unqualified => {
                    if prev.is_none() || prev == Some(format.delimiter) {
                        state = QuoteState::Qualified;
                    } else {
                        // qualifier in the middle of an unqualified field
                        current.push(c);
                    }
                }
                QuoteState::Qualified => {
                    if format.escape.is_some() && prev == format.escape {
                        current.push(c);
                    } else {
                        state = QuoteState::Unqualified;
                    }
                }
            }
        } else if c == format.delimiter && state == QuoteState::Unqualified {
            fields.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
        prev = Some(c);
    }

    // the final field, closed by end of line
    fields.push(current);
    fields
}
