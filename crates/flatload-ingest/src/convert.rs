//! String-to-typed-value conversion per field type code.
//!
//! The conversion quirks here mirror the source system's export behavior:
//! packed decimals carry a trailing sign and thousands separators, dates
//! use `00000000` as "no date", and out-of-range times collapse to
//! midnight instead of failing the row.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;

use flatload_model::{FieldSpec, RecordSchema, TypeCode, TypedRow, Value};

use crate::error::RowError;

/// Converts one raw field string to its typed value.
///
/// The empty string is null for every type code. Date conversion never
/// fails: unparseable or sentinel dates become null.
///
/// # Errors
///
/// Returns [`RowError::Conversion`] when a numeric, packed, or time field
/// does not parse. The caller skips the row and keeps going.
pub fn convert_field(spec: &FieldSpec, raw: &str) -> Result<Value, RowError> {
    if raw.is_empty() {
        return Ok(Value::Null);
    }
    let fail = || RowError::Conversion {
        field: spec.name.clone(),
        code: spec.code,
        value: raw.to_string(),
    };
    match spec.code {
        TypeCode::Integer => raw
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| fail()),
        TypeCode::Decimal => raw
            .trim()
            .parse::<Decimal>()
            .map(Value::Decimal)
            .map_err(|_| fail()),
        TypeCode::Packed => parse_packed(raw.trim())
            .map(Value::Decimal)
            .ok_or_else(fail),
        TypeCode::Char | TypeCode::Numc | TypeCode::Text => Ok(Value::Text(raw.to_string())),
        TypeCode::Date => Ok(parse_date(raw).map_or(Value::Null, Value::Date)),
        TypeCode::Time => {
            let cleaned = raw.replace(':', "");
            if cleaned.chars().count() != 6 {
                return Ok(Value::Null);
            }
            parse_time(&cleaned).map(Value::Time).ok_or_else(fail)
        }
    }
}

/// Converts a parsed field sequence into a typed row, positionally.
///
/// Fields beyond the schema length are ignored; a short sequence is a
/// truncated-row rejection.
///
/// # Errors
///
/// Returns [`RowError::Truncated`] when `fields` is shorter than the
/// schema, or the first field's [`RowError::Conversion`].
pub fn convert_row(fields: &[String], schema: &RecordSchema) -> Result<TypedRow, RowError> {
    if fields.len() < schema.len() {
        let got = fields.len();
        return Err(RowError::Truncated {
            got,
            expected: schema.len(),
            last_field: schema.fields()[got.saturating_sub(1)].name.clone(),
        });
    }
    schema
        .iter()
        .zip(fields)
        .map(|(spec, raw)| convert_field(spec, raw))
        .collect()
}

/// Packed decimal: thousands separators stripped, trailing `-` negates.
fn parse_packed(raw: &str) -> Option<Decimal> {
    let cleaned = raw.replace(',', "");
    if let Some(body) = cleaned.strip_suffix('-') {
        body.parse::<Decimal>().ok().map(|d| -d)
    } else {
        cleaned.parse::<Decimal>().ok()
    }
}

/// `YYYYMMDD` or `YYYY-MM-DD`; all-zero and non-calendar values are None.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let cleaned = raw.replace('-', "");
    if cleaned.chars().count() < 8 {
        return None;
    }
    let digits: String = cleaned.chars().take(8).collect();
    if digits == "00000000" {
        return None;
    }
    let year = digits.get(0..4)?.parse::<i32>().ok()?;
    let month = digits.get(4..6)?.parse::<u32>().ok()?;
    let day = digits.get(6..8)?.parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Six-digit `HHMMSS` (separators already stripped). Out-of-range
/// components collapse to the midnight sentinel; non-numeric input is None.
fn parse_time(cleaned: &str) -> Option<NaiveTime> {
    let hour = cleaned.get(0..2)?.parse::<u32>().ok()?;
    let minute = cleaned.get(2..4)?.parse::<u32>().ok()?;
    let second = cleaned.get(4..6)?.parse::<u32>().ok()?;
    if hour >= 24 || minute >= 60 || second >= 60 {
        return Some(NaiveTime::MIN);
    }
    NaiveTime::from_hms_opt(hour, minute, second)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(code: TypeCode) -> FieldSpec {
        FieldSpec::new("FLD", code)
    }

    fn convert(code: TypeCode, raw: &str) -> Result<Value, RowError> {
        convert_field(&spec(code), raw)
    }

    #[test]
    fn test_empty_is_null_for_every_code() {
        for code in [
            TypeCode::Integer,
            TypeCode::Decimal,
            TypeCode::Packed,
            TypeCode::Char,
            TypeCode::Date,
            TypeCode::Time,
        ] {
            assert_eq!(convert(code, "").unwrap(), Value::Null);
        }
    }

    #[test]
    fn test_integer() {
        assert_eq!(convert(TypeCode::Integer, "42").unwrap(), Value::Integer(42));
        assert_eq!(
            convert(TypeCode::Integer, " -7 ").unwrap(),
            Value::Integer(-7)
        );
        assert!(convert(TypeCode::Integer, "x").is_err());
        assert!(convert(TypeCode::Integer, "1.5").is_err());
    }

    #[test]
    fn test_decimal() {
        assert_eq!(
            convert(TypeCode::Decimal, "12.50").unwrap(),
            Value::Decimal("12.50".parse().unwrap())
        );
        assert!(convert(TypeCode::Decimal, "12,50").is_err());
    }

    #[test]
    fn test_packed_trailing_sign_and_separators() {
        assert_eq!(
            convert(TypeCode::Packed, "1234-").unwrap(),
            Value::Decimal("-1234".parse().unwrap())
        );
        assert_eq!(
            convert(TypeCode::Packed, "1,234").unwrap(),
            Value::Decimal("1234".parse().unwrap())
        );
        assert_eq!(
            convert(TypeCode::Packed, "1,234.56-").unwrap(),
            Value::Decimal("-1234.56".parse().unwrap())
        );
        assert!(convert(TypeCode::Packed, "12x4").is_err());
    }

    #[test]
    fn test_text_passes_through_unmodified() {
        assert_eq!(
            convert(TypeCode::Char, "  spaced  ").unwrap(),
            Value::Text("  spaced  ".to_string())
        );
        assert_eq!(
            convert(TypeCode::Numc, "0012").unwrap(),
            Value::Text("0012".to_string())
        );
    }

    #[test]
    fn test_date_sentinels_and_formats() {
        assert_eq!(convert(TypeCode::Date, "00000000").unwrap(), Value::Null);
        assert_eq!(
            convert(TypeCode::Date, "20231105").unwrap(),
            Value::Date(NaiveDate::from_ymd_opt(2023, 11, 5).unwrap())
        );
        assert_eq!(
            convert(TypeCode::Date, "2023-11-05").unwrap(),
            Value::Date(NaiveDate::from_ymd_opt(2023, 11, 5).unwrap())
        );
        // not a calendar date, but never a row error
        assert_eq!(convert(TypeCode::Date, "20230229").unwrap(), Value::Null);
        assert_eq!(convert(TypeCode::Date, "2023").unwrap(), Value::Null);
        assert_eq!(convert(TypeCode::Date, "20231x05").unwrap(), Value::Null);
        // longer values parse from their first eight digits
        assert_eq!(
            convert(TypeCode::Date, "20231105123045").unwrap(),
            Value::Date(NaiveDate::from_ymd_opt(2023, 11, 5).unwrap())
        );
    }

    #[test]
    fn test_time_sentinel_and_formats() {
        assert_eq!(
            convert(TypeCode::Time, "143005").unwrap(),
            Value::Time(NaiveTime::from_hms_opt(14, 30, 5).unwrap())
        );
        assert_eq!(
            convert(TypeCode::Time, "14:30:05").unwrap(),
            Value::Time(NaiveTime::from_hms_opt(14, 30, 5).unwrap())
        );
        // out of range collapses to midnight
        assert_eq!(
            convert(TypeCode::Time, "250000").unwrap(),
            Value::Time(NaiveTime::MIN)
        );
        assert_eq!(
            convert(TypeCode::Time, "126100").unwrap(),
            Value::Time(NaiveTime::MIN)
        );
        assert!(convert(TypeCode::Time, "12a000").is_err());
        // wrong length is null, matching the export's "no time" padding
        assert_eq!(convert(TypeCode::Time, "1430").unwrap(), Value::Null);
    }

    #[test]
    fn test_convert_row_success() {
        let schema = RecordSchema::from_manifest("f1 C, f2 I").unwrap();
        let fields = vec!["A".to_string(), "1".to_string()];
        assert_eq!(
            convert_row(&fields, &schema).unwrap(),
            vec![Value::Text("A".to_string()), Value::Integer(1)]
        );
    }

    #[test]
    fn test_convert_row_truncated() {
        let schema = RecordSchema::from_manifest("f1 C, f2 I, f3 D").unwrap();
        let fields = vec!["A".to_string()];
        let err = convert_row(&fields, &schema).unwrap_err();
        assert_eq!(
            err,
            RowError::Truncated {
                got: 1,
                expected: 3,
                last_field: "f1".to_string(),
            }
        );
    }

    #[test]
    fn test_convert_row_ignores_excess_fields() {
        let schema = RecordSchema::from_manifest("f1 C").unwrap();
        let fields = vec!["A".to_string(), "extra".to_string()];
        assert_eq!(
            convert_row(&fields, &schema).unwrap(),
            vec![Value::Text("A".to_string())]
        );
    }

    #[test]
    fn test_convert_row_conversion_failure_names_field() {
        let schema = RecordSchema::from_manifest("f1 C, f2 I").unwrap();
        let fields = vec!["A".to_string(), "x".to_string()];
        let err = convert_row(&fields, &schema).unwrap_err();
        assert!(matches!(err, RowError::Conversion { ref field, .. } if field == "f2"));
    }
}
