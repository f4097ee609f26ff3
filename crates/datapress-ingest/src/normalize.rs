//! Cell normalization helpers shared by the dataset builders.
//!
//! Source workbooks are hand-maintained, so the same column can hold
//! numbers, text with thousands separators, placeholder phrases, or
//! stray whitespace. Everything funnels through the coercions here
//! before it reaches a record.

use crate::workbook::CellValue;
use chrono::NaiveDate;

/// Placeholder phrases that appear in numeric columns and mean "no value".
/// Matched after trimming and lowercasing.
const DROP_NUMERIC_TOKENS: [&str; 7] = [
    "",
    "ska",
    "sk",
    "cmim cip",
    "cmim cip +7.5%",
    "referojuni deklarates nga bam",
    "referojuni deklarates nga bam.",
];

/// Date layouts accepted for validity columns, tried in order.
const VALIDITY_FORMATS: [&str; 4] = ["%d.%m.%Y", "%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d"];

/// Trimmed text content of a cell, with empty results dropped.
///
/// Numeric cells render without a trailing `.0` so codes such as
/// authorization numbers survive the float round-trip intact.
pub fn clean_text(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Empty => None,
        CellValue::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        CellValue::Number(n) => Some(format_number(*n)),
        // Excel renders booleans uppercase.
        CellValue::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        CellValue::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
    }
}

/// Integer content of a cell, truncating fractional parts toward zero.
pub fn to_integer(cell: &CellValue) -> Option<i64> {
    match cell {
        CellValue::Empty | CellValue::DateTime(_) => None,
        CellValue::Number(n) => Some(n.trunc() as i64),
        CellValue::Bool(b) => Some(i64::from(*b)),
        CellValue::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok().map(|n| n.trunc() as i64)
        }
    }
}

/// Plain numeric content of a cell. Text values may carry `,` thousands
/// separators, which are stripped before parsing.
pub fn to_number(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Empty | CellValue::DateTime(_) => None,
        CellValue::Number(n) => Some(*n),
        CellValue::Bool(b) => Some(f64::from(u8::from(*b))),
        CellValue::Text(text) => {
            let cleaned = text.trim().replace(',', "");
            if cleaned.is_empty() {
                return None;
            }
            cleaned.parse::<f64>().ok()
        }
    }
}

/// Price-style decimal, rounded to two places.
///
/// Text values go through the full cleanup chain: placeholder phrases are
/// dropped, spaces removed, `,` treated as the decimal separator, and when
/// more than one `.` remains everything but the last is treated as a
/// thousands separator. Unparseable leftovers become `None`.
pub fn to_decimal(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Empty | CellValue::DateTime(_) => None,
        CellValue::Number(n) => Some(round2(*n)),
        CellValue::Bool(b) => Some(f64::from(u8::from(*b))),
        CellValue::Text(text) => {
            let lowered = text.trim().to_lowercase();
            if DROP_NUMERIC_TOKENS.contains(&lowered.as_str()) {
                return None;
            }
            let mut cleaned = lowered.replace(' ', "").replace(',', ".");
            if cleaned.matches('.').count() > 1 {
                let collapsed = {
                    let (left, right) = cleaned.rsplit_once('.').unwrap_or(("", ""));
                    format!("{}.{right}", left.replace('.', ""))
                };
                cleaned = collapsed;
            }
            let number = round2(cleaned.parse::<f64>().ok()?);
            // Rounding tiny negatives can leave -0.0 behind.
            Some(if number == 0.0 { 0.0 } else { number })
        }
    }
}

/// Validity dates as ISO `YYYY-MM-DD` strings.
///
/// Date-formatted cells convert directly; text cells are tried against the
/// known layouts and kept verbatim when none match, so odd annotations
/// survive into the output rather than silently disappearing.
pub fn to_validity_date(cell: &CellValue) -> Option<String> {
    if let CellValue::DateTime(dt) = cell {
        return Some(dt.date().to_string());
    }
    let text = clean_text(cell)?;
    for format in VALIDITY_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&text, format) {
            return Some(date.to_string());
        }
    }
    Some(text)
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

fn round2(n: f64) -> f64 {
    (n * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn text(value: &str) -> CellValue {
        CellValue::Text(value.to_string())
    }

    #[test]
    fn clean_text_trims_and_drops_empties() {
        assert_eq!(clean_text(&text("  Paracetamol  ")), Some("Paracetamol".to_string()));
        assert_eq!(clean_text(&text("   ")), None);
        assert_eq!(clean_text(&CellValue::Empty), None);
    }

    #[test]
    fn clean_text_collapses_integral_numbers() {
        assert_eq!(clean_text(&CellValue::Number(1234.0)), Some("1234".to_string()));
        assert_eq!(clean_text(&CellValue::Number(12.5)), Some("12.5".to_string()));
    }

    #[test]
    fn to_integer_truncates_toward_zero() {
        assert_eq!(to_integer(&CellValue::Number(7.9)), Some(7));
        assert_eq!(to_integer(&CellValue::Number(-7.9)), Some(-7));
        assert_eq!(to_integer(&text(" 42.7 ")), Some(42));
        assert_eq!(to_integer(&text("n/a")), None);
    }

    #[test]
    fn to_number_strips_thousands_commas() {
        assert_eq!(to_number(&text("1,234,567.5")), Some(1_234_567.5));
        assert_eq!(to_number(&CellValue::Number(3.25)), Some(3.25));
        assert_eq!(to_number(&text("")), None);
    }

    #[test]
    fn to_decimal_drops_placeholder_phrases() {
        for token in ["ska", "SKA", "  Cmim CIP  ", "Referojuni deklarates nga BAM."] {
            assert_eq!(to_decimal(&text(token)), None, "token {token:?}");
        }
    }

    #[test]
    fn to_decimal_reads_comma_as_decimal_separator() {
        assert_eq!(to_decimal(&text("12,5")), Some(12.5));
        assert_eq!(to_decimal(&text("1 250,75")), Some(1250.75));
    }

    #[test]
    fn to_decimal_collapses_thousands_dots() {
        assert_eq!(to_decimal(&text("1.234,56")), Some(1234.56));
        assert_eq!(to_decimal(&text("1.234.567,89")), Some(1_234_567.89));
    }

    #[test]
    fn to_decimal_rounds_to_two_places() {
        assert_eq!(to_decimal(&CellValue::Number(9.996)), Some(10.0));
        assert_eq!(to_decimal(&text("3,14159")), Some(3.14));
    }

    #[test]
    fn to_decimal_normalizes_negative_zero_text() {
        let value = to_decimal(&text("-0,001")).unwrap();
        assert_eq!(value, 0.0);
        assert!(value.is_sign_positive());
    }

    #[test]
    fn validity_dates_accept_known_layouts() {
        assert_eq!(to_validity_date(&text("31.12.2024")), Some("2024-12-31".to_string()));
        assert_eq!(to_validity_date(&text("31/12/2024")), Some("2024-12-31".to_string()));
        assert_eq!(to_validity_date(&text("31-12-2024")), Some("2024-12-31".to_string()));
        assert_eq!(to_validity_date(&text("2024-12-31")), Some("2024-12-31".to_string()));
    }

    #[test]
    fn validity_dates_convert_datetime_cells() {
        let dt = NaiveDateTime::parse_from_str("2025-03-01 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(to_validity_date(&CellValue::DateTime(dt)), Some("2025-03-01".to_string()));
    }

    #[test]
    fn unparseable_validity_text_is_kept_verbatim() {
        assert_eq!(
            to_validity_date(&text("deri ne njoftimin tjeter")),
            Some("deri ne njoftimin tjeter".to_string())
        );
        assert_eq!(to_validity_date(&CellValue::Empty), None);
    }
}
