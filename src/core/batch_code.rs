//! Batch code format: `PARTNUMBER-YYYYMMDD-SEQ`
//!
//! Example: `AB123-20260215-001`. The creation path does not require codes to
//! follow this format; these helpers exist for operators who want it.

use chrono::{Local, NaiveDate};

/// Width of the zero-padded sequence suffix
const SEQ_DIGITS: usize = 3;

/// Width of the `YYYYMMDD` date group
const DATE_DIGITS: usize = 8;

/// Components of a batch code that follows the standard format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBatchCode {
    pub part_number: String,
    pub date: NaiveDate,
    pub sequence: u32,
}

/// Generate a batch code for today's (local) date
///
/// `last_sequence` is the last sequence number already used today; the code
/// gets the next one.
pub fn generate_batch_code(part_number: &str, last_sequence: u32) -> String {
    generate_batch_code_on(part_number, last_sequence, Local::now().date_naive())
}

/// Generate a batch code for an explicit production date
pub fn generate_batch_code_on(part_number: &str, last_sequence: u32, date: NaiveDate) -> String {
    format!(
        "{}-{}-{:0width$}",
        part_number,
        date.format("%Y%m%d"),
        last_sequence.saturating_add(1),
        width = SEQ_DIGITS
    )
}

/// Parse a batch code into its components
///
/// Returns `None` when the code does not end in `-<8 digits>-<3 digits>`
/// with a non-empty single-line prefix, or when the digits do not form a
/// real calendar date.
pub fn parse_batch_code(code: &str) -> Option<ParsedBatchCode> {
    let (rest, seq) = code.rsplit_once('-')?;
    let (part_number, date) = rest.rsplit_once('-')?;

    if seq.len() != SEQ_DIGITS || !all_ascii_digits(seq) {
        return None;
    }
    if date.len() != DATE_DIGITS || !all_ascii_digits(date) {
        return None;
    }
    if part_number.is_empty() || part_number.contains(is_line_break) {
        return None;
    }

    let year: i32 = date[0..4].parse().ok()?;
    let month: u32 = date[4..6].parse().ok()?;
    let day: u32 = date[6..8].parse().ok()?;

    Some(ParsedBatchCode {
        part_number: part_number.to_string(),
        date: NaiveDate::from_ymd_opt(year, month, day)?,
        sequence: seq.parse().ok()?,
    })
}

fn all_ascii_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

fn is_line_break(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_generate_uses_next_sequence() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 15).unwrap();
        assert_eq!(generate_batch_code_on("AB123", 4, date), "AB123-20260215-005");
        assert_eq!(generate_batch_code_on("AB123", 0, date), "AB123-20260215-001");
    }

    #[test]
    fn test_generate_for_today() {
        let today = Local::now().date_naive();
        let code = generate_batch_code("AB123", 4);
        let expected = format!(
            "AB123-{:04}{:02}{:02}-005",
            today.year(),
            today.month(),
            today.day()
        );
        // Guard against the date rolling over between the two calls
        if Local::now().date_naive() == today {
            assert_eq!(code, expected);
        }
    }

    #[test]
    fn test_generate_sequence_overflows_padding() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        assert_eq!(generate_batch_code_on("X1", 999, date), "X1-20260102-1000");
    }

    #[test]
    fn test_parse_standard_code() {
        let parsed = parse_batch_code("AB123-20260215-005").unwrap();
        assert_eq!(parsed.part_number, "AB123");
        assert_eq!(parsed.date, NaiveDate::from_ymd_opt(2026, 2, 15).unwrap());
        assert_eq!(parsed.sequence, 5);
    }

    #[test]
    fn test_parse_part_number_with_dashes() {
        let parsed = parse_batch_code("AF-200-X-20251231-120").unwrap();
        assert_eq!(parsed.part_number, "AF-200-X");
        assert_eq!(parsed.sequence, 120);
    }

    #[test]
    fn test_parse_rejects_non_matching_codes() {
        assert_eq!(parse_batch_code("not-a-code"), None);
        assert_eq!(parse_batch_code(""), None);
        assert_eq!(parse_batch_code("-20260215-005"), None);
        assert_eq!(parse_batch_code("AB123-2026021-005"), None);
        assert_eq!(parse_batch_code("AB123-20260215-05"), None);
        assert_eq!(parse_batch_code("AB123-20260215-1000"), None);
        assert_eq!(parse_batch_code("AB\n123-20260215-005"), None);
        assert_eq!(parse_batch_code("AB123-2026O215-005"), None);
    }

    #[test]
    fn test_parse_rejects_impossible_dates() {
        assert_eq!(parse_batch_code("AB123-20261340-001"), None);
        assert_eq!(parse_batch_code("AB123-20250229-001"), None);
    }

    #[test]
    fn test_generated_codes_parse_back() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let code = generate_batch_code_on("OF-77", 11, date);
        let parsed = parse_batch_code(&code).unwrap();
        assert_eq!(parsed.part_number, "OF-77");
        assert_eq!(parsed.date, date);
        assert_eq!(parsed.sequence, 12);
    }
}
