//! Shared helper functions for CLI commands

use chrono::{DateTime, Local, NaiveDate, Utc};
use console::style;

use crate::core::search::find_match_span;

/// Truncate a string to max_len chars, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Human date like `Feb 15, 2026`
pub fn format_human_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Human date of a timestamp in the local timezone
pub fn format_date(ts: &DateTime<Utc>) -> String {
    format_human_date(ts.with_timezone(&Local).date_naive())
}

/// Style the first whitespace-insensitive match of `query` in `text`
///
/// Returns the text unchanged when there is no match.
pub fn highlight(text: &str, query: &str) -> String {
    match find_match_span(text, query) {
        Some(span) => format!(
            "{}{}{}",
            &text[..span.start],
            style(&text[span.clone()]).black().on_yellow().bold(),
            &text[span.end..]
        ),
        None => text.to_string(),
    }
}

/// Placeholder for absent optional text
pub fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}
