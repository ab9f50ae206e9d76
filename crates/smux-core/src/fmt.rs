// Number formatting for display.
//
// Locale-free: the integer part is grouped in threes with an apostrophe,
// any fractional part is left as is.

use chrono::NaiveDateTime;

/// Thousands separator.
pub const GROUP_SEP: char = '\'';

/// Format a signed integer with apostrophe grouping: `1234567` → `1'234'567`.
pub fn fmt_num(value: i128) -> String {
    group_digits(&value.to_string())
}

/// Fixed one-decimal rendering, no grouping: `12.345` → `12.3`.
pub fn fmt_fixed1(value: f64) -> String {
    format!("{value:.1}")
}

/// Insert [`GROUP_SEP`] into the integer digits of a decimal string.
///
/// A leading sign and everything from the first `.` onwards pass through
/// untouched, so `-1234.5678` becomes `-1'234.5678`.
pub fn group_digits(num: &str) -> String {
    let (sign, rest) = match num.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", num),
    };
    let (int, frac) = match rest.find('.') {
        Some(dot) => rest.split_at(dot),
        None => (rest, ""),
    };

    let mut out = String::with_capacity(num.len() + int.len() / 3);
    out.push_str(sign);
    let len = int.len();
    for (i, c) in int.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(GROUP_SEP);
        }
        out.push(c);
    }
    out.push_str(frac);
    out
}

/// Compact UTC timestamp as sent by the server.
const COMPACT_TIME: &str = "%Y%m%dT%H%M%SZ";

/// `20250102T030405Z` → `2025-01-02 03:04:05 UTC`. Anything else is returned verbatim.
pub fn fmt_compact_time(raw: &str) -> String {
    match NaiveDateTime::parse_from_str(raw, COMPACT_TIME) {
        Ok(t) => t.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        Err(_) => raw.to_owned(),
    }
}
