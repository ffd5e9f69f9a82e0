// Utility helpers for cell normalization, date resolution and formatting.
//
// This module centralizes all the "dirty" spreadsheet-value handling so the
// rest of the code can assume clean, typed values.
use chrono::{DateTime, NaiveDate};
use num_format::{Locale, ToFormattedString};
use serde_json::Value;

/// Normalize a raw sheet cell into a non-negative quantity.
///
/// Sheet exports mix plain numbers with strings carrying currency symbols,
/// thousands separators or stray whitespace ("₹1,20,000", " 45 "). Every
/// character that is not an ASCII digit or a decimal point is stripped before
/// parsing. Anything that still fails to parse (null, empty, text) maps to
/// `0.0`. Never errors.
pub fn normalize_amount(raw: &Value) -> f64 {
    match raw {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => normalize_amount_str(s),
        _ => 0.0,
    }
}

/// String form of [`normalize_amount`], used directly on CSV fields.
pub fn normalize_amount_str(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return 0.0;
    }
    cleaned.parse::<f64>().unwrap_or(0.0)
}

/// Extract the display text of a cell (FLO name, branch, parameter keys).
pub fn cell_text(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// Resolve a loosely-formatted sheet date into a calendar date.
///
/// Order of attempts:
/// 1. RFC 3339 (sheet JSON exports dates as `2026-02-26T00:00:00.000Z`).
/// 2. Split on `/`, `.` or `-` into exactly three parts. A 4-digit first
///    part reads as year-month-day (this covers plain ISO `YYYY-MM-DD`);
///    anything else reads day-first as
///    `DD-MM-YYYY`. Two-digit years map to 2000+YY, so `03-04-25` is always
///    3 April 2025; there is no `MM-DD-YYYY` interpretation for short
///    years. The source data is day-first by convention; do not reorder.
///
/// Returns `None` for anything unparseable. The result is a `NaiveDate`, so
/// equality and set membership are day-exact with no time-of-day component.
pub fn parse_flexible_date(raw: &Value) -> Option<NaiveDate> {
    let text = cell_text(raw);
    parse_flexible_date_str(&text)
}

pub fn parse_flexible_date_str(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    // Plain ISO dates fall through to the split path, where the 4-digit
    // first part selects the year-month-day reading.
    let parts: Vec<&str> = s.split(['/', '.', '-']).map(str::trim).collect();
    if parts.len() != 3 {
        return None;
    }
    let nums: Vec<i32> = parts.iter().filter_map(|p| p.parse::<i32>().ok()).collect();
    if nums.len() != 3 {
        return None;
    }
    let (year, month, day) = if parts[0].len() == 4 {
        (nums[0], nums[1], nums[2])
    } else {
        (nums[2], nums[1], nums[0])
    };
    let year = if (0..100).contains(&year) { year + 2000 } else { year };
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

/// Format an amount in lakh, dashboard-style: `₹12.3L`.
pub fn format_lakh(n: f64) -> String {
    format!("₹{}L", format_number(n / 100_000.0, 1))
}

pub fn format_pct(p: f64) -> String {
    format!("{:.1}%", p)
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative();
    let abs_n = n.abs();
    // First, format to a plain fixed-decimal string like `1234567.89`.
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Use `num-format` to insert commas into the integer portion.
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    } else if decimals > 0 {
        res.push('.');
        res.push_str(&"0".repeat(decimals));
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for integer-like values, used for
    // counts in console messages (e.g., `1,240 records fetched`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_strips_currency_and_separators() {
        assert_eq!(normalize_amount(&json!("₹1,20,000")), 120000.0);
        assert_eq!(normalize_amount(&json!("  4500.50 ")), 4500.5);
        assert_eq!(normalize_amount(&json!("12 Nos")), 12.0);
    }

    #[test]
    fn normalize_is_idempotent_on_clean_numbers() {
        for n in [0.0, 7.0, 42.5, 120000.0] {
            assert_eq!(normalize_amount(&json!(n)), n);
            assert_eq!(normalize_amount_str(&n.to_string()), n);
        }
    }

    #[test]
    fn normalize_maps_junk_to_zero() {
        assert_eq!(normalize_amount(&Value::Null), 0.0);
        assert_eq!(normalize_amount(&json!("")), 0.0);
        assert_eq!(normalize_amount(&json!("N/A")), 0.0);
        assert_eq!(normalize_amount(&json!(true)), 0.0);
        // Two decimal points cannot parse; degrade to zero rather than guess.
        assert_eq!(normalize_amount_str("1.2.3"), 0.0);
    }

    #[test]
    fn flexible_date_reads_iso_and_rfc3339() {
        let expected = NaiveDate::from_ymd_opt(2026, 2, 26).unwrap();
        assert_eq!(parse_flexible_date_str("2026-02-26"), Some(expected));
        assert_eq!(
            parse_flexible_date_str("2026-02-26T00:00:00.000Z"),
            Some(expected)
        );
    }

    #[test]
    fn flexible_date_reads_day_first() {
        let expected = NaiveDate::from_ymd_opt(2026, 2, 26).unwrap();
        assert_eq!(parse_flexible_date_str("26/02/2026"), Some(expected));
        assert_eq!(parse_flexible_date_str("26.02.2026"), Some(expected));
        assert_eq!(parse_flexible_date_str("26-02-2026"), Some(expected));
    }

    #[test]
    fn flexible_date_reads_year_first_when_four_digits() {
        assert_eq!(
            parse_flexible_date_str("2026/02/26"),
            NaiveDate::from_ymd_opt(2026, 2, 26)
        );
    }

    #[test]
    fn flexible_date_short_year_is_day_month_2000s() {
        // `03-04-25` is day 3, month 4, year 2025 by convention.
        assert_eq!(
            parse_flexible_date_str("03-04-25"),
            NaiveDate::from_ymd_opt(2025, 4, 3)
        );
    }

    #[test]
    fn flexible_date_rejects_garbage() {
        assert_eq!(parse_flexible_date_str(""), None);
        assert_eq!(parse_flexible_date_str("soon"), None);
        assert_eq!(parse_flexible_date_str("26/02"), None);
        assert_eq!(parse_flexible_date_str("99/99/2026"), None);
        assert_eq!(parse_flexible_date(&Value::Null), None);
    }

    #[test]
    fn lakh_formatting() {
        assert_eq!(format_lakh(1_230_000.0), "₹12.3L");
        assert_eq!(format_lakh(-50_000.0), "₹-0.5L");
    }
}
