//! Display formatting shared by the payroll and invoice documents.
//!
//! Money, percentages, dates, filename tokens and Typst string escaping.

use chrono::{Local, NaiveDate};

/// Rendered in place of a date that was never entered.
pub const NOT_AVAILABLE: &str = "N/A";

/// Input formats accepted for date fields, tried in order.
const DATE_INPUT_FORMATS: [&str; 5] = ["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y", "%Y/%m/%d", "%B %d, %Y"];

/// Fixed display format for dates on generated documents (e.g. "March 5, 2025").
const DATE_DISPLAY_FORMAT: &str = "%B %-d, %Y";

/// Parse a raw numeric field value. Blank or malformed input yields `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Parse a raw numeric field, treating blank or malformed input as zero.
pub fn number_or_zero(raw: &str) -> f64 {
    parse_number(raw).unwrap_or(0.0)
}

/// Format an amount with the currency prefix and two-decimal grouping,
/// e.g. `₱1,234.56` or `-₱20.00`.
pub fn format_currency(amount: f64, prefix: &str) -> String {
    let magnitude = amount.abs();
    let mut whole = magnitude.trunc();
    let mut cents = ((magnitude - whole) * 100.0).round();
    if cents >= 100.0 {
        whole += 1.0;
        cents = 0.0;
    }
    let sign = if amount < 0.0 && (whole > 0.0 || cents > 0.0) {
        "-"
    } else {
        ""
    };

    // integral f64 values print exactly with no precision
    format!(
        "{sign}{prefix}{}.{:02.0}",
        group_thousands(&format!("{whole:.0}")),
        cents
    )
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    grouped
}

/// Format a plain quantity, dropping trailing zeros (`40`, `37.5`).
pub fn format_quantity(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        return format!("{:.0}", value.round());
    }

    let fixed = format!("{value:.2}");
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Format a percentage, dropping the decimal point when it is integral
/// (`12%`, `12.5%`).
pub fn format_percent(percent: f64) -> String {
    format!("{}%", format_quantity(percent))
}

/// Parse a date in any of the accepted input formats.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    DATE_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// Render a date for display: the fixed format when parseable, the raw text
/// when not, or [`NOT_AVAILABLE`] when blank.
pub fn format_display_date(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return NOT_AVAILABLE.to_string();
    }

    match parse_date(trimmed) {
        Some(date) => date.format(DATE_DISPLAY_FORMAT).to_string(),
        None => trimmed.to_string(),
    }
}

/// Today's date in the document display format.
pub fn today_display() -> String {
    Local::now()
        .date_naive()
        .format(DATE_DISPLAY_FORMAT)
        .to_string()
}

/// Escape special characters for Typst strings.
pub fn escape_typst_string(value: &str) -> String {
    value
        .replace('\\', r"\\")
        .replace('"', r#"\""#)
        .replace('\n', r"\n")
}

/// A Typst string literal in markup position, e.g. `#"Juan \"JD\" Cruz"`.
pub fn typst_text(value: &str) -> String {
    format!("#\"{}\"", escape_typst_string(value))
}

/// Sanitize a display name into a lower-case, dash-separated filename token.
pub fn sanitize_filename(name: &str, fallback: &str) -> String {
    let mut result = String::new();
    let mut last_dash = false;

    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            result.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || ch == '-' || ch == '_' || ch == '/' || ch == '.')
            && !last_dash
            && !result.is_empty()
        {
            result.push('-');
            last_dash = true;
        }
    }

    let result = result.trim_matches('-');
    if result.is_empty() {
        return fallback.to_string();
    }

    result.to_string()
}
