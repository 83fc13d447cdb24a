//! Coercion of scraped text into typed inputs.

use chrono::NaiveDate;

use crate::error::{EngineError, Result};
use crate::types::{format_date, DATE_FORMAT};

/// Date layouts seen on the scraped pages.
const SCRAPED_DATE_FORMATS: [&str; 6] = [
    "%B %d, %Y",
    "%A, %B %d, %Y",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%b %d, %Y",
    DATE_FORMAT,
];

/// Parse a scraped date into `YYYY-MM-DD`.
///
/// A `m/d/yy` fragment embedded in surrounding text (e.g.
/// `"Data as of 5/9/23 4:00 PM"`) takes precedence.
pub fn parse_scraped_date(text: &str) -> Result<String> {
    let trimmed = text.trim();
    let candidate = slash_date_fragment(trimmed).unwrap_or(trimmed);

    SCRAPED_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(candidate, fmt).ok())
        .map(format_date)
        .ok_or_else(|| EngineError::validation(format!("invalid date format: '{}'", trimmed)))
}

fn slash_date_fragment(text: &str) -> Option<&str> {
    text.split(|c: char| c.is_whitespace() || c == ',' || c == '(' || c == ')')
        .find(|token| {
            let parts: Vec<&str> = token.split('/').collect();
            parts.len() == 3
                && parts.iter().all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
                && parts[0].len() <= 2
                && parts[1].len() <= 2
                && (parts[2].len() == 2 || parts[2].len() == 4)
        })
}

/// Keep digits, `-` and `.` and parse the rest as a number.
pub fn clean_number(text: &str) -> Result<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-' || *c == '.')
        .collect();

    cleaned
        .parse::<f64>()
        .map_err(|_| EngineError::validation(format!("'{}' is not a number", text)))
}

/// Drop parenthesized fragments, trim and upper-case.
pub fn normalize_ticker(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut depth = 0usize;
    for c in raw.chars() {
        match c {
            '(' => depth += 1,
            ')' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out.trim().to_uppercase()
}
