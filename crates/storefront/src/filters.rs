//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use chrono::NaiveDate;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats an ISO date (`2026-10-01`) as `October 1, 2026`.
///
/// Values that are not ISO dates are passed through unchanged.
///
/// Usage in templates: `{{ page_date|long_date }}`
#[askama::filter_fn]
pub fn long_date(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_long_date(&value.to_string()))
}

fn format_long_date(value: &str) -> String {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_or_else(
        |_| value.to_string(),
        |date| date.format("%B %-d, %Y").to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_long_date() {
        assert_eq!(format_long_date("2026-10-01"), "October 1, 2026");
        assert_eq!(format_long_date("yesterday"), "yesterday");
    }
}
