//! Date parsing for ingested columns.
//!
//! Source files carry dates in ISO 8601 or in one of the common export
//! layouts (`15-Jan-2024`, `01/15/2024`, `20240115`, ...). Only complete
//! dates are usable as event or censoring dates; partial ones (`2024-01`,
//! `2024`) are recognised so they can be reported but never imputed.

use chrono::{NaiveDate, NaiveDateTime};

/// Outcome of parsing one date cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatePrecision {
    /// Blank cell.
    Empty,
    /// A complete calendar date (a datetime keeps only its date part).
    Complete(NaiveDate),
    /// Year and month only: YYYY-MM
    YearMonth { year: i32, month: u32 },
    /// Year only: YYYY
    Year(i32),
    /// Not a recognised date.
    Unknown(String),
}

impl DatePrecision {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Complete(date) => Some(*date),
            _ => None,
        }
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, Self::YearMonth { .. } | Self::Year(_))
    }
}

/// Parse a date cell, keeping track of how much of it was present.
pub fn parse_date_precision(value: &str) -> DatePrecision {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return DatePrecision::Empty;
    }
    if let Some(date) = try_parse_date(trimmed) {
        return DatePrecision::Complete(date);
    }
    if let Some(datetime) = try_parse_datetime(trimmed) {
        return DatePrecision::Complete(datetime.date());
    }
    if let Some(partial) = try_parse_partial(trimmed) {
        return partial;
    }
    DatePrecision::Unknown(trimmed.to_string())
}

/// Parse a complete date, or `None` for blank, partial or unrecognised input.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use adam_ingest::parse_date;
///
/// let expected = NaiveDate::from_ymd_opt(2024, 1, 15);
/// assert_eq!(parse_date("2024-01-15"), expected);
/// assert_eq!(parse_date("15-Jan-2024"), expected);
/// assert_eq!(parse_date("2024-01-15T10:30"), expected);
/// assert_eq!(parse_date("2024-01"), None);
/// ```
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    parse_date_precision(value).date()
}

fn try_parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let formats = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%d-%b-%Y %H:%M:%S",
        "%d-%b-%Y %H:%M",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
    ];
    formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

fn try_parse_date(value: &str) -> Option<NaiveDate> {
    let formats = [
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%d-%b-%Y",  // 15-Jan-2024
        "%d%b%Y",    // 15JAN2024 (SAS DATE9.)
        "%d-%B-%Y",  // 15-January-2024
        "%m/%d/%Y",  // US: 01/15/2024
        "%d.%m.%Y",  // German: 15.01.2024
        "%Y%m%d",    // Compact: 20240115
        "%b %d, %Y", // Jan 15, 2024
        "%d %b %Y",  // 15 Jan 2024
    ];
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

fn try_parse_partial(value: &str) -> Option<DatePrecision> {
    if value.len() == 7 && value.as_bytes().get(4) == Some(&b'-') {
        let year = value.get(0..4)?.parse::<i32>().ok()?;
        let month = value.get(5..7)?.parse::<u32>().ok()?;
        return (1..=12)
            .contains(&month)
            .then_some(DatePrecision::YearMonth { year, month });
    }
    if value.len() == 4 {
        let year = value.parse::<i32>().ok()?;
        return (1900..=2100)
            .contains(&year)
            .then_some(DatePrecision::Year(year));
    }
    None
}
