//! Quotation dates.
//!
//! The editor shows dates as `DD/MM/YYYY`; storage uses `YYYY-MM-DD`. Stored
//! records may also carry full RFC 3339 timestamps.

use chrono::{DateTime, NaiveDate};

/// Format used by the editor and on printed documents.
pub const DISPLAY_FORMAT: &str = "%d/%m/%Y";

/// Format used in persistence payloads.
pub const STORAGE_FORMAT: &str = "%Y-%m-%d";

/// Parse a date in any accepted representation.
///
/// Returns `None` for blank or unrecognised input.
///
/// ```
/// use chrono::NaiveDate;
/// use salesdesk_core::date::parse_date;
///
/// let expected = NaiveDate::from_ymd_opt(2025, 5, 14);
/// assert_eq!(parse_date("14/05/2025"), expected);
/// assert_eq!(parse_date("2025-05-14"), expected);
/// assert_eq!(parse_date("2025-05-14T10:30:00+05:30"), expected);
/// assert_eq!(parse_date("tomorrow"), None);
/// ```
#[must_use]
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(input, STORAGE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(input, DISPLAY_FORMAT))
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(input)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// `DD/MM/YYYY`.
#[must_use]
pub fn display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

/// `YYYY-MM-DD`.
#[must_use]
pub fn storage_date(date: NaiveDate) -> String {
    date.format(STORAGE_FORMAT).to_string()
}
