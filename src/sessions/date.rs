//! Session date strings.
//!
//! Dates are stored as display strings ("July 1, 2026"). Anything containing
//! the word "announced" is the sentinel for a date that is not fixed yet.

use chrono::NaiveDate;

use crate::error::{LogbookError, Result};

/// Canonical sentinel literal written by the admin console.
pub const ANNOUNCED_SENTINEL: &str = "Date to be announced";

const DATE_FORMATS: &[&str] = &["%B %d, %Y", "%b %d, %Y", "%B %d %Y", "%d %B %Y", "%Y-%m-%d"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionDate {
    /// Not announced yet; always upcoming.
    Announced,
    On(NaiveDate),
}

pub fn is_announced_sentinel(raw: &str) -> bool {
    raw.to_lowercase().contains("announced")
}

/// Parse a display date string into a [`SessionDate`].
pub fn parse_session_date(raw: &str) -> Result<SessionDate> {
    let trimmed = raw.trim();
    if is_announced_sentinel(trimmed) {
        return Ok(SessionDate::Announced);
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .map(SessionDate::On)
        .ok_or_else(|| LogbookError::InvalidDate(raw.to_string()))
}

/// Render a date the way the shipped data writes them ("July 1, 2026").
pub fn format_session_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}
