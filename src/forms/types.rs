use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::AvailabilityWindow;
use crate::error::{LogbookError, Result};

/// Countries offered in the booking form, sorted.
pub const EUROPEAN_COUNTRIES: &[&str] = &[
    "Albania", "Andorra", "Armenia", "Austria", "Azerbaijan", "Belarus", "Belgium",
    "Bosnia and Herzegovina", "Bulgaria", "Croatia", "Cyprus", "Czech Republic", "Denmark",
    "Estonia", "Finland", "France", "Georgia", "Germany", "Greece", "Hungary", "Iceland",
    "Ireland", "Italy", "Kazakhstan", "Kosovo", "Latvia", "Liechtenstein", "Lithuania",
    "Luxembourg", "Malta", "Moldova", "Monaco", "Montenegro", "Netherlands", "North Macedonia",
    "Norway", "Poland", "Portugal", "Romania", "Russia", "San Marino", "Serbia", "Slovakia",
    "Slovenia", "Spain", "Sweden", "Switzerland", "Turkey", "Ukraine", "United Kingdom",
    "Vatican City",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    #[default]
    #[serde(rename = "House Concert")]
    HouseConcert,
    #[serde(rename = "Private Session")]
    PrivateSession,
    #[serde(rename = "Public Venue")]
    PublicVenue,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::HouseConcert => "House Concert",
            EventType::PrivateSession => "Private Session",
            EventType::PublicVenue => "Public Venue",
        }
    }
}

/// A host asking the duo to stop in their town.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub name: String,
    pub email: String,
    pub country: String,
    /// City or town.
    pub location: String,
    pub address: String,
    pub event_type: EventType,
    pub message: String,
    /// Days of the availability month, ascending and unique.
    pub selected_days: BTreeSet<u32>,
}

impl BookingRequest {
    /// Select `day` if unselected, otherwise unselect it. Returns whether the
    /// day is now selected.
    pub fn toggle_day(&mut self, day: u32, window: AvailabilityWindow) -> Result<bool> {
        if NaiveDate::from_ymd_opt(window.year, window.month, day).is_none() {
            return Err(LogbookError::InvalidDate(format!(
                "{} {}",
                month_name(window),
                day
            )));
        }
        if self.selected_days.remove(&day) {
            Ok(false)
        } else {
            self.selected_days.insert(day);
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        required("name", &self.name)?;
        required("email", &self.email)?;
        required("country", &self.country)?;
        required("location", &self.location)?;
        required("address", &self.address)?;
        required("message", &self.message)?;
        if !self.email.contains('@') {
            return Err(LogbookError::InvalidField {
                field: "email",
                reason: format!("'{}' is not an email address", self.email),
            });
        }
        if !EUROPEAN_COUNTRIES.contains(&self.country.as_str()) {
            return Err(LogbookError::InvalidField {
                field: "country",
                reason: format!("'{}' is not on the tour", self.country),
            });
        }
        Ok(())
    }
}

/// A song someone would like to hear.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SongWish {
    pub song_name: String,
    pub artist_name: String,
    /// Optional reference recording.
    pub version_link: String,
    pub description: String,
    pub requester_name: String,
}

impl SongWish {
    pub fn validate(&self) -> Result<()> {
        required("requester_name", &self.requester_name)?;
        required("song_name", &self.song_name)?;
        required("artist_name", &self.artist_name)?;
        required("description", &self.description)?;
        Ok(())
    }
}

/// Human phrase for the selected days, as sent to the duo.
pub fn describe_dates(days: &BTreeSet<u32>, window: AvailabilityWindow) -> String {
    let month = month_name(window);
    if days.is_empty() {
        return format!("Open to various dates in {} {}", month, window.year);
    }
    let listed: Vec<String> = days.iter().map(|d| format!("{} {}", month, d)).collect();
    format!(
        "Proposed dates in {} {}: {}",
        month,
        window.year,
        listed.join(", ")
    )
}

pub(crate) fn month_name(window: AvailabilityWindow) -> String {
    NaiveDate::from_ymd_opt(window.year, window.month, 1)
        .map(|d| d.format("%B").to_string())
        .unwrap_or_else(|| format!("month {}", window.month))
}

fn required(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(LogbookError::MissingField(field))
    } else {
        Ok(())
    }
}
