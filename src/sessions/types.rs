use serde::{Deserialize, Serialize};
use url::Url;

use super::date::{parse_session_date, SessionDate};
use crate::error::{LogbookError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    #[default]
    Upcoming,
    SoldOut,
    Cancelled,
    Private,
}

impl SessionStatus {
    /// Public-facing label shown next to a session.
    pub fn label(&self) -> &'static str {
        match self {
            SessionStatus::Upcoming => "Boarding Now",
            SessionStatus::SoldOut => "Fully Booked",
            SessionStatus::Cancelled => "Cancelled",
            SessionStatus::Private => "Private Event",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// One performance in the tour schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub city: String,
    pub country: String,
    pub venue: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Display date, or the "announced" sentinel.
    pub date: String,
    pub time: String,
    pub status: SessionStatus,
    pub coordinates: Coordinates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tickets_url: Option<String>,
}

impl Session {
    /// Parsed form of `date`. Errors only for records that bypassed validation.
    pub fn parsed_date(&self) -> Result<SessionDate> {
        parse_session_date(&self.date)
    }
}

/// Input to `add`/`update`. Blank strings count as missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDraft {
    #[serde(default)]
    pub id: Option<String>,
    pub city: String,
    pub country: String,
    pub venue: String,
    #[serde(default)]
    pub address: Option<String>,
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub status: SessionStatus,
    #[serde(default)]
    pub coordinates: Coordinates,
    #[serde(default)]
    pub tickets_url: Option<String>,
}

impl SessionDraft {
    /// Check required fields, the date and coordinates.
    pub fn validate(&self) -> Result<SessionDate> {
        let required = [
            ("city", &self.city),
            ("country", &self.country),
            ("venue", &self.venue),
            ("date", &self.date),
            ("time", &self.time),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(LogbookError::MissingField(field));
            }
        }

        let date = parse_session_date(&self.date)?;

        if !self.coordinates.is_valid() {
            return Err(LogbookError::InvalidCoordinates {
                lat: self.coordinates.lat,
                lng: self.coordinates.lng,
            });
        }

        if let Some(link) = non_blank(&self.tickets_url) {
            Url::parse(&link).map_err(|_| LogbookError::InvalidUrl(link.clone()))?;
        }

        Ok(date)
    }

    /// Build the stored record. Call `validate` first.
    pub(crate) fn into_session(self, id: String) -> Session {
        Session {
            id,
            city: self.city.trim().to_string(),
            country: self.country.trim().to_string(),
            venue: self.venue.trim().to_string(),
            address: non_blank(&self.address),
            date: self.date.trim().to_string(),
            time: self.time.trim().to_string(),
            status: self.status,
            coordinates: self.coordinates,
            tickets_url: non_blank(&self.tickets_url),
        }
    }
}

impl From<Session> for SessionDraft {
    fn from(s: Session) -> Self {
        Self {
            id: Some(s.id),
            city: s.city,
            country: s.country,
            venue: s.venue,
            address: s.address,
            date: s.date,
            time: s.time,
            status: s.status,
            coordinates: s.coordinates,
            tickets_url: s.tickets_url,
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}
