//! Shipped content. Bump [`DATA_VERSION`] whenever [`tour_data`] changes so
//! that stale locally edited schedules are replaced on next load.

use serde::{Deserialize, Serialize};

use crate::sessions::{Coordinates, Session, SessionStatus};

pub const DATA_VERSION: &str = "v1.2_bonnerup_official_photos";

pub const ADMIN_CODE: &str = "acoustic2026";

pub const DEFAULT_HEADLINE: &str = "From the echoes of \n A Song A Day, \n the map begins to sing.";

pub const CONTACT_EMAIL: &str = "annmcbryan@gmail.com";

pub fn pr_images() -> Vec<String> {
    vec![
        "https://lh3.googleusercontent.com/d/1qKjfjRaT30H2DHq9Jr5vk0s_jZRdj4n6".to_string(),
        "https://lh3.googleusercontent.com/d/1sgAVbXWHbLXav_svAsE_SWE2nrIhwwc2".to_string(),
    ]
}

/// The first chronological future date is promoted to "Featured".
pub fn tour_data() -> Vec<Session> {
    vec![Session {
        id: "session-2026-bonnerup".to_string(),
        city: "Bønnerup".to_string(),
        country: "Denmark".to_string(),
        venue: "Café Den Sidste Original".to_string(),
        address: Some("Ny Havnevej 25, 8585 Glesborg".to_string()),
        date: "July 1, 2026".to_string(),
        time: "12:00".to_string(),
        status: SessionStatus::Upcoming,
        coordinates: Coordinates::new(56.5204, 10.7105),
        tickets_url: Some("https://www.facebook.com/AnnMcBryanDuo".to_string()),
    }]
}

/// Storage keys for each persisted value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    pub sessions: String,
    pub headline: String,
    pub images: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            sessions: "ann_mcbryan_sessions".to_string(),
            headline: "ann_mcbryan_story_title".to_string(),
            images: "ann_mcbryan_pr_v10_official_override".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipped_sessions_validate() {
        for session in tour_data() {
            let draft = crate::sessions::SessionDraft::from(session);
            assert!(draft.validate().is_ok());
        }
    }
}
