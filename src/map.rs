//! Data the host needs to draw the tour map: markers, the route line and
//! what to show when a marker is clicked.

use serde::Serialize;

use crate::fallback::try_with_fallback;
use crate::genai::prompts::build_venue_atmosphere_prompt;
use crate::genai::{generate_place_text, Generator};
use crate::sessions::{Coordinates, Session};

/// Initial view over central Europe.
pub const DEFAULT_CENTER: Coordinates = Coordinates {
    lat: 50.0,
    lng: 10.0,
};
pub const DEFAULT_ZOOM: u8 = 4;
/// Zoom level used when flying to a clicked stop.
pub const FOCUS_ZOOM: u8 = 7;

pub const QUIET_MAP_TEXT: &str =
    "The map is quiet today, but the resonance of the strings remains.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapPoint {
    pub session_id: String,
    pub label: String,
    pub coordinates: Coordinates,
}

impl From<&Session> for MapPoint {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.id.clone(),
            label: format!("{}, {}", session.city, session.country),
            coordinates: session.coordinates,
        }
    }
}

/// Markers in collection order. Consecutive points form the route polyline.
pub fn tour_route(sessions: &[Session]) -> Vec<MapPoint> {
    sessions.iter().map(MapPoint::from).collect()
}

/// A marker click resolved back to its session.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerClick<'a> {
    pub session: &'a Session,
    pub center: Coordinates,
    pub zoom: u8,
}

impl<'a> MarkerClick<'a> {
    /// `None` if the point's session has since been removed.
    pub fn resolve(sessions: &'a [Session], point: &MapPoint) -> Option<Self> {
        sessions
            .iter()
            .find(|s| s.id == point.session_id)
            .map(|session| Self {
                session,
                center: session.coordinates,
                zoom: FOCUS_ZOOM,
            })
    }
}

/// Short atmosphere text for a stop, grounded on its location.
pub async fn describe_venue<G: Generator + ?Sized>(generator: &G, session: &Session) -> String {
    let prompt = build_venue_atmosphere_prompt(session);
    try_with_fallback(
        "Venue atmosphere",
        generate_place_text(generator, &prompt, session.coordinates),
        QUIET_MAP_TEXT.to_string(),
    )
    .await
}
