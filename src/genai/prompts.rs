//! Prompt text for each generation the site performs.

use crate::forms::{BookingRequest, SongWish};
use crate::sessions::Session;

pub const PR_PORTRAIT_PROMPT: &str = "A high-end portrait of Ann & McBryan in a cozy European studio. Warm cinematic lighting, editorial photography.";

/// Short, poetic stop request written on behalf of a host.
pub fn build_booking_letter_prompt(request: &BookingRequest, date_phrase: &str) -> String {
    format!(
        "Draft a very brief (25 words), poetic stop request for a {} in {}, {} from {}.\n\
         Timing preference: {}.\n\
         Venue: {}.\n\
         Personal note: \"{}\".\n\
         Target: Ann & McBryan.\n\
         Return ONLY the body text.",
        request.event_type.as_str(),
        request.location.trim(),
        request.country.trim(),
        request.name.trim(),
        date_phrase,
        request.address.trim(),
        request.message.trim(),
    )
}

pub fn build_song_wish_prompt(wish: &SongWish) -> String {
    format!(
        "Rewrite this song request description into a short, poetic 25-word paragraph for an acoustic duo.\n\
         Song: {} by {}.\n\
         Original reason: \"{}\".\n\
         Target: Ann & McBryan.\n\
         Return ONLY the poetic body text.",
        wish.song_name.trim(),
        wish.artist_name.trim(),
        wish.description.trim(),
    )
}

pub fn build_venue_atmosphere_prompt(session: &Session) -> String {
    format!(
        "Ann & McBryan are performing at {} in {}, {}. Describe the atmosphere of this specific venue or area for a nomadic acoustic concert in 45 words. Be poetic.",
        session.venue, session.city, session.country
    )
}
