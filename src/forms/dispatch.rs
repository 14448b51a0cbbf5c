//! Public request flows: booking a stop and wishing for a song.
//!
//! Both flows polish the visitor's text with the generator and submit the
//! result. Neither surfaces a network failure to the visitor: a failed booking
//! falls back to a pre-filled mail composition, a failed song wish is
//! reported as sent.

use std::cell::Cell;

use serde::Serialize;
use tracing::info;

use super::mailto::booking_mailto;
use super::submit::FormSubmitter;
use super::types::{describe_dates, BookingRequest, SongWish};
use crate::config::{AvailabilityWindow, SiteConfig};
use crate::error::{LogbookError, Result};
use crate::fallback::try_with_fallback;
use crate::genai::prompts::{build_booking_letter_prompt, build_song_wish_prompt};
use crate::genai::{generate_text, Generator};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent,
    /// Submission failed; the host should open this `mailto:` URL.
    MailtoFallback(String),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BookingPayload<'a> {
    name: &'a str,
    email: &'a str,
    country: &'a str,
    city: &'a str,
    address: &'a str,
    event_type: &'a str,
    original_message: &'a str,
    ai_polished_letter: &'a str,
    selected_dates: &'a str,
    #[serde(rename = "_subject")]
    subject: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SongWishPayload<'a> {
    name: &'a str,
    song: &'a str,
    artist: &'a str,
    link: &'a str,
    reason: &'a str,
    polished_reason: &'a str,
    #[serde(rename = "_subject")]
    subject: &'a str,
}

pub struct Dispatcher<G, F> {
    generator: G,
    submitter: F,
    booking_endpoint: String,
    song_wish_endpoint: String,
    contact_email: String,
    window: AvailabilityWindow,
    busy: Cell<bool>,
}

/// Holds the busy flag for the duration of one dispatch.
struct BusyGuard<'a>(&'a Cell<bool>);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a Cell<bool>) -> Result<Self> {
        if flag.replace(true) {
            return Err(LogbookError::Busy);
        }
        Ok(Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl<G: Generator, F: FormSubmitter> Dispatcher<G, F> {
    pub fn new(generator: G, submitter: F, config: &SiteConfig) -> Self {
        Self {
            generator,
            submitter,
            booking_endpoint: config.booking_endpoint.clone(),
            song_wish_endpoint: config.song_wish_endpoint.clone(),
            contact_email: config.contact_email.clone(),
            window: config.availability,
            busy: Cell::new(false),
        }
    }

    /// True while a dispatch is outstanding; hosts disable re-submission.
    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    pub fn availability(&self) -> AvailabilityWindow {
        self.window
    }

    pub async fn dispatch_booking(&self, request: &BookingRequest) -> Result<DispatchOutcome> {
        request.validate()?;
        let _guard = BusyGuard::acquire(&self.busy)?;

        let date_phrase = describe_dates(&request.selected_days, self.window);
        let prompt = build_booking_letter_prompt(request, &date_phrase);
        let letter = try_with_fallback(
            "Booking letter polish",
            generate_text(&self.generator, &prompt),
            request.message.clone(),
        )
        .await;

        let subject = format!(
            "Songs Across Europe {} request: {}, {} ({})",
            self.window.year,
            request.location.trim(),
            request.country.trim(),
            request.name.trim()
        );
        let payload = serde_json::to_value(BookingPayload {
            name: &request.name,
            email: &request.email,
            country: &request.country,
            city: &request.location,
            address: &request.address,
            event_type: request.event_type.as_str(),
            original_message: &request.message,
            ai_polished_letter: &letter,
            selected_dates: &date_phrase,
            subject: &subject,
        })?;

        let mailto = booking_mailto(
            &self.contact_email,
            &format!("Songs Across Europe {} request", self.window.year),
            request,
        );
        let outcome = try_with_fallback(
            "Booking submission",
            async {
                self.submitter
                    .submit(&self.booking_endpoint, &payload)
                    .await
                    .map(|_| DispatchOutcome::Sent)
            },
            DispatchOutcome::MailtoFallback(mailto),
        )
        .await;

        info!(
            "Booking request from {} for {} handled: {:?}",
            request.name, request.location, outcome
        );
        Ok(outcome)
    }

    pub async fn dispatch_song_wish(&self, wish: &SongWish) -> Result<DispatchOutcome> {
        wish.validate()?;
        let _guard = BusyGuard::acquire(&self.busy)?;

        let prompt = build_song_wish_prompt(wish);
        let story = try_with_fallback(
            "Song wish polish",
            generate_text(&self.generator, &prompt),
            wish.description.clone(),
        )
        .await;

        let subject = format!(
            "Song Wish: {} ({})",
            wish.song_name.trim(),
            wish.requester_name.trim()
        );
        let payload = serde_json::to_value(SongWishPayload {
            name: &wish.requester_name,
            song: &wish.song_name,
            artist: &wish.artist_name,
            link: &wish.version_link,
            reason: &wish.description,
            polished_reason: &story,
            subject: &subject,
        })?;

        let outcome = try_with_fallback(
            "Song wish submission",
            async {
                self.submitter
                    .submit(&self.song_wish_endpoint, &payload)
                    .await
                    .map(|_| DispatchOutcome::Sent)
            },
            DispatchOutcome::Sent,
        )
        .await;

        info!("Song wish '{}' from {} handled", wish.song_name, wish.requester_name);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::future::Future;

    use super::*;
    use crate::genai::testing::ScriptedGenerator;
    use crate::genai::Generated;

    #[derive(Default)]
    struct RecordingSubmitter {
        fail: bool,
        sent: RefCell<Vec<(String, serde_json::Value)>>,
    }

    impl FormSubmitter for RecordingSubmitter {
        fn submit(
            &self,
            endpoint: &str,
            payload: &serde_json::Value,
        ) -> impl Future<Output = Result<()>> {
            self.sent
                .borrow_mut()
                .push((endpoint.to_string(), payload.clone()));
            let result = if self.fail {
                Err(LogbookError::Submission("503".to_string()))
            } else {
                Ok(())
            };
            async move { result }
        }
    }

    fn booking() -> BookingRequest {
        let mut req = BookingRequest {
            name: "Mette".to_string(),
            email: "mette@example.dk".to_string(),
            country: "Denmark".to_string(),
            location: "Aarhus".to_string(),
            address: "Havnegade 4".to_string(),
            message: "Our courtyard holds forty people.".to_string(),
            ..Default::default()
        };
        req.selected_days.insert(4);
        req
    }

    fn wish() -> SongWish {
        SongWish {
            song_name: "Vincent".to_string(),
            artist_name: "Don McLean".to_string(),
            version_link: String::new(),
            description: "Played at our wedding.".to_string(),
            requester_name: "Jonas".to_string(),
        }
    }

    #[tokio::test]
    async fn test_booking_sent_with_polished_letter() {
        let gen = ScriptedGenerator::replying(vec![Ok(Generated::Text(
            "A courtyard waits for your songs.".to_string(),
        ))]);
        let submitter = RecordingSubmitter::default();
        let dispatcher = Dispatcher::new(&gen, &submitter, &SiteConfig::default());

        let outcome = dispatcher.dispatch_booking(&booking()).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::Sent);
        assert!(!dispatcher.is_busy());

        let sent = submitter.sent.borrow();
        assert_eq!(sent.len(), 1);
        let (endpoint, payload) = &sent[0];
        assert_eq!(endpoint, "https://formspree.io/f/xgovjbjk");
        assert_eq!(payload["aiPolishedLetter"], "A courtyard waits for your songs.");
        assert_eq!(payload["originalMessage"], "Our courtyard holds forty people.");
        assert_eq!(payload["city"], "Aarhus");
        assert_eq!(payload["eventType"], "House Concert");
        assert_eq!(payload["selectedDates"], "Proposed dates in July 2026: July 4");
        assert_eq!(
            payload["_subject"],
            "Songs Across Europe 2026 request: Aarhus, Denmark (Mette)"
        );
    }

    #[tokio::test]
    async fn test_booking_ai_failure_keeps_original_message() {
        let gen = ScriptedGenerator::failing();
        let submitter = RecordingSubmitter::default();
        let dispatcher = Dispatcher::new(&gen, &submitter, &SiteConfig::default());

        let outcome = dispatcher.dispatch_booking(&booking()).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::Sent);
        let sent = submitter.sent.borrow();
        assert_eq!(
            sent[0].1["aiPolishedLetter"],
            "Our courtyard holds forty people."
        );
    }

    #[tokio::test]
    async fn test_booking_submission_failure_falls_back_to_mailto() {
        let gen = ScriptedGenerator::failing();
        let submitter = RecordingSubmitter {
            fail: true,
            ..Default::default()
        };
        let dispatcher = Dispatcher::new(&gen, &submitter, &SiteConfig::default());

        match dispatcher.dispatch_booking(&booking()).await.unwrap() {
            DispatchOutcome::MailtoFallback(url) => {
                assert!(url.starts_with("mailto:annmcbryan@gmail.com?subject="));
                assert!(url.contains("Aarhus"));
            }
            other => panic!("expected mailto fallback, got {:?}", other),
        }
        assert!(!dispatcher.is_busy());
    }

    #[tokio::test]
    async fn test_song_wish_failure_still_sent() {
        let gen = ScriptedGenerator::failing();
        let submitter = RecordingSubmitter {
            fail: true,
            ..Default::default()
        };
        let dispatcher = Dispatcher::new(&gen, &submitter, &SiteConfig::default());

        let outcome = dispatcher.dispatch_song_wish(&wish()).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::Sent);

        let sent = submitter.sent.borrow();
        assert_eq!(sent[0].0, "https://formspree.io/f/mjgkneoy");
        assert_eq!(sent[0].1["polishedReason"], "Played at our wedding.");
        assert_eq!(sent[0].1["_subject"], "Song Wish: Vincent (Jonas)");
    }

    #[tokio::test]
    async fn test_invalid_request_not_submitted() {
        let gen = ScriptedGenerator::failing();
        let submitter = RecordingSubmitter::default();
        let dispatcher = Dispatcher::new(&gen, &submitter, &SiteConfig::default());

        let mut req = booking();
        req.email = String::new();
        assert!(matches!(
            dispatcher.dispatch_booking(&req).await,
            Err(LogbookError::MissingField("email"))
        ));
        assert!(submitter.sent.borrow().is_empty());
        assert!(gen.prompts.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_busy_rejects_second_dispatch() {
        let gen = ScriptedGenerator::failing();
        let submitter = RecordingSubmitter::default();
        let dispatcher = Dispatcher::new(&gen, &submitter, &SiteConfig::default());

        let _held = BusyGuard::acquire(&dispatcher.busy).unwrap();
        assert!(dispatcher.is_busy());
        assert!(matches!(
            dispatcher.dispatch_song_wish(&wish()).await,
            Err(LogbookError::Busy)
        ));
    }
}
