use chrono::{Local, NaiveDate, NaiveDateTime};
use rand::Rng;
use serde::Serialize;
use tracing::{info, warn};

use super::date::SessionDate;
use super::types::{Session, SessionDraft};
use crate::error::{LogbookError, Result};
use crate::storage::{Storage, VersionedCell};

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 9;

/// Chronological split of the collection for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schedule {
    /// Nearest upcoming session.
    pub featured: Option<Session>,
    pub other_upcoming: Vec<Session>,
    pub past: Vec<Session>,
    /// Stored records whose date no longer parses. Shown in neither list.
    pub unscheduled: Vec<Session>,
}

impl Schedule {
    /// Featured followed by the other upcoming sessions.
    pub fn upcoming(&self) -> impl Iterator<Item = &Session> {
        self.featured.iter().chain(self.other_upcoming.iter())
    }
}

/// Tour sessions, kept sorted and persisted as a whole on every mutation.
pub struct SessionStore<S: Storage> {
    storage: S,
    cell: VersionedCell<Vec<Session>>,
    sessions: Vec<Session>,
}

impl<S: Storage> SessionStore<S> {
    /// Wrap an already-loaded collection. Mutations are written through `cell`.
    pub fn new(storage: S, cell: VersionedCell<Vec<Session>>, mut sessions: Vec<Session>) -> Self {
        sort_sessions(&mut sessions);
        Self {
            storage,
            cell,
            sessions,
        }
    }

    /// Load through `cell`, falling back to (and persisting) `defaults` on a
    /// version mismatch.
    pub fn open(storage: S, cell: VersionedCell<Vec<Session>>, defaults: Vec<Session>) -> Result<Self> {
        let sessions = cell.load_or_reset(&storage, defaults)?;
        info!("Loaded {} tour sessions", sessions.len());
        Ok(Self::new(storage, cell, sessions))
    }

    pub fn list(&self) -> &[Session] {
        &self.sessions
    }

    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn add(&mut self, mut draft: SessionDraft) -> Result<Session> {
        draft.validate()?;

        // Keep a caller-supplied id unless it is already taken
        let id = match draft.id.take().map(|id| id.trim().to_string()) {
            Some(id) if !id.is_empty() => {
                if self.get(&id).is_some() {
                    return Err(LogbookError::DuplicateId(id));
                }
                id
            }
            _ => self.fresh_id(),
        };

        let session = draft.into_session(id);
        let mut next = self.sessions.clone();
        next.push(session.clone());
        self.commit(next)?;

        info!(
            "Added session {} ({}, {}) on {}",
            session.id, session.city, session.country, session.date
        );
        Ok(session)
    }

    /// Replace the record with `id`. Returns `None` when no such record exists.
    pub fn update(&mut self, id: &str, draft: SessionDraft) -> Result<Option<Session>> {
        draft.validate()?;

        let Some(index) = self.sessions.iter().position(|s| s.id == id) else {
            info!("Update skipped, no session with id {}", id);
            return Ok(None);
        };

        // Replace in place; commit re-sorts
        let session = draft.into_session(id.to_string());
        let mut next = self.sessions.clone();
        next[index] = session.clone();
        self.commit(next)?;

        info!("Updated session {}", id);
        Ok(Some(session))
    }

    /// Remove the record with `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> Result<bool> {
        // Everything except the target
        let next: Vec<Session> = self.sessions.iter().filter(|s| s.id != id).cloned().collect();
        if next.len() == self.sessions.len() {
            info!("Remove skipped, no session with id {}", id);
            return Ok(false);
        }

        self.commit(next)?;
        info!("Removed session {}", id);
        Ok(true)
    }

    /// Partition against the calendar day of `now`. Time of day is ignored.
    pub fn classify(&self, now: NaiveDateTime) -> Schedule {
        classify_sessions(&self.sessions, now.date())
    }

    /// [`classify`](Self::classify) against the local clock.
    pub fn classify_now(&self) -> Schedule {
        self.classify(Local::now().naive_local())
    }

    /// Pretty JSON of the collection, for pasting into the shipped defaults.
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.sessions)?)
    }

    /// Sort and persist `next`, then make it current. A failed write leaves
    /// the collection as it was.
    fn commit(&mut self, mut next: Vec<Session>) -> Result<()> {
        sort_sessions(&mut next);

        // Write first; memory only follows a successful write
        self.cell.store(&self.storage, &next).map_err(|e| {
            warn!("Failed to persist sessions: {}", e);
            e
        })?;
        self.sessions = next;
        Ok(())
    }

    fn fresh_id(&self) -> String {
        let mut rng = rand::rng();
        // Retry on the rare collision with an existing id
        loop {
            let id: String = (0..ID_LEN)
                .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
                .collect();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Announced,
    On(NaiveDate),
    Unparseable,
}

fn sort_key(session: &Session) -> SortKey {
    match session.parsed_date() {
        Ok(SessionDate::Announced) => SortKey::Announced,
        Ok(SessionDate::On(d)) => SortKey::On(d),
        Err(_) => SortKey::Unparseable,
    }
}

/// Announced sessions first in their existing order, then ascending by date.
/// Stable, so equal dates keep insertion order.
fn sort_sessions(sessions: &mut [Session]) {
    sessions.sort_by_key(sort_key);
}

pub(crate) fn classify_sessions(sessions: &[Session], today: NaiveDate) -> Schedule {
    let mut upcoming = Vec::new();
    let mut schedule = Schedule::default();

    for session in sessions {
        match session.parsed_date() {
            Ok(SessionDate::Announced) => upcoming.push(session.clone()),
            Ok(SessionDate::On(d)) if d >= today => upcoming.push(session.clone()),
            Ok(SessionDate::On(_)) => schedule.past.push(session.clone()),
            Err(e) => {
                warn!("Session {} left unscheduled: {}", session.id, e);
                schedule.unscheduled.push(session.clone());
            }
        }
    }

    // Collection order is date order, so the first upcoming is the nearest
    let mut upcoming = upcoming.into_iter();
    schedule.featured = upcoming.next();
    schedule.other_upcoming = upcoming.collect();
    schedule
}
