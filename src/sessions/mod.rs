//! Tour sessions: the record model, date handling and the persisted store.

pub mod date;
pub mod store;
pub mod types;

pub use date::{format_session_date, parse_session_date, SessionDate, ANNOUNCED_SENTINEL};
pub use store::{Schedule, SessionStore};
pub use types::{Coordinates, Session, SessionDraft, SessionStatus};
