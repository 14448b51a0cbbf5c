//! Booking requests and song wishes sent from the public site.

pub mod dispatch;
pub mod mailto;
pub mod submit;
pub mod types;

pub use dispatch::{DispatchOutcome, Dispatcher};
pub use mailto::booking_mailto;
pub use submit::{FormSubmitter, FormspreeClient};
pub use types::{describe_dates, BookingRequest, EventType, SongWish, EUROPEAN_COUNTRIES};
