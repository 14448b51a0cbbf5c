pub mod config;
pub mod content;
pub mod defaults;
pub mod error;
pub mod fallback;
pub mod forms;
pub mod gate;
pub mod genai;
pub mod map;
pub mod sessions;
pub mod site;
pub mod storage;

pub use config::SiteConfig;
pub use error::{LogbookError, Result};
pub use gate::{AdminGate, GateState, Route};
pub use sessions::{Schedule, Session, SessionDraft, SessionStatus, SessionStore};
pub use site::{AdminConsole, Site};
pub use storage::{JsonFileStorage, MemoryStorage, SqliteStorage, Storage};

/// Install the fmt subscriber, filtered by `RUST_LOG` (default `info`).
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}
