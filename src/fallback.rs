use std::fmt::Display;
use std::future::Future;

use tracing::warn;

/// Await `primary`; on error log it under `label` and return `fallback`.
///
/// Used by every outbound call whose failure must not block the user action.
pub async fn try_with_fallback<T, E, F>(label: &str, primary: F, fallback: T) -> T
where
    E: Display,
    F: Future<Output = Result<T, E>>,
{
    match primary.await {
        Ok(value) => value,
        Err(e) => {
            warn!("{} failed, using fallback: {}", label, e);
            fallback
        }
    }
}
