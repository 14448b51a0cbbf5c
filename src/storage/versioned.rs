//! Version-tagged values.
//!
//! A [`VersionedCell`] stores `{"version": ..., "payload": ...}` under one key.
//! Loading with a different expected version discards the stored payload and
//! writes the shipped default in its place, so a content revision in code
//! invalidates stale local edits.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::Storage;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub version: String,
    pub payload: T,
}

#[derive(Debug, Clone)]
pub struct VersionedCell<T> {
    key: String,
    version: String,
    _payload: PhantomData<fn() -> T>,
}

impl<T> VersionedCell<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(key: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            version: version.into(),
            _payload: PhantomData,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Read the stored envelope regardless of its version.
    /// Unreadable or malformed values come back as `None`.
    pub fn peek<S: Storage + ?Sized>(&self, storage: &S) -> Option<Envelope<T>> {
        match self.read(storage) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("Failed to read '{}': {}, treating as absent", self.key, e);
                None
            }
        }
    }

    /// `Err` only when the backend itself fails. Absent and malformed values
    /// are both `Ok(None)`.
    fn read<S: Storage + ?Sized>(&self, storage: &S) -> Result<Option<Envelope<T>>> {
        let Some(raw) = storage.get(&self.key)? else {
            return Ok(None);
        };

        match serde_json::from_str::<Envelope<T>>(&raw) {
            Ok(envelope) => Ok(Some(envelope)),
            Err(e) => {
                warn!("Malformed value under '{}': {}, treating as absent", self.key, e);
                Ok(None)
            }
        }
    }

    /// Return the stored payload if its version matches. On a version
    /// mismatch, or an absent or malformed value, persist `default` under the
    /// current version and return it. A failed read returns `default` and
    /// leaves the stored value alone.
    pub fn load_or_reset<S: Storage + ?Sized>(&self, storage: &S, default: T) -> Result<T> {
        let stored = match self.read(storage) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(
                    "Failed to read '{}': {}, using defaults without overwriting",
                    self.key, e
                );
                return Ok(default);
            }
        };

        if let Some(envelope) = stored {
            if envelope.version == self.version {
                info!("Loaded '{}' at version {}", self.key, self.version);
                return Ok(envelope.payload);
            }
            info!(
                "Stored '{}' is at version {}, expected {}; resetting to defaults",
                self.key, envelope.version, self.version
            );
        }

        self.store(storage, &default)?;
        Ok(default)
    }

    /// Persist `value` under the current version.
    pub fn store<S: Storage + ?Sized>(&self, storage: &S, value: &T) -> Result<()> {
        let envelope = Envelope {
            version: self.version.clone(),
            payload: value,
        };
        let json = serde_json::to_string(&envelope)?;
        storage.set(&self.key, &json)
    }
}
