//! Locally persisted overrides of shipped content.
//!
//! The session list is version-gated through [`VersionedCell`]. The headline
//! and the PR image list are plain overrides and survive content revisions.

use tracing::{info, warn};

use crate::defaults::StorageKeys;
use crate::error::Result;
use crate::fallback::try_with_fallback;
use crate::genai::{generate_image, Generator};
use crate::sessions::Session;
use crate::storage::{Storage, VersionedCell};

pub struct ContentOverrides<S: Storage> {
    storage: S,
    keys: StorageKeys,
}

impl<S: Storage> ContentOverrides<S> {
    pub fn new(storage: S, keys: StorageKeys) -> Self {
        Self { storage, keys }
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    /// Stored headline, or `default_text` if none was saved or it can't be read.
    pub fn load_headline(&self, default_text: &str) -> String {
        match self.storage.get(&self.keys.headline) {
            Ok(Some(text)) => text,
            Ok(None) => default_text.to_string(),
            Err(e) => {
                warn!("Failed to read headline: {}, using default", e);
                default_text.to_string()
            }
        }
    }

    pub fn save_headline(&self, text: &str) -> Result<()> {
        self.storage.set(&self.keys.headline, text)?;
        info!("Saved headline ({} chars)", text.chars().count());
        Ok(())
    }

    /// Cell holding the session list under `version`.
    pub fn sessions_cell(&self, version: &str) -> VersionedCell<Vec<Session>> {
        VersionedCell::new(self.keys.sessions.clone(), version)
    }

    /// Stored sessions if they were saved under `expected_version`, otherwise
    /// `defaults`, which then replace whatever was stored.
    pub fn load_sessions(&self, defaults: Vec<Session>, expected_version: &str) -> Result<Vec<Session>> {
        self.sessions_cell(expected_version)
            .load_or_reset(&self.storage, defaults)
    }

    pub fn load_image_overrides(&self, defaults: Vec<String>) -> Vec<String> {
        let raw = match self.storage.get(&self.keys.images) {
            Ok(Some(raw)) => raw,
            Ok(None) => return defaults,
            Err(e) => {
                warn!("Failed to read image overrides: {}, using defaults", e);
                return defaults;
            }
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(images) => {
                info!("Loaded {} overridden PR images", images.len());
                images
            }
            Err(e) => {
                warn!("Malformed image overrides: {}, using defaults", e);
                defaults
            }
        }
    }

    pub fn save_image_overrides(&self, images: &[String]) -> Result<()> {
        let json = serde_json::to_string(images)?;
        self.storage.set(&self.keys.images, &json)?;
        info!("Saved {} PR image overrides", images.len());
        Ok(())
    }

    /// Ask `generator` for a new portrait. On success the list becomes that
    /// single image and is persisted; on failure `current` is returned as is.
    pub async fn regenerate_images<G: Generator + ?Sized>(
        &self,
        generator: &G,
        prompt: &str,
        current: Vec<String>,
    ) -> Result<Vec<String>> {
        let generated = try_with_fallback(
            "PR image generation",
            async { generate_image(generator, prompt).await.map(Some) },
            None,
        )
        .await;

        match generated {
            Some(image) => {
                let images = vec![image];
                self.save_image_overrides(&images)?;
                Ok(images)
            }
            None => Ok(current),
        }
    }
}
