//! Site configuration.
//!
//! Read from a TOML file (default `<config dir>/logbook/config.toml`). Every
//! field has a shipped default, so a missing file or a partial one is fine.
//! `LOGBOOK_ADMIN_CODE` and `GEMINI_API_KEY` (or `API_KEY`) override the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;

use crate::defaults::{self, StorageKeys};
use crate::error::{LogbookError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub admin_code: String,
    /// Version tag for the shipped session list.
    pub data_version: String,
    pub contact_email: String,
    pub booking_endpoint: String,
    pub song_wish_endpoint: String,
    pub storage_keys: StorageKeys,
    pub availability: AvailabilityWindow,
    pub genai: GenAiConfig,
}

/// The month hosts can pick booking days from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenAiConfig {
    pub api_base: String,
    pub text_model: String,
    pub image_model: String,
    pub place_model: String,
    pub max_output_tokens: u32,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            admin_code: defaults::ADMIN_CODE.to_string(),
            data_version: defaults::DATA_VERSION.to_string(),
            contact_email: defaults::CONTACT_EMAIL.to_string(),
            booking_endpoint: "https://formspree.io/f/xgovjbjk".to_string(),
            song_wish_endpoint: "https://formspree.io/f/mjgkneoy".to_string(),
            storage_keys: StorageKeys::default(),
            availability: AvailabilityWindow::default(),
            genai: GenAiConfig::default(),
        }
    }
}

impl Default for AvailabilityWindow {
    fn default() -> Self {
        Self {
            year: 2026,
            month: 7,
        }
    }
}

impl Default for GenAiConfig {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            text_model: "gemini-3-flash-preview".to_string(),
            image_model: "gemini-2.5-flash-image".to_string(),
            place_model: "gemini-2.5-flash".to_string(),
            max_output_tokens: 80,
            api_key: None,
        }
    }
}

impl SiteConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("logbook").join("config.toml"))
    }

    /// Load from the default path, or pure defaults if there is no config dir.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => {
                warn!("No config directory on this platform, using defaults");
                let mut config = Self::default();
                config.apply_overrides(|k| std::env::var(k).ok());
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Load from `path`, apply environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(raw) => Self::from_toml(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No config at {:?}, using defaults", path);
                Self::default()
            }
            Err(e) => {
                return Err(LogbookError::Config(format!(
                    "Failed to read {:?}: {}",
                    path, e
                )))
            }
        };

        config.apply_overrides(|k| std::env::var(k).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| LogbookError::Config(format!("Invalid config: {}", e)))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| LogbookError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Apply overrides from an environment-like lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(code) = lookup("LOGBOOK_ADMIN_CODE").filter(|c| !c.is_empty()) {
            self.admin_code = code;
        }
        if let Some(key) = lookup("GEMINI_API_KEY")
            .or_else(|| lookup("API_KEY"))
            .filter(|k| !k.is_empty())
        {
            self.genai.api_key = Some(key);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.admin_code.trim().is_empty() {
            return Err(LogbookError::Config("admin_code must not be empty".to_string()));
        }
        if self.data_version.trim().is_empty() {
            return Err(LogbookError::Config("data_version must not be empty".to_string()));
        }
        if !(1..=12).contains(&self.availability.month) {
            return Err(LogbookError::Config(format!(
                "availability.month must be 1-12, got {}",
                self.availability.month
            )));
        }
        for (name, endpoint) in [
            ("booking_endpoint", &self.booking_endpoint),
            ("song_wish_endpoint", &self.song_wish_endpoint),
            ("genai.api_base", &self.genai.api_base),
        ] {
            Url::parse(endpoint)
                .map_err(|e| LogbookError::Config(format!("{} is not a URL: {}", name, e)))?;
        }
        Ok(())
    }
}
