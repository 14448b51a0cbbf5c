//! Startup sequence and the gated admin surface.

use chrono::NaiveDateTime;
use tracing::info;

use crate::config::SiteConfig;
use crate::content::ContentOverrides;
use crate::defaults::{self, DEFAULT_HEADLINE};
use crate::error::Result;
use crate::gate::{AdminGate, GateState, Route};
use crate::genai::prompts::PR_PORTRAIT_PROMPT;
use crate::genai::Generator;
use crate::map::{tour_route, MapPoint};
use crate::sessions::{Schedule, Session, SessionDraft, SessionStore};
use crate::storage::Storage;

/// Everything the public pages read, plus the gate in front of the console.
///
/// `S` is cloned once so the session store and the overrides share a backend;
/// pass a reference or an `Rc`/`Arc` handle.
pub struct Site<S: Storage + Clone> {
    config: SiteConfig,
    store: SessionStore<S>,
    content: ContentOverrides<S>,
    gate: AdminGate,
    headline: String,
    images: Vec<String>,
}

impl<S: Storage + Clone> Site<S> {
    /// Load with the shipped session list as default.
    pub fn open(storage: S, config: SiteConfig) -> Result<Self> {
        Self::open_with_defaults(storage, config, defaults::tour_data())
    }

    pub fn open_with_defaults(storage: S, config: SiteConfig, sessions: Vec<Session>) -> Result<Self> {
        config.validate()?;

        let content = ContentOverrides::new(storage.clone(), config.storage_keys.clone());
        let cell = content.sessions_cell(&config.data_version);
        let store = SessionStore::open(storage, cell, sessions)?;
        let headline = content.load_headline(DEFAULT_HEADLINE);
        let images = content.load_image_overrides(defaults::pr_images());
        let gate = AdminGate::new(config.admin_code.clone());

        info!(
            "Site ready: {} sessions, {} PR images, data version {}",
            store.len(),
            images.len(),
            config.data_version
        );
        Ok(Self {
            config,
            store,
            content,
            gate,
            headline,
            images,
        })
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn sessions(&self) -> &[Session] {
        self.store.list()
    }

    pub fn schedule(&self, now: NaiveDateTime) -> Schedule {
        self.store.classify(now)
    }

    pub fn map_points(&self) -> Vec<MapPoint> {
        tour_route(self.store.list())
    }

    pub fn headline(&self) -> &str {
        &self.headline
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn gate_state(&self) -> GateState {
        self.gate.state()
    }

    pub fn submit_code(&mut self, code: &str) -> Result<()> {
        self.gate.submit(code)
    }

    /// Follow a fragment change such as `#admin`.
    pub fn navigate(&mut self, fragment: &str) -> Route {
        let route = Route::from_fragment(fragment);
        self.gate.navigate(route);
        route
    }

    pub fn lock(&mut self) {
        self.gate.lock();
    }

    /// The mutation surface. Only available while the gate is unlocked.
    pub fn admin(&mut self) -> Result<AdminConsole<'_, S>> {
        self.gate.ensure_unlocked()?;
        Ok(AdminConsole { site: self })
    }
}

pub struct AdminConsole<'a, S: Storage + Clone> {
    site: &'a mut Site<S>,
}

impl<S: Storage + Clone> AdminConsole<'_, S> {
    pub fn sessions(&self) -> &[Session] {
        self.site.store.list()
    }

    pub fn add_session(&mut self, draft: SessionDraft) -> Result<Session> {
        self.site.store.add(draft)
    }

    pub fn update_session(&mut self, id: &str, draft: SessionDraft) -> Result<Option<Session>> {
        self.site.store.update(id, draft)
    }

    pub fn remove_session(&mut self, id: &str) -> Result<bool> {
        self.site.store.remove(id)
    }

    pub fn set_headline(&mut self, text: &str) -> Result<()> {
        self.site.content.save_headline(text)?;
        self.site.headline = text.to_string();
        Ok(())
    }

    pub fn set_images(&mut self, images: Vec<String>) -> Result<()> {
        self.site.content.save_image_overrides(&images)?;
        self.site.images = images;
        Ok(())
    }

    /// Replace the PR images with a freshly generated portrait. Keeps the
    /// current images if generation fails.
    pub async fn regenerate_images<G: Generator + ?Sized>(&mut self, generator: &G) -> Result<&[String]> {
        let current = self.site.images.clone();
        self.site.images = self
            .site
            .content
            .regenerate_images(generator, PR_PORTRAIT_PROMPT, current)
            .await?;
        Ok(&self.site.images)
    }

    pub fn export_json(&self) -> Result<String> {
        self.site.store.export_json()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::error::LogbookError;
    use crate::genai::testing::ScriptedGenerator;
    use crate::genai::Generated;
    use crate::sessions::{Coordinates, SessionStatus};
    use crate::storage::MemoryStorage;

    fn june_first() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 6, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn draft(city: &str, date: &str) -> SessionDraft {
        SessionDraft {
            city: city.to_string(),
            country: "Germany".to_string(),
            venue: "Hinterhof".to_string(),
            date: date.to_string(),
            time: "19:30".to_string(),
            status: SessionStatus::Upcoming,
            coordinates: Coordinates::new(52.52, 13.40),
            ..Default::default()
        }
    }

    #[test]
    fn test_open_uses_shipped_content() {
        let storage = MemoryStorage::new();
        let site = Site::open(&storage, SiteConfig::default()).unwrap();

        assert_eq!(site.headline(), DEFAULT_HEADLINE);
        assert_eq!(site.images(), defaults::pr_images().as_slice());
        let schedule = site.schedule(june_first());
        assert_eq!(
            schedule.featured.map(|s| s.id),
            Some("session-2026-bonnerup".to_string())
        );
        assert_eq!(site.map_points().len(), 1);
    }

    #[test]
    fn test_admin_requires_unlock() {
        let storage = MemoryStorage::new();
        let mut site = Site::open(&storage, SiteConfig::default()).unwrap();

        assert!(matches!(site.admin(), Err(LogbookError::Locked)));

        // The code field only exists in the admin view
        assert!(matches!(
            site.submit_code("acoustic2026"),
            Err(LogbookError::Locked)
        ));

        site.navigate("#admin");
        assert!(matches!(
            site.submit_code("guess"),
            Err(LogbookError::InvalidCredential)
        ));
        assert!(site.admin().is_err());

        site.submit_code("acoustic2026").unwrap();
        site.admin()
            .unwrap()
            .add_session(draft("Berlin", "July 3, 2026"))
            .unwrap();
        assert_eq!(site.sessions().len(), 2);

        assert_eq!(site.navigate(""), Route::Public);
        assert_eq!(site.gate_state(), GateState::Locked);
        assert!(site.admin().is_err());
    }

    #[test]
    fn test_headline_edit_persists_across_reopen() {
        let storage = MemoryStorage::new();
        {
            let mut site = Site::open(&storage, SiteConfig::default()).unwrap();
            site.navigate("#admin");
            site.submit_code("acoustic2026").unwrap();
            site.admin().unwrap().set_headline("A new road").unwrap();
            assert_eq!(site.headline(), "A new road");
        }
        let site = Site::open(&storage, SiteConfig::default()).unwrap();
        assert_eq!(site.headline(), "A new road");
    }

    #[tokio::test]
    async fn test_regenerate_images_through_console() {
        let storage = MemoryStorage::new();
        let mut site = Site::open(&storage, SiteConfig::default()).unwrap();
        site.navigate("#admin");
        site.submit_code("acoustic2026").unwrap();

        let failing = ScriptedGenerator::failing();
        let images = site
            .admin()
            .unwrap()
            .regenerate_images(&failing)
            .await
            .unwrap()
            .to_vec();
        assert_eq!(images, defaults::pr_images());

        let working = ScriptedGenerator::replying(vec![Ok(Generated::Image(
            "data:image/png;base64,AAAA".to_string(),
        ))]);
        site.admin().unwrap().regenerate_images(&working).await.unwrap();
        assert_eq!(site.images(), ["data:image/png;base64,AAAA".to_string()]);
        assert_eq!(working.prompts.borrow()[0].0, PR_PORTRAIT_PROMPT);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let storage = MemoryStorage::new();
        let config = SiteConfig {
            admin_code: " ".to_string(),
            ..SiteConfig::default()
        };
        assert!(matches!(
            Site::open(&storage, config),
            Err(LogbookError::Config(_))
        ));
    }
}
