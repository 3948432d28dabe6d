use std::path::Path;

use tracing::{info, warn};

use crate::app::error::{PostwatchError, Result};
use crate::config::Config;
use crate::cycle::ScrapeCycle;
use crate::delivery::HttpDelivery;
use crate::normalizer::TimeNormalizer;
use crate::scraper::{feed_url, ChromeSession};
use crate::store::MemoryDedupStore;

/// A scrape cycle over a live browser session
pub type LiveCycle = ScrapeCycle<ChromeSession, HttpDelivery, MemoryDedupStore>;

pub struct AppContext {
    pub config: Config,
}

impl AppContext {
    /// Load the config file (or the default one) and apply environment overrides
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Config::load_from(path),
            None => Config::load(),
        }
        .map_err(|e| PostwatchError::Config(e.to_string()))?;

        config
            .apply_process_env()
            .map_err(|e| PostwatchError::Config(e.to_string()))?;

        Ok(Self::from_config(config))
    }

    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Override the watched page
    pub fn with_page(mut self, page: Option<String>) -> Self {
        if page.is_some() {
            self.config.feed.page_url = page;
        }
        self
    }

    pub fn normalizer(&self) -> TimeNormalizer {
        TimeNormalizer::new(self.config.scraper.time_marker.clone())
    }

    /// Launch the browser, log in and assemble a cycle over the configured page
    pub async fn start_cycle(&self) -> Result<LiveCycle> {
        self.config
            .validate()
            .map_err(|e| PostwatchError::Config(e.to_string()))?;

        let page = self.config.feed.page_url.as_deref().unwrap_or_default();
        let url = feed_url(page)?;
        let delivery = HttpDelivery::new(&self.config.delivery)?;
        info!(page = %url, endpoint = %delivery.endpoint(), "Starting session");

        let session = ChromeSession::launch(self.config.scraper.clone()).await?;
        if let Err(e) = session.login(&self.config.login).await {
            warn!("Login failed, closing browser");
            session.shutdown().await;
            return Err(e);
        }

        Ok(ScrapeCycle::new(
            session,
            delivery,
            MemoryDedupStore::new(),
            self.normalizer(),
            url,
            self.config.cycle.clone(),
        ))
    }
}
