use std::future::Future;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use crate::app::{PostwatchError, Result};
use crate::domain::PostFields;
use crate::normalizer::TimeFragment;
use crate::scraper::config::ScraperConfig;
use crate::scraper::scripts::{node_selector, FeedScripts};
use crate::scraper::{FeedNode, FeedSession, LinkProbe};

const BASE_ARGS: &[&str] = &[
    "--disable-popup-blocking",
    "--disable-extensions",
    "--disable-infobars",
];

const CONTAINER_ARGS: &[&str] = &[
    "--no-sandbox",
    "--disable-gpu",
    "--disable-dev-shm-usage",
    "--disable-software-rasterizer",
];

fn browser_err(context: &str, e: impl std::fmt::Display) -> PostwatchError {
    PostwatchError::Browser(format!("{}: {}", context, e))
}

/// Hand back `resource` when its setup succeeded, otherwise close it and
/// return the setup error
async fn close_on_error<T, C, Fut>(resource: T, setup: Result<()>, close: C) -> Result<T>
where
    C: FnOnce(T) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    match setup {
        Ok(()) => Ok(resource),
        Err(e) => {
            if let Err(close_err) = close(resource).await {
                warn!("Failed to close page after error: {}", close_err);
            }
            Err(e)
        }
    }
}

/// Single Chrome session driving the feed tab plus at most one detail tab
pub struct ChromeSession {
    browser: Browser,
    main: Page,
    config: ScraperConfig,
    scripts: FeedScripts,
    handler: JoinHandle<()>,
}

impl ChromeSession {
    /// Launch Chrome and open the main tab
    pub async fn launch(config: ScraperConfig) -> Result<Self> {
        let mut builder = BrowserConfig::builder().request_timeout(config.timeout());

        for arg in BASE_ARGS {
            builder = builder.arg(*arg);
        }

        if config.container {
            info!("Running in container mode");
            for arg in CONTAINER_ARGS {
                builder = builder.arg(*arg);
            }
        }

        if !config.runs_headless() {
            builder = builder.with_head();
        }

        if let Some(ref dir) = config.user_data_dir {
            builder = builder.user_data_dir(dir);
        }

        let browser_config = builder
            .build()
            .map_err(|e| browser_err("Failed to build browser config", e))?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            browser_err(
                "Failed to launch browser (is Chrome or Chromium installed and in PATH?)",
                e,
            )
        })?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler error: {}", e);
                }
            }
        });

        let main = browser
            .new_page("about:blank")
            .await
            .map_err(|e| browser_err("Failed to create page", e))?;

        if let Some(ref ua) = config.user_agent {
            main.set_user_agent(ua)
                .await
                .map_err(|e| browser_err("Failed to set user agent", e))?;
        }

        info!("Browser session started");

        let scripts = FeedScripts::new(config.selectors.clone());
        Ok(Self {
            browser,
            main,
            config,
            scripts,
            handler,
        })
    }

    /// Close the browser and stop its event handler
    pub async fn shutdown(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser: {}", e);
        }
        let _ = self.browser.wait().await;
        self.handler.abort();
    }

    pub(crate) fn main_page(&self) -> &Page {
        &self.main
    }

    /// Navigate `page` and give dynamic content time to render
    pub(crate) async fn navigate(&self, page: &Page, url: &str) -> Result<()> {
        page.goto(url)
            .await
            .map_err(|e| browser_err("Navigation failed", e))?;
        page.wait_for_navigation()
            .await
            .map_err(|e| browser_err("Navigation failed", e))?;

        tokio::time::sleep(self.config.wait_after_load()).await;
        Ok(())
    }

    pub(crate) async fn evaluate<T: DeserializeOwned>(&self, page: &Page, script: String) -> Result<T> {
        page.evaluate(script)
            .await
            .map_err(|e| browser_err("Script execution failed", e))?
            .into_value()
            .map_err(|e| browser_err("Failed to parse result", e))
    }

    /// Apply the user agent to a freshly opened tab and let it render
    async fn prepare_detail(&self, page: &Page) -> Result<()> {
        if let Some(ref ua) = self.config.user_agent {
            page.set_user_agent(ua)
                .await
                .map_err(|e| browser_err("Failed to set user agent", e))?;
        }

        page.wait_for_navigation()
            .await
            .map_err(|e| browser_err("Navigation failed", e))?;
        tokio::time::sleep(self.config.wait_after_load()).await;
        Ok(())
    }

    /// Resolve the link under `scope`, hovering its inert form if that is all there is
    async fn probe_link(&self, page: &Page, scope: &str) -> Result<LinkProbe> {
        let selectors = &self.config.selectors;

        let active = format!("{} {}", scope, selectors.active_link);
        if let Ok(link) = page.find_element(active).await {
            let href = link
                .attribute("href")
                .await
                .map_err(|e| browser_err("Failed to read link target", e))?;
            if let Some(href) = href.filter(|h| !h.is_empty() && h != "#") {
                return Ok(LinkProbe::Live(href));
            }
        }

        let inactive = format!("{} {}", scope, selectors.inactive_link);
        match page.find_element(inactive).await {
            Ok(link) => {
                link.hover()
                    .await
                    .map_err(|e| browser_err("Failed to hover link", e))?;
                debug!(scope, "Inactive link still present");
            }
            Err(_) => debug!(scope, "Neither inactive nor active link present yet"),
        }

        Ok(LinkProbe::Pending)
    }
}

#[async_trait]
impl FeedSession for ChromeSession {
    type Detail = Page;

    async fn load_feed(&self, url: &Url) -> Result<()> {
        info!(url = %url, "Loading feed");
        self.navigate(&self.main, url.as_str()).await
    }

    async fn feed_child_count(&self) -> Result<usize> {
        self.evaluate(&self.main, self.scripts.child_count()).await
    }

    async fn feed_children(&self) -> Result<Vec<FeedNode>> {
        self.evaluate(&self.main, self.scripts.tag_children()).await
    }

    async fn read_post(&self, node: &FeedNode) -> Result<PostFields> {
        let fields: Option<PostFields> = self
            .evaluate(&self.main, self.scripts.read_post(node.key))
            .await?;

        fields.ok_or_else(|| {
            PostwatchError::Browser(format!("Feed entry {} disappeared", node.key))
        })
    }

    async fn probe_post_link(&self, node: &FeedNode) -> Result<LinkProbe> {
        self.probe_link(&self.main, &node_selector(node.key)).await
    }

    async fn open_detail(&self, href: &str) -> Result<Page> {
        info!(href, "Opening post page");

        let page = self
            .browser
            .new_page(href)
            .await
            .map_err(|e| browser_err("Failed to create page", e))?;

        let prepared = self.prepare_detail(&page).await;
        close_on_error(page, prepared, |page| async move {
            page.close()
                .await
                .map_err(|e| browser_err("Failed to close page", e))
        })
        .await
    }

    async fn probe_time_link(&self, detail: &Page) -> Result<LinkProbe> {
        self.probe_link(detail, &self.config.selectors.detail_post)
            .await
    }

    async fn time_fragments(&self, detail: &Page) -> Result<Vec<TimeFragment>> {
        self.evaluate(detail, self.scripts.time_fragments()).await
    }

    async fn close_detail(&self, detail: Page) -> Result<()> {
        debug!("Closing post page");
        detail
            .close()
            .await
            .map_err(|e| browser_err("Failed to close page", e))?;

        debug!("Switching back to main page");
        self.main
            .bring_to_front()
            .await
            .map_err(|e| browser_err("Failed to focus main page", e))?;
        Ok(())
    }
}
