//! Browser-side collaborators of the scrape cycle.
//!
//! # Architecture
//!
//! ```text
//! FeedSession (chrome) → classifier → cycle → delivery
//!                      ↘ time fragments → normalizer
//! ```
//!
//! [`FeedSession`] is the seam between the cycle and the browser: everything
//! that touches the DOM goes through it, so the cycle can be driven by an
//! in-memory fake in tests.
//!
//! # Usage
//!
//! ```rust,ignore
//! use postwatch::scraper::{ChromeSession, ScraperConfig};
//!
//! let session = ChromeSession::launch(ScraperConfig::default()).await?;
//! session.login(&login_config).await?;
//! ```

pub mod classifier;
mod chrome;
mod config;
mod login;
mod scripts;
pub mod wait;

pub use chrome::ChromeSession;
pub use classifier::{classify, ClassifiedFeed};
pub use config::{Credentials, FeedSelectors, LoginConfig, ScraperConfig};
pub use scripts::FeedScripts;
pub use wait::RetryPolicy;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::app::Result;
use crate::domain::PostFields;
use crate::normalizer::TimeFragment;

pub const SORTING_PARAM: &str = "sorting_setting";
pub const SORT_BY_RECENT: &str = "RECENT_ACTIVITY";

/// Handle to one child of the feed container, valid for a single cycle
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedNode {
    /// Position among the feed's children when the cycle enumerated them
    pub key: usize,
    /// Structural fingerprint, `"<tag>|<class>"`
    pub signature: String,
}

impl FeedNode {
    pub fn new(key: usize, signature: impl Into<String>) -> Self {
        Self {
            key,
            signature: signature.into(),
        }
    }
}

/// State of a link that only gains a real target after being hovered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkProbe {
    /// Still inert; the probe hovered it again
    Pending,
    /// Points at the given target
    Live(String),
}

/// DOM operations the scrape cycle needs from the browser
#[async_trait]
pub trait FeedSession: Send + Sync {
    /// Handle to an opened detail view
    type Detail: Send + Sync;

    /// Navigate the main view to the feed
    async fn load_feed(&self, url: &Url) -> Result<()>;

    /// Current number of children in the feed container
    async fn feed_child_count(&self) -> Result<usize>;

    /// Enumerate the feed container's children in document order
    async fn feed_children(&self) -> Result<Vec<FeedNode>>;

    /// Read author and text from a feed entry
    async fn read_post(&self, node: &FeedNode) -> Result<PostFields>;

    /// Check the entry's detail link, hovering it while it is inert
    async fn probe_post_link(&self, node: &FeedNode) -> Result<LinkProbe>;

    /// Open the detail view for a resolved link
    async fn open_detail(&self, href: &str) -> Result<Self::Detail>;

    /// Check the detail view's time link, hovering it while it is inert
    async fn probe_time_link(&self, detail: &Self::Detail) -> Result<LinkProbe>;

    /// Text fragments under the resolved time link, in document order
    async fn time_fragments(&self, detail: &Self::Detail) -> Result<Vec<TimeFragment>>;

    /// Close the detail view and return focus to the feed
    async fn close_detail(&self, detail: Self::Detail) -> Result<()>;
}

/// Feed URL with most recent activity first
pub fn feed_url(page_url: &str) -> Result<Url> {
    let mut url = Url::parse(page_url)?;

    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != SORTING_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(retained)
        .append_pair(SORTING_PARAM, SORT_BY_RECENT);

    Ok(url)
}
