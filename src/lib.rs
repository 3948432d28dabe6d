//! # postwatch
//!
//! Watches a social-network group feed in a real browser session and forwards
//! each post it has not seen before to an HTTP endpoint.
//!
//! ## Architecture
//!
//! One polling cycle runs the pipeline:
//!
//! ```text
//! Scraper → Classifier → Store (seen?) → Normalizer (post time) → Delivery → Store
//! ```
//!
//! - [`scraper`]: Browser session behind the [`FeedSession`](scraper::FeedSession) trait
//! - [`normalizer`]: Recovers relative post times from obfuscated fragments
//! - [`store`]: Remembers delivered posts by content identity
//! - [`delivery`]: POSTs new posts as JSON
//!
//! ## Quick Start
//!
//! ```bash
//! # Poll every 10 minutes
//! PAGE_TO_SCRAPE=https://www.facebook.com/groups/example \
//! DATA_ENDPOINT=https://example.com/posts \
//! postwatch run --interval 10m
//!
//! # One cycle, print what was delivered
//! postwatch once
//!
//! # Check how a relative time resolves
//! postwatch parse-time "3 hours ago"
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together all components:
/// browser session, delivery, dedup store, normalizer.
pub mod app;

/// Configuration loaded from `~/.config/postwatch/config.toml` and the environment.
pub mod config;

/// One polling pass over the feed.
pub mod cycle;

/// Long-running polling loop with graceful shutdown.
pub mod daemon;

/// Command-line interface using clap.
///
/// - `run` - Poll the feed until interrupted
/// - `once` - Run a single cycle
/// - `parse-time <text>` - Resolve a relative time phrase
pub mod cli;

/// Delivery of new posts to the downstream endpoint.
///
/// - [`Delivery`](delivery::Delivery): Async trait for delivery targets
/// - [`HttpDelivery`](delivery::HttpDelivery): reqwest-based implementation
/// - [`TokenSource`](delivery::TokenSource): Bearer token acquisition
pub mod delivery;

/// Core domain models.
///
/// - [`PostFields`](domain::PostFields): Author and text read from the feed
/// - [`OutboundPost`](domain::OutboundPost): Record sent downstream
/// - [`PostIdentity`](domain::PostIdentity): SHA256 content identity
pub mod domain;

/// Relative post time recovery.
pub mod normalizer;

/// Dedup store of delivered posts.
pub mod store;

/// Browser automation via chromiumoxide.
///
/// - [`ChromeSession`](scraper::ChromeSession): Chrome-backed feed session
/// - [`ScraperConfig`](scraper::ScraperConfig): Browser options and selectors
/// - [`classify`](scraper::classify): Filler removal by structural signature
pub mod scraper;
