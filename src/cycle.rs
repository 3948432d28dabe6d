//! One polling pass over the feed.
//!
//! ```text
//! LoadFeed → AwaitStable → Classify → per post:
//!     identity → seen? → resolve link → detail view → time → deliver → record
//! ```
//!
//! Feed stability, link resolution and time extraction failures abort the
//! whole cycle. Delivery failures only skip the post, which stays unrecorded
//! and is retried by the next cycle.

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::app::{PostwatchError, Result};
use crate::delivery::Delivery;
use crate::domain::{OutboundPost, PostFields, PostIdentity};
use crate::normalizer::TimeNormalizer;
use crate::scraper::wait::{self, RetryPolicy};
use crate::scraper::{classify, FeedNode, FeedSession, LinkProbe};
use crate::store::DedupStore;

/// Polling budgets for one cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    /// The feed counts as loaded once it has more children than this (default: 5)
    pub stability_threshold: usize,
    /// Feed child-count probes before giving up (default: 10)
    pub stability_attempts: u32,
    pub stability_interval_ms: u64,
    /// Link probes before giving up (default: 10)
    pub link_attempts: u32,
    pub link_interval_ms: u64,
    /// Examine at most this many classified posts per cycle
    pub max_posts: Option<usize>,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            stability_threshold: 5,
            stability_attempts: 10,
            stability_interval_ms: 1000,
            link_attempts: 10,
            link_interval_ms: 1000,
            max_posts: None,
        }
    }
}

impl CycleConfig {
    pub fn stability_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.stability_attempts,
            Duration::from_millis(self.stability_interval_ms),
        )
    }

    pub fn link_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.link_attempts,
            Duration::from_millis(self.link_interval_ms),
        )
    }
}

/// Why a feed entry produced no delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Delivered by an earlier cycle
    AlreadySeen,
    /// No author text, so not a post
    MissingAuthor,
    /// Delivery failed; the post stays eligible for the next cycle
    DeliveryFailed(String),
}

/// Result of processing one feed entry
#[derive(Debug)]
pub enum PostOutcome {
    Processed(OutboundPost),
    Skipped(SkipReason),
    /// The failure ends the cycle
    Aborted(PostwatchError),
}

/// Summary of a completed cycle
#[derive(Debug, Default)]
pub struct CycleReport {
    pub delivered: Vec<OutboundPost>,
    pub already_seen: usize,
    pub missing_author: usize,
    pub delivery_failures: usize,
}

impl CycleReport {
    fn tally(&mut self, outcome: PostOutcome) -> Result<()> {
        match outcome {
            PostOutcome::Processed(post) => self.delivered.push(post),
            PostOutcome::Skipped(SkipReason::AlreadySeen) => self.already_seen += 1,
            PostOutcome::Skipped(SkipReason::MissingAuthor) => self.missing_author += 1,
            PostOutcome::Skipped(SkipReason::DeliveryFailed(_)) => self.delivery_failures += 1,
            PostOutcome::Aborted(e) => return Err(e),
        }
        Ok(())
    }
}

/// Coordinates the browser session, time normalization, delivery and the
/// dedup store across polling cycles
pub struct ScrapeCycle<S, D, T> {
    session: S,
    delivery: D,
    store: T,
    normalizer: TimeNormalizer,
    feed_url: Url,
    config: CycleConfig,
}

impl<S, D, T> ScrapeCycle<S, D, T>
where
    S: FeedSession,
    D: Delivery,
    T: DedupStore,
{
    pub fn new(
        session: S,
        delivery: D,
        store: T,
        normalizer: TimeNormalizer,
        feed_url: Url,
        config: CycleConfig,
    ) -> Self {
        Self {
            session,
            delivery,
            store,
            normalizer,
            feed_url,
            config,
        }
    }

    pub fn store(&self) -> &T {
        &self.store
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn feed_url(&self) -> &Url {
        &self.feed_url
    }

    pub fn into_session(self) -> S {
        self.session
    }

    /// Run one pass over the feed
    pub async fn run(&mut self) -> Result<CycleReport> {
        info!("Scraping posts");

        self.session.load_feed(&self.feed_url).await?;
        self.await_stable().await?;

        let feed = classify(self.session.feed_children().await?);
        if let Some(filler) = feed.excluded() {
            debug!(signature = filler, "Removed filler elements");
        }
        if feed.is_empty() {
            warn!("Feed classified as empty");
        }

        let mut posts = feed.into_posts();
        if let Some(max) = self.config.max_posts {
            posts.truncate(max);
        }

        let mut report = CycleReport::default();
        for node in &posts {
            let outcome = self.process_post(node).await;
            report.tally(outcome)?;
        }

        info!(
            delivered = report.delivered.len(),
            already_seen = report.already_seen,
            delivery_failures = report.delivery_failures,
            "Cycle complete"
        );
        Ok(report)
    }

    /// Process a single classified feed entry
    pub async fn process_post(&mut self, node: &FeedNode) -> PostOutcome {
        match self.try_process_post(node).await {
            Ok(outcome) => outcome,
            Err(e) => PostOutcome::Aborted(e),
        }
    }

    async fn try_process_post(&mut self, node: &FeedNode) -> Result<PostOutcome> {
        let fields = self.session.read_post(node).await?;
        if fields.author.is_empty() {
            debug!(key = node.key, "Entry has no author, skipping");
            return Ok(PostOutcome::Skipped(SkipReason::MissingAuthor));
        }

        let identity = fields.identity();
        if self.store.contains(&identity) {
            info!(author = %fields.author, identity = identity.short(), "Skipping post");
            return Ok(PostOutcome::Skipped(SkipReason::AlreadySeen));
        }

        let session = &self.session;
        let href = resolve_link(self.config.link_policy(), || session.probe_post_link(node)).await?;

        let detail = self.session.open_detail(&href).await?;
        let result = self.read_and_deliver(&detail, fields, &identity).await;

        if let Err(e) = self.session.close_detail(detail).await {
            warn!("Failed to close post page: {}", e);
        }

        result
    }

    async fn read_and_deliver(
        &mut self,
        detail: &S::Detail,
        fields: PostFields,
        identity: &PostIdentity,
    ) -> Result<PostOutcome> {
        info!("Reading time from post");
        let session = &self.session;
        resolve_link(self.config.link_policy(), || session.probe_time_link(detail)).await?;

        let fragments = self.session.time_fragments(detail).await?;
        let posted_at = self.normalizer.normalize(&fragments, Utc::now())?;

        let post = OutboundPost::new(fields, posted_at);
        match self.delivery.deliver(&post).await {
            Ok(()) => {
                debug!(identity = identity.short(), "Saving post to dedup store");
                self.store.record(identity.clone(), posted_at);
                Ok(PostOutcome::Processed(post))
            }
            Err(e) if e.is_post_local() => {
                warn!(author = %post.author, error = %e, "Delivery failed, skipping post");
                Ok(PostOutcome::Skipped(SkipReason::DeliveryFailed(e.to_string())))
            }
            Err(e) => Err(e),
        }
    }

    async fn await_stable(&self) -> Result<usize> {
        info!("Waiting for page feed to load");
        let policy = self.config.stability_policy();
        let threshold = self.config.stability_threshold;
        let session = &self.session;

        let count = wait::poll(policy, |attempt| async move {
            let count = session.feed_child_count().await?;
            if count > threshold {
                return Ok(Some(count));
            }
            debug!(attempt, count, "Page feed not loaded");
            Ok(None)
        })
        .await?
        .ok_or(PostwatchError::FeedLoadTimeout {
            attempts: policy.attempts,
        })?;

        info!(count, "Page feed loaded");
        Ok(count)
    }
}

/// Probe an inert link until it goes live, returning its target
async fn resolve_link<F, Fut>(policy: RetryPolicy, mut probe: F) -> Result<String>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<LinkProbe>>,
{
    debug!("Loading inactive link");
    wait::poll(policy, |attempt| {
        let probe = probe();
        async move {
            match probe.await? {
                LinkProbe::Live(href) => Ok(Some(href)),
                LinkProbe::Pending => {
                    debug!(attempt, "Inactive link still present");
                    Ok(None)
                }
            }
        }
    })
    .await?
    .ok_or(PostwatchError::InactiveLinkTimeout {
        attempts: policy.attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::TimeFragment;
    use crate::scraper::feed_url;
    use crate::store::MemoryDedupStore;
    use async_trait::async_trait;
    use chrono::TimeDelta;
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex, MutexGuard};

    const MARKER: &str = "position: relative;";
    const POST_BASE: &str = "https://www.facebook.com/groups/42/posts/";

    #[derive(Clone)]
    struct FakeEntry {
        node: FeedNode,
        fields: PostFields,
        /// Probes answered `Pending` before the post link goes live
        pending_probes: u32,
        time: Vec<TimeFragment>,
        time_live: bool,
    }

    #[derive(Default)]
    struct Calls {
        loads: usize,
        counts: usize,
        reads: Vec<usize>,
        link_probes: HashMap<usize, u32>,
        opened: Vec<usize>,
        closed: Vec<usize>,
    }

    struct FakeSession {
        entries: Vec<FakeEntry>,
        /// Child-count probes answered with 0 before the feed fills in
        ready_after: usize,
        calls: Mutex<Calls>,
    }

    impl FakeSession {
        fn new(entries: Vec<FakeEntry>) -> Self {
            Self {
                entries,
                ready_after: 0,
                calls: Mutex::default(),
            }
        }

        fn entry(&self, key: usize) -> Result<&FakeEntry> {
            self.entries
                .iter()
                .find(|e| e.node.key == key)
                .ok_or_else(|| PostwatchError::Browser(format!("no entry {}", key)))
        }

        fn calls(&self) -> MutexGuard<'_, Calls> {
            self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl FeedSession for FakeSession {
        type Detail = usize;

        async fn load_feed(&self, _url: &Url) -> Result<()> {
            self.calls().loads += 1;
            Ok(())
        }

        async fn feed_child_count(&self) -> Result<usize> {
            let mut calls = self.calls();
            calls.counts += 1;
            Ok(if calls.counts > self.ready_after {
                self.entries.len()
            } else {
                0
            })
        }

        async fn feed_children(&self) -> Result<Vec<FeedNode>> {
            Ok(self.entries.iter().map(|e| e.node.clone()).collect())
        }

        async fn read_post(&self, node: &FeedNode) -> Result<PostFields> {
            self.calls().reads.push(node.key);
            Ok(self.entry(node.key)?.fields.clone())
        }

        async fn probe_post_link(&self, node: &FeedNode) -> Result<LinkProbe> {
            let entry = self.entry(node.key)?;
            let mut calls = self.calls();
            let probes = calls.link_probes.entry(node.key).or_default();
            *probes += 1;
            if *probes > entry.pending_probes {
                Ok(LinkProbe::Live(format!("{}{}", POST_BASE, node.key)))
            } else {
                Ok(LinkProbe::Pending)
            }
        }

        async fn open_detail(&self, href: &str) -> Result<usize> {
            let key = href
                .strip_prefix(POST_BASE)
                .and_then(|k| k.parse().ok())
                .ok_or_else(|| PostwatchError::Browser(format!("bad href {}", href)))?;
            self.calls().opened.push(key);
            Ok(key)
        }

        async fn probe_time_link(&self, detail: &usize) -> Result<LinkProbe> {
            let entry = self.entry(*detail)?;
            Ok(if entry.time_live {
                LinkProbe::Live(format!("{}{}", POST_BASE, detail))
            } else {
                LinkProbe::Pending
            })
        }

        async fn time_fragments(&self, detail: &usize) -> Result<Vec<TimeFragment>> {
            Ok(self.entry(*detail)?.time.clone())
        }

        async fn close_detail(&self, detail: usize) -> Result<()> {
            self.calls().closed.push(detail);
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct FakeDelivery {
        sent: Arc<Mutex<Vec<OutboundPost>>>,
        failing: Arc<Mutex<HashSet<String>>>,
    }

    impl FakeDelivery {
        fn fail_for(&self, author: &str) {
            self.failing.lock().unwrap().insert(author.to_string());
        }

        fn recover(&self) {
            self.failing.lock().unwrap().clear();
        }

        fn sent_authors(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|p| p.author.clone())
                .collect()
        }
    }

    #[async_trait]
    impl Delivery for FakeDelivery {
        async fn deliver(&self, post: &OutboundPost) -> Result<()> {
            if self.failing.lock().unwrap().contains(&post.author) {
                return Err(PostwatchError::Delivery("503 Service Unavailable".into()));
            }
            self.sent.lock().unwrap().push(post.clone());
            Ok(())
        }
    }

    /// Marker-tagged characters interleaved with decoys
    fn obfuscated(time: &str) -> Vec<TimeFragment> {
        time.chars()
            .flat_map(|c| {
                [
                    TimeFragment::new(c.to_string(), Some(MARKER)),
                    TimeFragment::new("7", Some("position: absolute; top: 3em;")),
                ]
            })
            .collect()
    }

    fn entry(key: usize, signature: &str, author: &str, text: &str, time: &str) -> FakeEntry {
        FakeEntry {
            node: FeedNode::new(key, signature),
            fields: PostFields::new(author, text),
            pending_probes: 0,
            time: obfuscated(time),
            time_live: true,
        }
    }

    /// Posts sharing one wrapper signature followed by a single decoy
    fn feed(posts: &[(&str, &str)]) -> Vec<FakeEntry> {
        let mut entries: Vec<_> = posts
            .iter()
            .enumerate()
            .map(|(key, (author, text))| entry(key, "div|post", author, text, "5m"))
            .collect();
        entries.push(entry(posts.len(), "div|decoy", "spam", "buy now", "now"));
        entries
    }

    fn config() -> CycleConfig {
        CycleConfig {
            stability_threshold: 2,
            stability_attempts: 3,
            stability_interval_ms: 0,
            link_attempts: 3,
            link_interval_ms: 0,
            max_posts: None,
        }
    }

    fn cycle_with(
        session: FakeSession,
        delivery: FakeDelivery,
        store: MemoryDedupStore,
        config: CycleConfig,
    ) -> ScrapeCycle<FakeSession, FakeDelivery, MemoryDedupStore> {
        ScrapeCycle::new(
            session,
            delivery,
            store,
            TimeNormalizer::new(MARKER),
            feed_url("https://www.facebook.com/groups/42").unwrap(),
            config,
        )
    }

    fn cycle(
        session: FakeSession,
        delivery: FakeDelivery,
    ) -> ScrapeCycle<FakeSession, FakeDelivery, MemoryDedupStore> {
        cycle_with(session, delivery, MemoryDedupStore::new(), config())
    }

    #[tokio::test]
    async fn test_delivers_new_posts_and_records_them() {
        let delivery = FakeDelivery::default();
        let mut cycle = cycle(
            FakeSession::new(feed(&[("alice", "hello"), ("bob", "bench for sale")])),
            delivery.clone(),
        );

        let report = cycle.run().await.unwrap();

        assert_eq!(delivery.sent_authors(), vec!["alice", "bob"]);
        assert_eq!(report.delivered.len(), 2);
        assert!(cycle.store().contains(&PostIdentity::new("alice", "hello")));
        assert!(cycle.store().contains(&PostIdentity::new("bob", "bench for sale")));
        assert_eq!(cycle.session().calls().loads, 1);
    }

    #[tokio::test]
    async fn test_skips_post_already_in_store() {
        let mut store = MemoryDedupStore::new();
        store.record(PostIdentity::new("alice", "hello"), Utc::now());
        let delivery = FakeDelivery::default();
        let mut cycle = cycle_with(
            FakeSession::new(feed(&[("alice", "hello"), ("bob", "bench for sale")])),
            delivery.clone(),
            store,
            config(),
        );

        let report = cycle.run().await.unwrap();

        assert_eq!(delivery.sent_authors(), vec!["bob"]);
        assert_eq!(report.already_seen, 1);
        assert_eq!(cycle.store().len(), 2);
        assert_eq!(cycle.session().calls().opened, vec![1]);
    }

    #[tokio::test]
    async fn test_delivery_failure_is_isolated_to_post() {
        let delivery = FakeDelivery::default();
        delivery.fail_for("alice");
        let mut cycle = cycle(
            FakeSession::new(feed(&[("alice", "hello"), ("bob", "bench for sale")])),
            delivery.clone(),
        );

        let report = cycle.run().await.unwrap();

        assert_eq!(report.delivery_failures, 1);
        assert_eq!(delivery.sent_authors(), vec!["bob"]);
        assert_eq!(cycle.store().len(), 1);
        assert!(!cycle.store().contains(&PostIdentity::new("alice", "hello")));
        assert!(cycle.store().contains(&PostIdentity::new("bob", "bench for sale")));

        let calls = cycle.session().calls();
        assert_eq!(calls.opened, vec![0, 1]);
        assert_eq!(calls.closed, vec![0, 1]);
    }

    #[tokio::test]
    async fn test_failed_delivery_is_retried_next_cycle() {
        let delivery = FakeDelivery::default();
        delivery.fail_for("alice");
        let mut cycle = cycle(
            FakeSession::new(feed(&[("alice", "hello"), ("bob", "bench for sale")])),
            delivery.clone(),
        );

        cycle.run().await.unwrap();
        delivery.recover();
        let report = cycle.run().await.unwrap();

        assert_eq!(report.already_seen, 1);
        assert_eq!(delivery.sent_authors(), vec!["bob", "alice"]);
        assert_eq!(cycle.store().len(), 2);
    }

    #[tokio::test]
    async fn test_decoy_is_never_read() {
        let delivery = FakeDelivery::default();
        let mut cycle = cycle(
            FakeSession::new(feed(&[("alice", "hello"), ("bob", "bench for sale")])),
            delivery.clone(),
        );

        cycle.run().await.unwrap();

        assert_eq!(cycle.session().calls().reads, vec![0, 1]);
        assert!(!delivery.sent_authors().contains(&"spam".to_string()));
    }

    #[tokio::test]
    async fn test_posted_at_follows_relative_time() {
        let mut entries = feed(&[("alice", "hello"), ("bob", "bench for sale")]);
        entries[0].time = obfuscated("3h");
        let delivery = FakeDelivery::default();
        let mut cycle = cycle(FakeSession::new(entries), delivery.clone());

        let before = Utc::now();
        cycle.run().await.unwrap();

        let sent = delivery.sent.lock().unwrap();
        let expected = before - TimeDelta::hours(3);
        assert!((sent[0].posted_at - expected).num_seconds().abs() <= 1);
        assert_eq!(
            cycle.store().posted_at(&PostIdentity::new("alice", "hello")),
            Some(sent[0].posted_at)
        );
    }

    #[tokio::test]
    async fn test_feed_never_stabilizing_is_timeout() {
        let mut session = FakeSession::new(feed(&[("alice", "hello"), ("bob", "bench for sale")]));
        session.ready_after = usize::MAX;
        let mut cycle = cycle(session, FakeDelivery::default());

        let err = cycle.run().await.unwrap_err();

        assert!(matches!(err, PostwatchError::FeedLoadTimeout { attempts: 3 }));
        assert_eq!(cycle.session().calls().counts, 3);
        assert!(cycle.session().calls().reads.is_empty());
    }

    #[tokio::test]
    async fn test_feed_stabilizing_within_budget() {
        let mut session = FakeSession::new(feed(&[("alice", "hello"), ("bob", "bench for sale")]));
        session.ready_after = 2;
        let delivery = FakeDelivery::default();
        let mut cycle = cycle(session, delivery.clone());

        cycle.run().await.unwrap();

        assert_eq!(cycle.session().calls().counts, 3);
        assert_eq!(delivery.sent_authors().len(), 2);
    }

    #[tokio::test]
    async fn test_small_feed_is_not_stable() {
        // Two children never exceed a threshold of two
        let session = FakeSession::new(vec![
            entry(0, "div|post", "alice", "hello", "5m"),
            entry(1, "div|decoy", "spam", "buy now", "now"),
        ]);
        let mut cycle = cycle(session, FakeDelivery::default());

        assert!(matches!(
            cycle.run().await,
            Err(PostwatchError::FeedLoadTimeout { .. })
        ));
    }

    #[tokio::test]
    async fn test_link_resolves_after_hovering() {
        let mut entries = feed(&[("alice", "hello"), ("bob", "bench for sale")]);
        entries[0].pending_probes = 2;
        let delivery = FakeDelivery::default();
        let mut cycle = cycle(FakeSession::new(entries), delivery.clone());

        cycle.run().await.unwrap();

        assert_eq!(cycle.session().calls().link_probes[&0], 3);
        assert_eq!(delivery.sent_authors(), vec!["alice", "bob"]);
    }

    #[tokio::test]
    async fn test_inactive_link_aborts_cycle() {
        let mut entries = feed(&[("alice", "hello"), ("bob", "bench for sale")]);
        entries[0].pending_probes = 10;
        let delivery = FakeDelivery::default();
        let mut cycle = cycle(FakeSession::new(entries), delivery.clone());

        let err = cycle.run().await.unwrap_err();

        assert!(matches!(err, PostwatchError::InactiveLinkTimeout { attempts: 3 }));
        let calls = cycle.session().calls();
        assert_eq!(calls.link_probes[&0], 3);
        assert!(calls.opened.is_empty());
        assert!(delivery.sent_authors().is_empty());
        assert!(cycle.store().is_empty());
    }

    #[tokio::test]
    async fn test_inactive_time_link_aborts_and_closes_detail() {
        let mut entries = feed(&[("alice", "hello"), ("bob", "bench for sale")]);
        entries[0].time_live = false;
        let mut cycle = cycle(FakeSession::new(entries), FakeDelivery::default());

        let err = cycle.run().await.unwrap_err();

        assert!(matches!(err, PostwatchError::InactiveLinkTimeout { .. }));
        let calls = cycle.session().calls();
        assert_eq!(calls.opened, vec![0]);
        assert_eq!(calls.closed, vec![0]);
    }

    #[tokio::test]
    async fn test_unrecognized_time_aborts_and_closes_detail() {
        let mut entries = feed(&[("alice", "hello"), ("bob", "bench for sale")]);
        entries[0].time = obfuscated("yesterday");
        let delivery = FakeDelivery::default();
        let mut cycle = cycle(FakeSession::new(entries), delivery.clone());

        let err = cycle.run().await.unwrap_err();

        assert!(matches!(err, PostwatchError::UnrecognizedTimeFormat(ref s) if s == "yesterday"));
        let calls = cycle.session().calls();
        assert_eq!(calls.opened, vec![0]);
        assert_eq!(calls.closed, vec![0]);
        assert!(delivery.sent_authors().is_empty());
    }

    #[tokio::test]
    async fn test_unmarked_time_is_empty_time_string() {
        let mut entries = feed(&[("alice", "hello"), ("bob", "bench for sale")]);
        entries[0].time = vec![TimeFragment::new("5", None), TimeFragment::new("m", None)];
        let mut cycle = cycle(FakeSession::new(entries), FakeDelivery::default());

        assert!(matches!(
            cycle.run().await,
            Err(PostwatchError::EmptyTimeString)
        ));
        assert_eq!(cycle.session().calls().closed, vec![0]);
    }

    #[tokio::test]
    async fn test_uniform_feed_completes_with_no_posts() {
        let session = FakeSession::new(vec![
            entry(0, "div|post", "alice", "hello", "5m"),
            entry(1, "div|post", "bob", "hi", "5m"),
            entry(2, "div|post", "carol", "hey", "5m"),
        ]);
        let delivery = FakeDelivery::default();
        let mut cycle = cycle(session, delivery.clone());

        let report = cycle.run().await.unwrap();

        assert!(report.delivered.is_empty());
        assert!(cycle.session().calls().reads.is_empty());
    }

    #[tokio::test]
    async fn test_entry_without_author_is_skipped() {
        let mut entries = feed(&[("alice", "hello"), ("", "sponsored"), ("bob", "hi")]);
        entries[1].pending_probes = 10;
        let delivery = FakeDelivery::default();
        let mut cycle = cycle(FakeSession::new(entries), delivery.clone());

        let report = cycle.run().await.unwrap();

        assert_eq!(report.missing_author, 1);
        assert_eq!(delivery.sent_authors(), vec!["alice", "bob"]);
        assert!(!cycle.session().calls().link_probes.contains_key(&1));
    }

    #[tokio::test]
    async fn test_max_posts_limits_cycle() {
        let delivery = FakeDelivery::default();
        let mut cycle = cycle_with(
            FakeSession::new(feed(&[("alice", "hello"), ("bob", "bench for sale")])),
            delivery.clone(),
            MemoryDedupStore::new(),
            CycleConfig {
                max_posts: Some(1),
                ..config()
            },
        );

        cycle.run().await.unwrap();

        assert_eq!(delivery.sent_authors(), vec!["alice"]);
    }

    #[tokio::test]
    async fn test_process_post_outcomes() {
        let mut entries = feed(&[("alice", "hello"), ("bob", "bench for sale")]);
        entries[1].time = obfuscated("soon");
        let delivery = FakeDelivery::default();
        let mut cycle = cycle(FakeSession::new(entries), delivery.clone());
        let alice = FeedNode::new(0, "div|post");
        let bob = FeedNode::new(1, "div|post");

        assert!(matches!(
            cycle.process_post(&alice).await,
            PostOutcome::Processed(ref post) if post.author == "alice"
        ));
        assert!(matches!(
            cycle.process_post(&alice).await,
            PostOutcome::Skipped(SkipReason::AlreadySeen)
        ));
        assert!(matches!(
            cycle.process_post(&bob).await,
            PostOutcome::Aborted(PostwatchError::UnrecognizedTimeFormat(_))
        ));

        delivery.fail_for("alice");
        let mut retry = cycle_with(
            FakeSession::new(feed(&[("alice", "hello")])),
            delivery,
            MemoryDedupStore::new(),
            config(),
        );
        assert!(matches!(
            retry.process_post(&alice).await,
            PostOutcome::Skipped(SkipReason::DeliveryFailed(_))
        ));
    }

    #[test]
    fn test_default_cycle_config() {
        let config = CycleConfig::default();
        assert_eq!(config.stability_threshold, 5);
        assert_eq!(config.stability_policy(), RetryPolicy::new(10, Duration::from_secs(1)));
        assert_eq!(config.link_policy(), RetryPolicy::new(10, Duration::from_secs(1)));
        assert_eq!(config.max_posts, None);
    }
}
