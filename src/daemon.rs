//! Long-running polling loop.
//!
//! Runs one scrape cycle, sleeps, and repeats until SIGINT/SIGTERM. A failed
//! cycle is logged and retried after `retry_delay_secs`; it never ends the
//! daemon. Shutdown is honoured between cycles and during the sleep, never in
//! the middle of a cycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tracing::{error, info, warn};

use crate::app::Result;
use crate::cycle::{CycleReport, ScrapeCycle};
use crate::delivery::Delivery;
use crate::scraper::FeedSession;
use crate::store::DedupStore;

/// Daemon configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Seconds between successful cycles (default: 600 = 10 minutes)
    pub poll_interval_secs: u64,
    /// Seconds to wait after a failed cycle (default: 600)
    pub retry_delay_secs: u64,
    /// Whether to run a cycle immediately on start
    pub run_on_start: bool,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 600,
            retry_delay_secs: 600,
            run_on_start: true,
        }
    }
}

impl DaemonConfig {
    /// Parse interval string like "30s", "10m", "1h", "1d"
    pub fn parse_interval(s: &str) -> std::result::Result<u64, String> {
        let s = s.trim().to_lowercase();

        if let Some(hours) = s.strip_suffix('h') {
            hours
                .parse::<u64>()
                .ok()
                .and_then(|h| h.checked_mul(3600))
                .ok_or_else(|| format!("Invalid hours: {}", hours))
        } else if let Some(minutes) = s.strip_suffix('m') {
            minutes
                .parse::<u64>()
                .ok()
                .and_then(|m| m.checked_mul(60))
                .ok_or_else(|| format!("Invalid minutes: {}", minutes))
        } else if let Some(days) = s.strip_suffix('d') {
            days.parse::<u64>()
                .ok()
                .and_then(|d| d.checked_mul(86400))
                .ok_or_else(|| format!("Invalid days: {}", days))
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.parse::<u64>()
                .map_err(|_| format!("Invalid seconds: {}", secs))
        } else {
            s.parse::<u64>()
                .map_err(|_| format!("Invalid interval: {}. Use format like '30s', '10m', '1h'", s))
        }
    }

    /// Format interval for display
    pub fn format_interval(secs: u64) -> String {
        if secs >= 86400 && secs.is_multiple_of(86400) {
            format!("{}d", secs / 86400)
        } else if secs >= 3600 && secs.is_multiple_of(3600) {
            format!("{}h", secs / 3600)
        } else if secs >= 60 && secs.is_multiple_of(60) {
            format!("{}m", secs / 60)
        } else {
            format!("{}s", secs)
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

/// Stops a running daemon from another task
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    running: Arc<AtomicBool>,
    wake: Arc<Notify>,
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
            wake: Arc::new(Notify::new()),
        }
    }
}

impl ShutdownHandle {
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.wake.notify_one();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Sleep for `duration` unless stopped first. Returns whether the daemon
    /// should keep going.
    pub async fn sleep(&self, duration: Duration) -> bool {
        if !self.is_running() {
            return false;
        }
        tokio::select! {
            _ = tokio::time::sleep(duration) => {}
            _ = self.wake.notified() => {}
        }
        self.is_running()
    }

    /// Stop on SIGINT/SIGTERM (Ctrl-C on Windows)
    pub fn listen_for_signals(&self) {
        let handle = self.clone();

        #[cfg(unix)]
        tokio::spawn(async move {
            use tokio::signal::unix::{signal, SignalKind};

            let (mut sigterm, mut sigint) =
                match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                    (Ok(term), Ok(int)) => (term, int),
                    (Err(e), _) | (_, Err(e)) => {
                        warn!("Failed to install signal handlers: {}", e);
                        return;
                    }
                };

            tokio::select! {
                _ = sigterm.recv() => {},
                _ = sigint.recv() => {},
            }
            info!("Shutdown requested");
            handle.stop();
        });

        #[cfg(windows)]
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown requested");
                handle.stop();
            }
        });
    }
}

/// Daemon runner
pub struct Daemon<S, D, T> {
    cycle: ScrapeCycle<S, D, T>,
    config: DaemonConfig,
    shutdown: ShutdownHandle,
}

impl<S, D, T> Daemon<S, D, T>
where
    S: FeedSession,
    D: Delivery,
    T: DedupStore,
{
    pub fn new(cycle: ScrapeCycle<S, D, T>, config: DaemonConfig) -> Self {
        Self {
            cycle,
            config,
            shutdown: ShutdownHandle::default(),
        }
    }

    /// Stop through an existing handle instead of a fresh one
    pub fn with_shutdown(mut self, shutdown: ShutdownHandle) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    pub fn into_cycle(self) -> ScrapeCycle<S, D, T> {
        self.cycle
    }

    /// Poll until stopped
    pub async fn run(&mut self) -> Result<()> {
        info!(
            interval = %DaemonConfig::format_interval(self.config.poll_interval_secs),
            retry_delay = %DaemonConfig::format_interval(self.config.retry_delay_secs),
            page = %self.cycle.feed_url(),
            "postwatch daemon started"
        );

        if !self.config.run_on_start && !self.shutdown.sleep(self.config.poll_interval()).await {
            info!("Daemon shutting down");
            return Ok(());
        }

        while self.shutdown.is_running() {
            let (delay, secs) = match self.run_once().await {
                Ok(_) => (self.config.poll_interval(), self.config.poll_interval_secs),
                Err(e) => {
                    error!(error = %e, "Scrape cycle failed");
                    (self.config.retry_delay(), self.config.retry_delay_secs)
                }
            };

            if !self.shutdown.is_running() {
                break;
            }
            info!("Next cycle in {}", DaemonConfig::format_interval(secs));
            if !self.shutdown.sleep(delay).await {
                break;
            }
        }

        info!("Daemon shutting down");
        Ok(())
    }

    /// Run a single cycle, logging its outcome
    pub async fn run_once(&mut self) -> Result<CycleReport> {
        let start = Utc::now();
        let report = self.cycle.run().await?;

        let elapsed = Utc::now().signed_duration_since(start);
        info!(
            delivered = report.delivered.len(),
            seen = self.cycle.store().len(),
            "Cycle finished in {:.1}s",
            elapsed.num_milliseconds() as f64 / 1000.0
        );
        Ok(report)
    }
}
