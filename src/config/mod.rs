//! Configuration management for postwatch.
//!
//! Configuration is read from `~/.config/postwatch/config.toml` (or the file
//! given with `--config`) and then overridden from the environment. If the
//! default file doesn't exist, a default configuration with comments is created.

use crate::cycle::CycleConfig;
use crate::daemon::DaemonConfig;
use crate::delivery::DeliveryConfig;
use crate::scraper::{Credentials, LoginConfig, ScraperConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const ENV_PAGE: &str = "PAGE_TO_SCRAPE";
pub const ENV_ENDPOINT: &str = "DATA_ENDPOINT";
pub const ENV_MAX_POSTS: &str = "POSTS_TO_SCRAPE";
pub const ENV_CONTAINER: &str = "RUNNING_IN_CONTAINER";
pub const ENV_EMAIL: &str = "FACEBOOK_EMAIL";
pub const ENV_PASSWORD: &str = "FACEBOOK_PASSWORD";

/// Main configuration struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub feed: FeedConfig,
    pub cycle: CycleConfig,
    pub daemon: DaemonConfig,
    pub scraper: ScraperConfig,
    pub login: LoginConfig,
    pub delivery: DeliveryConfig,
}

/// The page being watched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Group page URL; the recency sorting parameter is added on load
    pub page_url: Option<String>,
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/postwatch/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("postwatch").join("config.toml"))
    }

    /// Override values from the process environment.
    pub fn apply_process_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env(|key| std::env::var(key).ok())
    }

    /// Override values from an environment lookup.
    ///
    /// Credentials are only ever taken from here.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(page) = lookup(ENV_PAGE) {
            self.feed.page_url = Some(page);
        }
        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            self.delivery.endpoint = Some(endpoint);
        }
        if let Some(max) = lookup(ENV_MAX_POSTS) {
            let max = max.trim().parse().map_err(|_| ConfigError::Invalid {
                key: ENV_MAX_POSTS,
                reason: format!("expected a post count, got {:?}", max),
            })?;
            self.cycle.max_posts = Some(max);
        }
        if let Some(container) = lookup(ENV_CONTAINER) {
            self.scraper.container = container.trim().eq_ignore_ascii_case("true");
        }

        match (lookup(ENV_EMAIL), lookup(ENV_PASSWORD)) {
            (Some(email), Some(password)) => {
                self.login.credentials = Some(Credentials { email, password });
            }
            (None, None) => {}
            (Some(_), None) => {
                return Err(ConfigError::Invalid {
                    key: ENV_PASSWORD,
                    reason: format!("required when {} is set", ENV_EMAIL),
                })
            }
            (None, Some(_)) => {
                return Err(ConfigError::Invalid {
                    key: ENV_EMAIL,
                    reason: format!("required when {} is set", ENV_PASSWORD),
                })
            }
        }

        Ok(())
    }

    /// Check the values a live session cannot start without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feed.page_url.is_none() {
            return Err(ConfigError::Missing {
                key: "feed.page_url",
                env: ENV_PAGE,
            });
        }
        if self.delivery.endpoint.is_none() {
            return Err(ConfigError::Missing {
                key: "delivery.endpoint",
                env: ENV_ENDPOINT,
            });
        }
        Ok(())
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# postwatch configuration
#
# Environment variables override this file:
#   PAGE_TO_SCRAPE, DATA_ENDPOINT, POSTS_TO_SCRAPE, RUNNING_IN_CONTAINER
# Login credentials are read from FACEBOOK_EMAIL and FACEBOOK_PASSWORD only.

[feed]
# Group page to watch
# page_url = "https://www.facebook.com/groups/example"

[cycle]
# The feed counts as loaded once it has more children than this
stability_threshold = 5
stability_attempts = 10
stability_interval_ms = 1000

# Probes for a hover-activated link before the cycle is abandoned
link_attempts = 10
link_interval_ms = 1000

# Examine at most this many posts per cycle
# max_posts = 10

[daemon]
# Seconds between cycles
poll_interval_secs = 600

# Seconds to wait after a failed cycle
retry_delay_secs = 600

run_on_start = true

[scraper]
# Run browser in headless mode (no visible window)
headless = true

# Container mode disables the sandbox and always runs headless
container = false

# CDP request timeout in seconds
timeout_secs = 30

# Wait time after page load for dynamic content (milliseconds)
wait_after_load_ms = 1000

# Persistent profile directory, keeps the login across restarts
# user_data_dir = "/var/lib/postwatch/profile"

# Style value carried by genuine time characters
time_marker = "position: relative;"

[scraper.selectors]
feed = "div[role='feed']"
post_author = "a[href*='groups'][href*='user'] strong span"
post_text = "div[dir='auto']"
inactive_link = "a[href='#']"
active_link = "a[href*='groups'][href*='posts']"
detail_post = "div[aria-posinset='1']"
time_container = "span[style*='flex']"

[login]
url = "https://www.facebook.com/login"

# Wait for a two-factor approval instead of failing
wait_for_two_factor = true
two_factor_timeout_secs = 300

# Delay between typed characters (milliseconds)
typing_delay_ms = 150

[delivery]
# URL new posts are POSTed to
# endpoint = "https://example.com/posts"
timeout_secs = 10

# Bearer token source: "none", "env" (var), "file" (path) or "command" (program, args)
[delivery.token]
kind = "env"
var = "DATA_ENDPOINT_TOKEN"
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("No {key} configured (set it in the config file or {env})")]
    Missing {
        key: &'static str,
        env: &'static str,
    },

    #[error("Invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}
