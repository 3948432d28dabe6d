use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the browser session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Whether to run the browser in headless mode (default: true)
    pub headless: bool,

    /// Running inside a container: adds sandbox-disabling flags and forces headless (default: false)
    pub container: bool,

    /// CDP request timeout in seconds (default: 30)
    pub timeout_secs: u64,

    /// Wait time after page load for dynamic content in milliseconds (default: 1000)
    pub wait_after_load_ms: u64,

    /// User agent string to use
    pub user_agent: Option<String>,

    /// Persistent browser profile directory, keeps the session logged in across restarts
    pub user_data_dir: Option<PathBuf>,

    /// `style` value carried by genuine time characters
    pub time_marker: String,

    pub selectors: FeedSelectors,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            headless: true,
            container: false,
            timeout_secs: 30,
            wait_after_load_ms: 1000,
            user_agent: Some(
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                    .to_string(),
            ),
            user_data_dir: None,
            time_marker: "position: relative;".to_string(),
            selectors: FeedSelectors::default(),
        }
    }
}

impl ScraperConfig {
    /// Get the CDP request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get the wait time after load as a Duration
    pub fn wait_after_load(&self) -> Duration {
        Duration::from_millis(self.wait_after_load_ms)
    }

    /// Containers have no display, so they always run headless
    pub fn runs_headless(&self) -> bool {
        self.headless || self.container
    }
}

/// CSS selectors for the feed layout.
///
/// Post-scoped selectors are resolved inside a single feed entry, detail
/// selectors inside the detail view's post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSelectors {
    /// The feed container whose children are the candidate posts
    pub feed: String,
    pub post_author: String,
    pub post_text: String,
    /// Link that has no real target until hovered
    pub inactive_link: String,
    /// Same link once it points at the post
    pub active_link: String,
    /// The post on its detail page
    pub detail_post: String,
    /// Element under the active link that holds the time characters
    pub time_container: String,
}

impl Default for FeedSelectors {
    fn default() -> Self {
        Self {
            feed: "div[role='feed']".to_string(),
            post_author: "a[href*='groups'][href*='user'] strong span".to_string(),
            post_text: "div[dir='auto']".to_string(),
            inactive_link: "a[href='#']".to_string(),
            active_link: "a[href*='groups'][href*='posts']".to_string(),
            detail_post: "div[aria-posinset='1']".to_string(),
            time_container: "span[style*='flex']".to_string(),
        }
    }
}

/// Configuration for the one-time login flow
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginConfig {
    pub url: String,

    /// Wait for the user to approve a two-factor prompt instead of failing (default: true)
    pub wait_for_two_factor: bool,

    /// Upper bound on the two-factor wait in seconds (default: 300)
    pub two_factor_timeout_secs: u64,

    /// Delay between typed characters in milliseconds (default: 150)
    pub typing_delay_ms: u64,

    /// Text shown while a login code is expected
    pub code_prompt_text: String,

    pub email_input: String,
    pub password_input: String,
    pub decline_cookies: String,

    /// Landmark present once the session is logged in
    pub main_landmark: String,

    /// Taken from the environment only, never from the config file
    #[serde(skip)]
    pub credentials: Option<Credentials>,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            url: "https://www.facebook.com/login".to_string(),
            wait_for_two_factor: true,
            two_factor_timeout_secs: 300,
            typing_delay_ms: 150,
            code_prompt_text: "enter your login code".to_string(),
            email_input: "input[name='email']".to_string(),
            password_input: "input[name='pass']".to_string(),
            decline_cookies:
                "button[data-testid='cookie-policy-manage-dialog-decline-button']".to_string(),
            main_landmark: "[role='main']".to_string(),
            credentials: None,
        }
    }
}

impl LoginConfig {
    pub fn typing_delay(&self) -> Duration {
        Duration::from_millis(self.typing_delay_ms)
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
