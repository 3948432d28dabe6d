use thiserror::Error;

#[derive(Error, Debug)]
pub enum PostwatchError {
    #[error("Feed did not load after {attempts} attempts")]
    FeedLoadTimeout { attempts: u32 },

    #[error("Post link stayed inactive after {attempts} attempts")]
    InactiveLinkTimeout { attempts: u32 },

    #[error("Unrecognized time format: {0:?}")]
    UnrecognizedTimeFormat(String),

    #[error("No time fragments carried the marker")]
    EmptyTimeString,

    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl PostwatchError {
    /// Whether the failure only concerns the post being delivered.
    ///
    /// Post-local failures leave the post unrecorded so the next cycle retries
    /// it; every other failure aborts the cycle.
    pub fn is_post_local(&self) -> bool {
        matches!(self, Self::Delivery(_) | Self::Http(_))
    }
}

pub type Result<T> = std::result::Result<T, PostwatchError>;
