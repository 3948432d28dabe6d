pub mod http;
pub mod token;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::app::Result;
use crate::domain::OutboundPost;

pub use http::HttpDelivery;
pub use token::TokenSource;

/// Hands a new post to the downstream consumer
#[async_trait]
pub trait Delivery: Send + Sync {
    async fn deliver(&self, post: &OutboundPost) -> Result<()>;
}

/// Configuration for the downstream endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// URL the posts are POSTed to
    pub endpoint: Option<String>,

    /// Request timeout in seconds (default: 10)
    pub timeout_secs: u64,

    /// Where the bearer token comes from
    pub token: TokenSource,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: 10,
            token: TokenSource::default(),
        }
    }
}

impl DeliveryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
