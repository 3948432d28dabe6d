use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use crate::app::{PostwatchError, Result};
use crate::delivery::{Delivery, DeliveryConfig, TokenSource};
use crate::domain::OutboundPost;

/// POSTs each post as JSON to the configured endpoint with a bearer token
pub struct HttpDelivery {
    client: Client,
    endpoint: Url,
    token: TokenSource,
}

impl HttpDelivery {
    pub fn new(config: &DeliveryConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .as_deref()
            .ok_or_else(|| PostwatchError::Config("Delivery endpoint is not configured".into()))?;

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("postwatch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_client(client, Url::parse(endpoint)?, config.token.clone()))
    }

    pub fn with_client(client: Client, endpoint: Url, token: TokenSource) -> Self {
        Self {
            client,
            endpoint,
            token,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Delivery for HttpDelivery {
    async fn deliver(&self, post: &OutboundPost) -> Result<()> {
        info!(endpoint = %self.endpoint, author = %post.author, "Posting data to endpoint");

        let mut request = self.client.post(self.endpoint.clone()).json(post);

        let token = self
            .token
            .fetch()
            .await
            .map_err(|e| PostwatchError::Delivery(format!("Failed to obtain token: {}", e)))?;
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_else(|e| {
            debug!(error = %e, "Failed to read response body");
            String::new()
        });

        debug!(%status, "Response from endpoint");
        info!(%status, body = %body, "Response content");

        if !status.is_success() {
            return Err(PostwatchError::Delivery(format!(
                "{} returned {}: {}",
                self.endpoint, status, body
            )));
        }

        Ok(())
    }
}
