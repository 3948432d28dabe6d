use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::PostIdentity;

/// Author and text read from a feed entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostFields {
    pub author: String,
    pub text: String,
}

impl PostFields {
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
        }
    }

    pub fn identity(&self) -> PostIdentity {
        PostIdentity::new(&self.author, &self.text)
    }
}

/// Record handed to the downstream endpoint.
///
/// Serializes as `{"user": .., "content": .., "posted_at": <unix seconds>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundPost {
    #[serde(rename = "user")]
    pub author: String,
    #[serde(rename = "content")]
    pub text: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub posted_at: DateTime<Utc>,
}

impl OutboundPost {
    pub fn new(fields: PostFields, posted_at: DateTime<Utc>) -> Self {
        Self {
            author: fields.author,
            text: fields.text,
            posted_at,
        }
    }

    pub fn identity(&self) -> PostIdentity {
        PostIdentity::new(&self.author, &self.text)
    }
}
