use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Stable key for a post, derived from its author and text.
///
/// Two posts with identical author and text collapse onto the same identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostIdentity(String);

impl PostIdentity {
    /// Generate a deterministic identity from author and text
    pub fn new(author: &str, text: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(author.as_bytes());
        hasher.update([0u8]);
        hasher.update(text.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for log lines
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

impl fmt::Display for PostIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
