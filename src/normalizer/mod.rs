pub mod assembler;
pub mod relative_time;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::app::Result;

pub use assembler::{RelativeTimeString, TimeFragment, TimeStringAssembler};

/// Turns the fragments under a post's time link into an absolute time.
#[derive(Debug, Clone)]
pub struct TimeNormalizer {
    assembler: TimeStringAssembler,
}

impl TimeNormalizer {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            assembler: TimeStringAssembler::new(marker),
        }
    }

    /// Assemble the relative time string and resolve it against `now`.
    pub fn normalize(&self, fragments: &[TimeFragment], now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let relative = self.assembler.assemble(fragments)?;
        debug!(time = %relative, fragments = fragments.len(), "Assembled post time");

        relative_time::parse(relative.as_str(), now).inspect_err(|_| {
            warn!(time = %relative, "Time string does not conform to format");
        })
    }
}
