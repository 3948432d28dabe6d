use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::domain::PostIdentity;
use crate::store::DedupStore;

/// Process-lifetime dedup map. Entries are never evicted and nothing is
/// persisted, so a restart re-delivers posts still visible in the feed.
#[derive(Debug, Default)]
pub struct MemoryDedupStore {
    seen: HashMap<PostIdentity, DateTime<Utc>>,
}

impl MemoryDedupStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DedupStore for MemoryDedupStore {
    fn contains(&self, id: &PostIdentity) -> bool {
        self.seen.contains_key(id)
    }

    fn record(&mut self, id: PostIdentity, posted_at: DateTime<Utc>) {
        self.seen.insert(id, posted_at);
    }

    fn posted_at(&self, id: &PostIdentity) -> Option<DateTime<Utc>> {
        self.seen.get(id).copied()
    }

    fn len(&self) -> usize {
        self.seen.len()
    }
}
