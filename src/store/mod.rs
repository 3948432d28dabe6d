pub mod memory;

use chrono::{DateTime, Utc};

use crate::domain::PostIdentity;

pub use memory::MemoryDedupStore;

/// Record of posts already delivered downstream
pub trait DedupStore {
    fn contains(&self, id: &PostIdentity) -> bool;
    fn record(&mut self, id: PostIdentity, posted_at: DateTime<Utc>);
    fn posted_at(&self, id: &PostIdentity) -> Option<DateTime<Utc>>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
