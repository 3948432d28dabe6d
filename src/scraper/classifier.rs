//! Separates real posts from decoy siblings the site injects into the feed.
//!
//! Real entries share a handful of wrapper signatures; the decoy wrapper is
//! the one signature seen least often. This is a heuristic, not a guarantee.

use std::collections::HashMap;

use tracing::debug;

use crate::scraper::FeedNode;

/// Feed children with the filler signature removed, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedFeed {
    posts: Vec<FeedNode>,
    excluded: Option<String>,
}

impl ClassifiedFeed {
    pub fn posts(&self) -> &[FeedNode] {
        &self.posts
    }

    pub fn into_posts(self) -> Vec<FeedNode> {
        self.posts
    }

    /// Signature declared filler, if any
    pub fn excluded(&self) -> Option<&str> {
        self.excluded.as_deref()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

/// Drop every child bearing the least frequent signature.
///
/// When several signatures tie for the minimum, nothing is dropped. A feed
/// whose children all share one signature classifies as empty.
pub fn classify(children: Vec<FeedNode>) -> ClassifiedFeed {
    let excluded = filler_signature(&children);

    let posts = match excluded.as_deref() {
        Some(filler) => children
            .into_iter()
            .filter(|child| child.signature != filler)
            .collect(),
        None => children,
    };

    ClassifiedFeed { posts, excluded }
}

fn filler_signature(children: &[FeedNode]) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for child in children {
        *counts.entry(child.signature.as_str()).or_default() += 1;
    }
    debug!(?counts, "Identified feed signatures");

    let min = counts.values().copied().min()?;
    let mut at_min = counts
        .iter()
        .filter(|(_, count)| **count == min)
        .map(|(signature, _)| *signature);

    let filler = at_min.next()?;
    if at_min.next().is_some() {
        debug!(min, "Minimum signature count is tied, keeping every child");
        return None;
    }

    Some(filler.to_string())
}
