use std::fmt::Display;

use crate::models::{FeedItem, FeedSource};

/// Result of merging the two feed sources
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MergedFeed {
    /// Newest first
    pub items: Vec<FeedItem>,
    /// Sources whose fetch failed and contributed nothing
    pub failed_sources: Vec<FeedSource>,
}

impl MergedFeed {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_degraded(&self) -> bool {
        !self.failed_sources.is_empty()
    }

    pub fn all_sources_failed(&self) -> bool {
        self.failed_sources.len() == 2
    }
}

/// Merge friend ratings and friend photos into one reverse-chronological feed
///
/// A failed source is logged and skipped, the other source still makes it
/// into the result. Items with equal timestamps have no guaranteed order.
pub fn merge_feed<E: Display>(
    ratings: Result<Vec<FeedItem>, E>,
    photos: Result<Vec<FeedItem>, E>,
) -> MergedFeed {
    let mut merged = MergedFeed::empty();

    for (source, result) in [(FeedSource::Ratings, ratings), (FeedSource::Photos, photos)] {
        match result {
            Ok(items) => merged.items.extend(items),
            Err(e) => {
                tracing::warn!("Feed source {} failed, continuing without it: {}", source, e);
                merged.failed_sources.push(source);
            }
        }
    }

    merged.items.sort_unstable_by(|a, b| b.created_at.cmp(&a.created_at));
    merged
}
