use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::core::feed::{merge_feed, MergedFeed};
use crate::services::session::Session;
use crate::services::supabase::{with_cancel, SupabaseClient, SupabaseError};

/// Default number of items fetched from each feed source
pub const DEFAULT_PER_SOURCE_LIMIT: usize = 20;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Failed to load friends: {0}")]
    Friends(SupabaseError),

    #[error("All feed sources failed")]
    AllSourcesFailed,

    #[error("Feed load cancelled")]
    Cancelled,
}

/// Builds the friends activity feed
#[derive(Clone)]
pub struct FeedService {
    supabase: Arc<SupabaseClient>,
    per_source_limit: usize,
}

impl FeedService {
    pub fn new(supabase: Arc<SupabaseClient>, per_source_limit: usize) -> Self {
        Self {
            supabase,
            per_source_limit: per_source_limit.max(1),
        }
    }

    pub fn per_source_limit(&self) -> usize {
        self.per_source_limit
    }

    /// Load the caller's feed
    ///
    /// Ratings and photos are fetched concurrently. One failing source only
    /// degrades the result; both failing is an error. If `cancel` fires before
    /// the fetches resolve nothing is merged and `FeedError::Cancelled` is
    /// returned.
    pub async fn load(&self, session: &Session, cancel: &CancellationToken) -> Result<MergedFeed, FeedError> {
        let friend_ids = match with_cancel(cancel, self.supabase.accepted_friend_ids(session)).await {
            Ok(ids) => ids,
            Err(SupabaseError::Cancelled) => return Err(FeedError::Cancelled),
            Err(e) => return Err(FeedError::Friends(e)),
        };

        if friend_ids.is_empty() {
            tracing::debug!("User {} has no accepted friends, feed is empty", session.user_id());
            return Ok(MergedFeed::empty());
        }

        let limit = self.per_source_limit;
        let fetch_both = async {
            tokio::join!(
                self.supabase.friend_ratings(session, &friend_ids, limit),
                self.supabase.friend_photos(session, &friend_ids, limit),
            )
        };

        let (ratings, photos) = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FeedError::Cancelled),
            results = fetch_both => results,
        };

        let merged = merge_feed(ratings, photos);
        if merged.all_sources_failed() {
            tracing::error!("Both feed sources failed for user {}", session.user_id());
            return Err(FeedError::AllSourcesFailed);
        }

        tracing::debug!(
            "Feed for {} has {} items from {} friends (degraded: {})",
            session.user_id(),
            merged.items.len(),
            friend_ids.len(),
            merged.is_degraded()
        );

        Ok(merged)
    }
}
