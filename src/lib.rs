//! SniffLocal - discovery service for dog-friendly places
//!
//! Ranks locations by distance from the caller, merges the friends activity
//! feed from its rating and photo sources, and fronts the hosted backend for
//! locations, ratings, photos and favorite lists.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{haversine_distance, merge_feed, rank_by_distance, MergedFeed, Ranking};
pub use models::{Coordinate, FeedItem, Location};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let origin = Coordinate::new(0.0, 0.0).unwrap();
        let ranking = rank_by_distance::<Location, _>(origin, Vec::new());
        assert!(ranking.is_empty());
        assert_eq!(haversine_distance(1.0, 1.0, 1.0, 1.0), 0.0);
    }
}
