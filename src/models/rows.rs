//! Row shapes returned by backend queries that join related tables.
//!
//! Each query that embeds a relation gets its own type so that joined fields
//! are checked at deserialization time instead of being read from raw JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::domain::{AuthorSummary, FeedActivity, FeedItem, Location, LocationRef, Photo, Rating};

/// `ratings?select=*,profiles(username,avatar_url)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingWithAuthor {
    #[serde(flatten)]
    pub rating: Rating,
    #[serde(alias = "profiles", default)]
    pub author: Option<AuthorSummary>,
}

/// `photos?select=*,profiles(username,avatar_url)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoWithAuthor {
    #[serde(flatten)]
    pub photo: Photo,
    #[serde(alias = "profiles", default)]
    pub author: Option<AuthorSummary>,
}

/// `list_locations?select=location_id,locations(*)`
#[derive(Debug, Clone, Deserialize)]
pub struct ListLocationRow {
    pub location_id: Uuid,
    #[serde(rename = "locations", default)]
    pub location: Option<Location>,
}

/// `friends?select=friend_id`
#[derive(Debug, Clone, Deserialize)]
pub struct FriendIdRow {
    pub friend_id: Uuid,
}

/// Friend rating as selected for the activity feed
#[derive(Debug, Clone, Deserialize)]
pub struct FeedRatingRow {
    pub id: Uuid,
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user_id: Uuid,
    #[serde(default)]
    pub profiles: Option<AuthorSummary>,
    #[serde(default)]
    pub locations: Option<LocationRef>,
}

/// Friend photo as selected for the activity feed
#[derive(Debug, Clone, Deserialize)]
pub struct FeedPhotoRow {
    pub id: Uuid,
    pub photo_url: String,
    #[serde(default)]
    pub caption: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user_id: Uuid,
    #[serde(default)]
    pub profiles: Option<AuthorSummary>,
    #[serde(default)]
    pub locations: Option<LocationRef>,
}

// Rows whose location relation is not visible (deleted, or hidden by row
// level security) have nothing to link to and are dropped.

impl FeedRatingRow {
    pub fn into_feed_item(self) -> Option<FeedItem> {
        let Some(location) = self.locations else {
            tracing::debug!("Dropping feed rating {} without a visible location", self.id);
            return None;
        };
        Some(FeedItem {
            id: self.id,
            author: self.profiles,
            location,
            created_at: self.created_at,
            activity: FeedActivity::Rating {
                rating: self.rating,
                comment: self.comment,
            },
        })
    }
}

impl FeedPhotoRow {
    pub fn into_feed_item(self) -> Option<FeedItem> {
        let Some(location) = self.locations else {
            tracing::debug!("Dropping feed photo {} without a visible location", self.id);
            return None;
        };
        Some(FeedItem {
            id: self.id,
            author: self.profiles,
            location,
            created_at: self.created_at,
            activity: FeedActivity::Photo {
                photo_url: self.photo_url,
                caption: self.caption,
            },
        })
    }
}
