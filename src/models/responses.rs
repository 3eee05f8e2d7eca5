use serde::{Deserialize, Serialize};

use crate::core::distance::format_distance;
use crate::models::domain::{Category, FavoriteList, FeedItem, FeedSource, ListMembership, Location, Photo, Rating};
use crate::models::rows::{PhotoWithAuthor, RatingWithAuthor};

/// A location as listed to clients, with its distance from the caller when known
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationView {
    #[serde(flatten)]
    pub location: Location,
    pub distance_km: Option<f64>,
    pub distance_label: Option<String>,
}

impl LocationView {
    pub fn new(location: Location, distance_km: Option<f64>) -> Self {
        Self {
            location,
            distance_km,
            distance_label: format_distance(distance_km),
        }
    }
}

/// Response for the location list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationsResponse {
    pub locations: Vec<LocationView>,
    /// Whether the list is ordered by distance from the caller
    pub ranked: bool,
    pub total_results: usize,
}

/// Response for the location detail endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationDetailResponse {
    pub location: Location,
    pub ratings: Vec<RatingWithAuthor>,
    pub photos: Vec<PhotoWithAuthor>,
    pub my_rating: Option<Rating>,
    /// Set when the ratings or photos could not be loaded
    #[serde(default)]
    pub degraded: bool,
}

/// Response for a rating upsert: the stored rating and the refetched location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingResponse {
    pub rating: Rating,
    pub location: Location,
}

/// Response for a photo upload: the stored photo and the refetched location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoResponse {
    pub photo: Photo,
    pub location: Location,
}

/// Response for the friends activity feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedResponse {
    pub items: Vec<FeedItem>,
    /// True when at least one source failed and the feed is partial
    pub degraded: bool,
    pub failed_sources: Vec<FeedSource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListsResponse {
    pub lists: Vec<FavoriteList>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListLocationsResponse {
    pub list_id: uuid::Uuid,
    pub locations: Vec<Location>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipResponse {
    pub membership: ListMembership,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoriesResponse {
    pub categories: Vec<Category>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
