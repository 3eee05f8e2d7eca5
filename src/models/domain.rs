use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// A validated latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    #[error("latitude must be a finite value in [-90, 90], got {0}")]
    Latitude(f64),

    #[error("longitude must be a finite value in [-180, 180], got {0}")]
    Longitude(f64),
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::Latitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::Longitude(longitude));
        }
        Ok(Self { latitude, longitude })
    }

    /// Great-circle distance to `other` in kilometers
    #[inline]
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        crate::core::distance::haversine_distance(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

/// Location category
///
/// Stored as lowercase text. Values this service does not know about read back
/// as [`Category::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Category {
    Park,
    Beach,
    Cafe,
    Restaurant,
    Trail,
    Store,
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Park,
        Category::Beach,
        Category::Cafe,
        Category::Restaurant,
        Category::Trail,
        Category::Store,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Park => "park",
            Category::Beach => "beach",
            Category::Cafe => "cafe",
            Category::Restaurant => "restaurant",
            Category::Trail => "trail",
            Category::Store => "store",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        value.parse().unwrap_or(Category::Other)
    }
}

/// A dog-friendly place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub address: Option<String>,
    pub category: Category,
    #[serde(default)]
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub total_ratings: i64,
}

impl Location {
    /// The stored coordinate, if both halves are present and in range
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Coordinate::new(lat, lng).ok(),
            _ => None,
        }
    }
}

/// Public profile fields joined onto ratings, photos and feed items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub username: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// One user's score for one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub id: Uuid,
    pub location_id: Uuid,
    pub user_id: Uuid,
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub id: Uuid,
    pub location_id: Uuid,
    pub user_id: Uuid,
    pub photo_url: String,
    #[serde(default)]
    pub caption: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// State of a friendship edge; only accepted friends feed the activity feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendStatus {
    Pending,
    Accepted,
}

impl FriendStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FriendStatus::Pending => "pending",
            FriendStatus::Accepted => "accepted",
        }
    }
}

/// A named collection of locations owned by one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteList {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Row of the list/location join relation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListMembership {
    pub list_id: Uuid,
    pub location_id: Uuid,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Minimal location reference carried by feed items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRef {
    pub id: Uuid,
    pub name: String,
}

/// Which backend query a feed item came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedSource {
    Ratings,
    Photos,
}

impl fmt::Display for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedSource::Ratings => f.write_str("ratings"),
            FeedSource::Photos => f.write_str("photos"),
        }
    }
}

/// Type-specific payload of a feed item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FeedActivity {
    Rating {
        rating: u8,
        comment: Option<String>,
    },
    Photo {
        photo_url: String,
        caption: Option<String>,
    },
}

/// Display-only union of a friend's rating or photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: Uuid,
    pub author: Option<AuthorSummary>,
    pub location: LocationRef,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub activity: FeedActivity,
}

impl FeedItem {
    pub fn source(&self) -> FeedSource {
        match self.activity {
            FeedActivity::Rating { .. } => FeedSource::Ratings,
            FeedActivity::Photo { .. } => FeedSource::Photos,
        }
    }
}
