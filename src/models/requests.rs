use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::domain::{Category, Coordinate};

/// Query string for listing locations
///
/// `lat`/`lng` carry the caller's one-shot geolocation. Both absent means the
/// position is unknown (denied or failed) and the list is returned unranked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationsQuery {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
}

impl LocationsQuery {
    pub fn origin(&self) -> Result<Option<Coordinate>, String> {
        match (self.lat, self.lng) {
            (None, None) => Ok(None),
            (Some(lat), Some(lng)) => Coordinate::new(lat, lng)
                .map(Some)
                .map_err(|e| e.to_string()),
            _ => Err("lat and lng must be provided together".to_string()),
        }
    }

    pub fn category(&self) -> Result<Option<Category>, String> {
        match self.category.as_deref().map(str::trim) {
            None | Some("") | Some("all") => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(|e: super::domain::UnknownCategory| e.to_string()),
        }
    }
}

/// Request to add a new location
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateLocationRequest {
    #[validate(length(max = 200), custom(function = "not_blank"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[serde(default = "default_category")]
    #[validate(custom(function = "known_category"))]
    pub category: String,
}

fn default_category() -> String {
    Category::Park.as_str().to_string()
}

/// Request to rate a location (insert or overwrite the caller's rating)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitRatingRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

/// Query string accompanying a raw photo upload body
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PhotoUploadQuery {
    #[serde(default)]
    #[validate(length(max = 255))]
    pub filename: Option<String>,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub caption: Option<String>,
}

/// Request to create a favorite list
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateListRequest {
    #[validate(length(max = 100), custom(function = "not_blank"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[serde(default, alias = "isPublic")]
    pub is_public: bool,
}

/// Request to add a location to a favorite list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddToListRequest {
    #[serde(alias = "locationId")]
    pub location_id: Uuid,
}

/// Trim optional free text, mapping blank input to `None`
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn known_category(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<Category>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("unknown_category"))
}
