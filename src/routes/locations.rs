use actix_web::{http::header::CONTENT_TYPE, web, HttpRequest, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::core::{filter_by_category, rank_by_distance};
use crate::models::requests::non_blank;
use crate::models::{
    CreateLocationRequest, LocationDetailResponse, LocationView, LocationsQuery, LocationsResponse,
    PhotoResponse, PhotoUploadQuery, RatingResponse, SubmitRatingRequest,
};
use crate::routes::{ApiError, AppState};
use crate::services::{with_cancel, NewLocation, Session};

/// Configure all location-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/locations", web::get().to(list_locations))
        .route("/locations", web::post().to(create_location))
        .route("/locations/{id}", web::get().to(get_location))
        .route("/locations/{id}/rating", web::put().to(submit_rating))
        .route("/locations/{id}/photos", web::post().to(upload_photo));
}

/// List locations
///
/// GET /api/v1/locations?lat=52.37&lng=4.89&category=park
///
/// With a coordinate the list is ordered nearest first, locations without
/// coordinates trailing. Without one the backend order (newest first) is kept.
async fn list_locations(
    state: web::Data<AppState>,
    session: Session,
    query: web::Query<LocationsQuery>,
) -> Result<HttpResponse, ApiError> {
    let origin = query.origin().map_err(ApiError::Validation)?;
    let category = query.category().map_err(ApiError::Validation)?;

    let cancel = state.request_token();
    let _guard = cancel.clone().drop_guard();
    let locations = with_cancel(&cancel, state.supabase.list_locations(&session)).await?;

    let views: Vec<LocationView> = match origin {
        Some(origin) => {
            let ranking = rank_by_distance(origin, locations);
            let ranked = filter_by_category(ranking.ranked, category);
            let unranked = filter_by_category(ranking.unranked, category);

            ranked
                .into_iter()
                .map(|r| LocationView::new(r.item, Some(r.distance_km)))
                .chain(unranked.into_iter().map(|l| LocationView::new(l, None)))
                .collect()
        }
        None => filter_by_category(locations, category)
            .into_iter()
            .map(|l| LocationView::new(l, None))
            .collect(),
    };

    tracing::debug!(
        "Listing {} locations for {} (ranked: {}, category: {:?})",
        views.len(),
        session.user_id(),
        origin.is_some(),
        category
    );

    Ok(HttpResponse::Ok().json(LocationsResponse {
        total_results: views.len(),
        locations: views,
        ranked: origin.is_some(),
    }))
}

/// Add a location
///
/// POST /api/v1/locations
///
/// Request body:
/// ```json
/// {
///   "name": "Bark Park",
///   "description": "Fenced, water bowls",
///   "address": "Parkweg 1",
///   "latitude": 52.37,
///   "longitude": 4.89,
///   "category": "park"
/// }
/// ```
async fn create_location(
    state: web::Data<AppState>,
    session: Session,
    req: web::Json<CreateLocationRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate().map_err(|e| ApiError::Validation(e.to_string()))?;

    let req = req.into_inner();
    let new_location = NewLocation {
        name: req.name.trim().to_string(),
        description: non_blank(req.description.as_deref()),
        address: non_blank(req.address.as_deref()),
        latitude: req.latitude,
        longitude: req.longitude,
        category: req.category.trim().to_ascii_lowercase(),
        created_by: session.user_id(),
    };

    let location = state.supabase.create_location(&session, &new_location).await?;
    Ok(HttpResponse::Created().json(location))
}

/// Location detail: the location, its ratings and photos, and the caller's
/// own rating if there is one
///
/// Only the location itself is required. A failed ratings or photos query
/// leaves that list empty and sets `degraded`.
///
/// GET /api/v1/locations/{id}
async fn get_location(
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let location_id = path.into_inner();

    let cancel = state.request_token();
    let _guard = cancel.clone().drop_guard();
    let (location, ratings, photos) = with_cancel(&cancel, async {
        let (location, ratings, photos) = tokio::join!(
            state.supabase.get_location(&session, location_id),
            state.supabase.location_ratings(&session, location_id),
            state.supabase.location_photos(&session, location_id),
        );
        location.map(|location| (location, ratings, photos))
    })
    .await?;

    let mut degraded = false;
    let ratings = ratings.unwrap_or_else(|e| {
        tracing::warn!("Ratings for location {} unavailable: {}", location_id, e);
        degraded = true;
        Vec::new()
    });
    let photos = photos.unwrap_or_else(|e| {
        tracing::warn!("Photos for location {} unavailable: {}", location_id, e);
        degraded = true;
        Vec::new()
    });

    let my_rating = ratings
        .iter()
        .find(|r| r.rating.user_id == session.user_id())
        .map(|r| r.rating.clone());

    Ok(HttpResponse::Ok().json(LocationDetailResponse {
        location,
        ratings,
        photos,
        my_rating,
        degraded,
    }))
}

/// Rate a location, replacing any earlier rating by the same user
///
/// PUT /api/v1/locations/{id}/rating
///
/// Responds with the stored rating and the location as refetched after the
/// write, so the aggregate reflects the server's recompute.
async fn submit_rating(
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<Uuid>,
    req: web::Json<SubmitRatingRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate().map_err(|e| ApiError::Validation(e.to_string()))?;
    let location_id = path.into_inner();

    let comment = non_blank(req.comment.as_deref());
    let rating = state
        .supabase
        .upsert_rating(&session, location_id, req.rating, comment.as_deref())
        .await?;

    let location = state.supabase.get_location(&session, location_id).await?;

    tracing::info!(
        "User {} rated location {} with {}",
        session.user_id(),
        location_id,
        rating.rating
    );

    Ok(HttpResponse::Ok().json(RatingResponse { rating, location }))
}

/// Upload a photo for a location
///
/// POST /api/v1/locations/{id}/photos?filename=rex.jpg&caption=Good+boy
///
/// The body is the raw image; `Content-Type` must be an `image/*` type.
async fn upload_photo(
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<Uuid>,
    query: web::Query<PhotoUploadQuery>,
    http_req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    query.validate().map_err(|e| ApiError::Validation(e.to_string()))?;
    let location_id = path.into_inner();

    if body.is_empty() {
        return Err(ApiError::Validation("Photo body is empty".to_string()));
    }

    let content_type = http_req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_ascii_lowercase())
        .unwrap_or_default();
    if !content_type.starts_with("image/") {
        return Err(ApiError::UnsupportedMediaType(format!(
            "Expected an image content type, got '{}'",
            content_type
        )));
    }

    // Nothing is uploaded for a location the caller cannot see
    state.supabase.get_location(&session, location_id).await?;

    let extension = photo_extension(query.filename.as_deref(), &content_type);
    let object_path = photo_object_path(
        session.user_id(),
        chrono::Utc::now().timestamp_millis(),
        &extension,
    );

    let photo_url = state
        .supabase
        .upload_photo_object(&session, &object_path, &content_type, body.to_vec())
        .await?;

    let caption = non_blank(query.caption.as_deref());
    let photo = match state
        .supabase
        .insert_photo(&session, location_id, &photo_url, caption.as_deref())
        .await
    {
        Ok(photo) => photo,
        Err(e) => {
            if let Err(cleanup) = state.supabase.remove_photo_object(&session, &object_path).await {
                tracing::warn!("Failed to remove orphaned photo object {}: {}", object_path, cleanup);
            }
            return Err(e.into());
        }
    };

    let location = state.supabase.get_location(&session, location_id).await?;

    tracing::info!(
        "User {} uploaded photo {} for location {}",
        session.user_id(),
        photo.id,
        location_id
    );

    Ok(HttpResponse::Created().json(PhotoResponse { photo, location }))
}

/// File extension for an uploaded photo
///
/// Taken from the client's file name when it has a plausible one, otherwise
/// derived from the content type.
fn photo_extension(filename: Option<&str>, content_type: &str) -> String {
    let from_name = filename
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    if let Some(ext) = from_name {
        return ext;
    }

    match content_type.strip_prefix("image/").unwrap_or_default() {
        "jpeg" | "jpg" | "pjpeg" => "jpg".to_string(),
        "svg+xml" => "svg".to_string(),
        other if !other.is_empty() && other.chars().all(|c| c.is_ascii_alphanumeric()) => other.to_string(),
        _ => "img".to_string(),
    }
}

/// Storage path for a photo: `{user_id}/{unix_millis}.{ext}`
fn photo_object_path(user_id: Uuid, unix_millis: i64, extension: &str) -> String {
    format!("{}/{}.{}", user_id, unix_millis, extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_extension_prefers_filename() {
        assert_eq!(photo_extension(Some("Rex.PNG"), "image/jpeg"), "png");
        assert_eq!(photo_extension(Some("archive.tar.gz"), "image/jpeg"), "gz");
    }

    #[test]
    fn test_photo_extension_from_content_type() {
        assert_eq!(photo_extension(None, "image/jpeg"), "jpg");
        assert_eq!(photo_extension(Some("no-extension"), "image/webp"), "webp");
        assert_eq!(photo_extension(Some("weird.$$$"), "image/heic"), "heic");
        assert_eq!(photo_extension(None, "image/svg+xml"), "svg");
        assert_eq!(photo_extension(None, "image/"), "img");
    }

    #[test]
    fn test_photo_object_path() {
        let user = Uuid::nil();
        assert_eq!(
            photo_object_path(user, 1_700_000_000_000, "jpg"),
            "00000000-0000-0000-0000-000000000000/1700000000000.jpg"
        );
    }
}
