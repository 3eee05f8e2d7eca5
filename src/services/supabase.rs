use crate::models::rows::{FeedPhotoRow, FeedRatingRow, FriendIdRow, ListLocationRow};
use crate::models::{
    FavoriteList, FeedItem, FriendStatus, ListMembership, Location, Photo, PhotoWithAuthor,
    Rating, RatingWithAuthor,
};
use crate::services::session::Session;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Postgres error code for unique constraint violations
pub const UNIQUE_VIOLATION: &str = "23505";
/// Postgres error code for foreign key violations
pub const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Errors that can occur when interacting with Supabase
#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error {status}: {message}")]
    ApiError {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: access token rejected by backend")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Request cancelled")]
    Cancelled,
}

/// Error body returned by PostgREST and Storage
#[derive(Debug, Default, Deserialize)]
struct BackendErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Insert payload for a new location
#[derive(Debug, Clone, Serialize)]
pub struct NewLocation {
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub category: String,
    pub created_by: Uuid,
}

#[derive(Debug, Serialize)]
struct RatingUpsert<'a> {
    location_id: Uuid,
    user_id: Uuid,
    rating: u8,
    comment: Option<&'a str>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
struct PhotoInsert<'a> {
    location_id: Uuid,
    user_id: Uuid,
    photo_url: &'a str,
    caption: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct ListInsert<'a> {
    user_id: Uuid,
    name: &'a str,
    description: Option<&'a str>,
    is_public: bool,
}

#[derive(Debug, Serialize)]
struct MembershipInsert {
    list_id: Uuid,
    location_id: Uuid,
}

/// Supabase REST and Storage client
///
/// One instance is shared by the whole server. It carries no user state:
/// every call takes the caller's [`Session`] and forwards its access token so
/// the backend applies row level security for that user.
pub struct SupabaseClient {
    base_url: String,
    anon_key: String,
    photo_bucket: String,
    client: Client,
}

impl SupabaseClient {
    /// Create a new Supabase client
    pub fn new(
        base_url: String,
        anon_key: String,
        photo_bucket: String,
        timeout: Duration,
    ) -> Result<Self, SupabaseError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
            photo_bucket,
            client,
        })
    }

    fn rest_url(&self, table: &str, query: &[(&str, String)]) -> String {
        let url = format!("{}/rest/v1/{}", self.base_url, table);
        if query.is_empty() {
            return url;
        }
        let encoded = query
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", url, encoded)
    }

    fn authed(&self, builder: RequestBuilder, session: &Session) -> RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .bearer_auth(session.access_token())
    }

    /// Map a non-success response to a typed error
    async fn check(response: Response) -> Result<Response, SupabaseError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let body: BackendErrorBody = serde_json::from_str(&text).unwrap_or_default();
        let message = body
            .message
            .or(body.error)
            .unwrap_or_else(|| if text.is_empty() { status.to_string() } else { text.clone() });

        match body.code.as_deref() {
            Some(UNIQUE_VIOLATION) => return Err(SupabaseError::Conflict(message)),
            Some(FOREIGN_KEY_VIOLATION) => return Err(SupabaseError::NotFound(message)),
            _ => {}
        }

        match status.as_u16() {
            401 | 403 => Err(SupabaseError::Unauthorized),
            404 => Err(SupabaseError::NotFound(message)),
            _ => {
                tracing::error!("Supabase request failed: {} - {}", status, text);
                Err(SupabaseError::ApiError {
                    status: status.as_u16(),
                    code: body.code,
                    message,
                })
            }
        }
    }

    async fn select<T: DeserializeOwned>(
        &self,
        session: &Session,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, SupabaseError> {
        let url = self.rest_url(table, query);
        tracing::debug!("Selecting from {}", url);

        let response = self.authed(self.client.get(&url), session).send().await?;
        let response = Self::check(response).await?;

        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| SupabaseError::InvalidResponse(format!("Failed to parse {} rows: {}", table, e)))
    }

    async fn insert<B: Serialize, T: DeserializeOwned>(
        &self,
        session: &Session,
        table: &str,
        body: &B,
        on_conflict: Option<&str>,
    ) -> Result<T, SupabaseError> {
        let mut query = Vec::new();
        let mut prefer = String::from("return=representation");
        if let Some(columns) = on_conflict {
            query.push(("on_conflict", columns.to_string()));
            prefer.push_str(",resolution=merge-duplicates");
        }

        let url = self.rest_url(table, &query);
        let response = self
            .authed(self.client.post(&url), session)
            .header("Prefer", prefer)
            .json(body)
            .send()
            .await?;
        let response = Self::check(response).await?;

        let mut rows: Vec<T> = response
            .json()
            .await
            .map_err(|e| SupabaseError::InvalidResponse(format!("Failed to parse inserted {} row: {}", table, e)))?;

        if rows.is_empty() {
            return Err(SupabaseError::InvalidResponse(format!(
                "Insert into {} returned no row",
                table
            )));
        }
        Ok(rows.swap_remove(0))
    }

    /// Delete matching rows, returning how many were removed
    async fn delete(
        &self,
        session: &Session,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<usize, SupabaseError> {
        let url = self.rest_url(table, filters);
        let response = self
            .authed(self.client.delete(&url), session)
            .header("Prefer", "return=representation")
            .send()
            .await?;
        let response = Self::check(response).await?;

        let rows: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| SupabaseError::InvalidResponse(format!("Failed to parse deleted rows: {}", e)))?;
        Ok(rows.len())
    }

    /// All locations, newest first
    pub async fn list_locations(&self, session: &Session) -> Result<Vec<Location>, SupabaseError> {
        self.select(
            session,
            "locations",
            &[("select", "*".into()), ("order", "created_at.desc".into())],
        )
        .await
    }

    pub async fn get_location(&self, session: &Session, id: Uuid) -> Result<Location, SupabaseError> {
        let mut rows: Vec<Location> = self
            .select(
                session,
                "locations",
                &[("select", "*".into()), ("id", format!("eq.{}", id))],
            )
            .await?;

        rows.pop()
            .ok_or_else(|| SupabaseError::NotFound(format!("Location {} not found", id)))
    }

    pub async fn create_location(
        &self,
        session: &Session,
        location: &NewLocation,
    ) -> Result<Location, SupabaseError> {
        let created: Location = self.insert(session, "locations", location, None).await?;
        tracing::info!("Location {} created by {}", created.id, session.user_id());
        Ok(created)
    }

    /// Ratings for one location with their authors, newest first
    pub async fn location_ratings(
        &self,
        session: &Session,
        location_id: Uuid,
    ) -> Result<Vec<RatingWithAuthor>, SupabaseError> {
        self.select(
            session,
            "ratings",
            &[
                ("select", "*,profiles(username,avatar_url)".into()),
                ("location_id", format!("eq.{}", location_id)),
                ("order", "created_at.desc".into()),
            ],
        )
        .await
    }

    /// Photos for one location with their authors, newest first
    pub async fn location_photos(
        &self,
        session: &Session,
        location_id: Uuid,
    ) -> Result<Vec<PhotoWithAuthor>, SupabaseError> {
        self.select(
            session,
            "photos",
            &[
                ("select", "*,profiles(username,avatar_url)".into()),
                ("location_id", format!("eq.{}", location_id)),
                ("order", "created_at.desc".into()),
            ],
        )
        .await
    }

    /// Insert or overwrite the caller's rating for a location
    pub async fn upsert_rating(
        &self,
        session: &Session,
        location_id: Uuid,
        rating: u8,
        comment: Option<&str>,
    ) -> Result<Rating, SupabaseError> {
        let body = RatingUpsert {
            location_id,
            user_id: session.user_id(),
            rating,
            comment,
            updated_at: chrono::Utc::now(),
        };

        let stored: Rating = self
            .insert(session, "ratings", &body, Some("user_id,location_id"))
            .await?;
        tracing::debug!("Rating {} stored for location {}", stored.id, location_id);
        Ok(stored)
    }

    /// Upload an image object and return its public URL
    pub async fn upload_photo_object(
        &self,
        session: &Session,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, SupabaseError> {
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.photo_bucket, path
        );

        let response = self
            .authed(self.client.post(&url), session)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        Self::check(response).await?;

        tracing::debug!("Uploaded photo object {}", path);
        Ok(self.public_object_url(path))
    }

    /// Remove an uploaded image object
    pub async fn remove_photo_object(&self, session: &Session, path: &str) -> Result<(), SupabaseError> {
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.photo_bucket, path
        );

        let response = self.authed(self.client.delete(&url), session).send().await?;
        Self::check(response).await?;

        tracing::debug!("Removed photo object {}", path);
        Ok(())
    }

    pub fn public_object_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.photo_bucket, path
        )
    }

    pub async fn insert_photo(
        &self,
        session: &Session,
        location_id: Uuid,
        photo_url: &str,
        caption: Option<&str>,
    ) -> Result<Photo, SupabaseError> {
        let body = PhotoInsert {
            location_id,
            user_id: session.user_id(),
            photo_url,
            caption,
        };
        self.insert(session, "photos", &body, None).await
    }

    /// IDs of the caller's accepted friends
    pub async fn accepted_friend_ids(&self, session: &Session) -> Result<Vec<Uuid>, SupabaseError> {
        let rows: Vec<FriendIdRow> = self
            .select(
                session,
                "friends",
                &[
                    ("select", "friend_id".into()),
                    ("user_id", format!("eq.{}", session.user_id())),
                    ("status", format!("eq.{}", FriendStatus::Accepted.as_str())),
                ],
            )
            .await?;

        Ok(rows.into_iter().map(|r| r.friend_id).collect())
    }

    fn friend_activity_query(friend_ids: &[Uuid], columns: &str, limit: usize) -> Vec<(&'static str, String)> {
        let ids = friend_ids
            .iter()
            .map(Uuid::to_string)
            .collect::<Vec<_>>()
            .join(",");

        vec![
            (
                "select",
                format!(
                    "{},created_at,user_id,profiles:user_id(username,avatar_url),locations:location_id(id,name)",
                    columns
                ),
            ),
            ("user_id", format!("in.({})", ids)),
            ("order", "created_at.desc".into()),
            ("limit", limit.to_string()),
        ]
    }

    /// Most recent ratings by the given friends, newest first
    pub async fn friend_ratings(
        &self,
        session: &Session,
        friend_ids: &[Uuid],
        limit: usize,
    ) -> Result<Vec<FeedItem>, SupabaseError> {
        let query = Self::friend_activity_query(friend_ids, "id,rating,comment", limit);
        let rows: Vec<FeedRatingRow> = self.select(session, "ratings", &query).await?;
        Ok(rows.into_iter().filter_map(FeedRatingRow::into_feed_item).collect())
    }

    /// Most recent photos by the given friends, newest first
    pub async fn friend_photos(
        &self,
        session: &Session,
        friend_ids: &[Uuid],
        limit: usize,
    ) -> Result<Vec<FeedItem>, SupabaseError> {
        let query = Self::friend_activity_query(friend_ids, "id,photo_url,caption", limit);
        let rows: Vec<FeedPhotoRow> = self.select(session, "photos", &query).await?;
        Ok(rows.into_iter().filter_map(FeedPhotoRow::into_feed_item).collect())
    }

    /// The caller's favorite lists, newest first
    pub async fn favorite_lists(&self, session: &Session) -> Result<Vec<FavoriteList>, SupabaseError> {
        self.select(
            session,
            "favorite_lists",
            &[
                ("select", "*".into()),
                ("user_id", format!("eq.{}", session.user_id())),
                ("order", "created_at.desc".into()),
            ],
        )
        .await
    }

    pub async fn create_list(
        &self,
        session: &Session,
        name: &str,
        description: Option<&str>,
        is_public: bool,
    ) -> Result<FavoriteList, SupabaseError> {
        let body = ListInsert {
            user_id: session.user_id(),
            name,
            description,
            is_public,
        };
        self.insert(session, "favorite_lists", &body, None).await
    }

    /// Delete a list; `false` when no visible list had that id
    pub async fn delete_list(&self, session: &Session, list_id: Uuid) -> Result<bool, SupabaseError> {
        let removed = self
            .delete(session, "favorite_lists", &[("id", format!("eq.{}", list_id))])
            .await?;
        Ok(removed > 0)
    }

    /// Locations that belong to a list
    pub async fn list_members(&self, session: &Session, list_id: Uuid) -> Result<Vec<Location>, SupabaseError> {
        let rows: Vec<ListLocationRow> = self
            .select(
                session,
                "list_locations",
                &[
                    ("select", "location_id,locations(*)".into()),
                    ("list_id", format!("eq.{}", list_id)),
                ],
            )
            .await?;

        Ok(rows.into_iter().filter_map(|r| r.location).collect())
    }

    /// Add a location to a list
    ///
    /// Fails with [`SupabaseError::Conflict`] when the location is already a
    /// member.
    pub async fn add_to_list(
        &self,
        session: &Session,
        list_id: Uuid,
        location_id: Uuid,
    ) -> Result<ListMembership, SupabaseError> {
        let body = MembershipInsert { list_id, location_id };
        self.insert(session, "list_locations", &body, None).await
    }

    pub async fn remove_from_list(
        &self,
        session: &Session,
        list_id: Uuid,
        location_id: Uuid,
    ) -> Result<(), SupabaseError> {
        self.delete(
            session,
            "list_locations",
            &[
                ("list_id", format!("eq.{}", list_id)),
                ("location_id", format!("eq.{}", location_id)),
            ],
        )
        .await?;
        Ok(())
    }

    /// Health check against the REST endpoint using the anonymous key
    pub async fn health_check(&self) -> Result<bool, SupabaseError> {
        let response = self
            .client
            .get(format!("{}/rest/v1/", self.base_url))
            .header("apikey", &self.anon_key)
            .send()
            .await?;
        Ok(response.status().is_success())
    }
}

/// Run a backend call unless `cancel` fires first
pub async fn with_cancel<F, T>(cancel: &CancellationToken, fut: F) -> Result<T, SupabaseError>
where
    F: Future<Output = Result<T, SupabaseError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(SupabaseError::Cancelled),
        result = fut => result,
    }
}
