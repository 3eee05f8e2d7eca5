use actix_web::{error, http::StatusCode, HttpRequest, HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ErrorResponse;
use crate::services::{FeedError, SessionError, SupabaseError};

/// Errors surfaced by HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("{0}")]
    NotFound(String),

    /// Duplicate list membership, shown to the user as a notice
    #[error("This location is already in this list!")]
    AlreadyInList,

    #[error("{0}")]
    UnsupportedMediaType(String),

    #[error(transparent)]
    Backend(#[from] SupabaseError),

    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_failed",
            ApiError::Session(_) => "unauthorized",
            ApiError::NotFound(_) => "not_found",
            ApiError::AlreadyInList => "already_in_list",
            ApiError::UnsupportedMediaType(_) => "unsupported_media_type",
            ApiError::Backend(e) => backend_code(e),
            ApiError::Feed(FeedError::Friends(e)) => backend_code(e),
            ApiError::Feed(FeedError::AllSourcesFailed) => "feed_unavailable",
            ApiError::Feed(FeedError::Cancelled) => "cancelled",
            ApiError::Internal(_) => "internal_error",
        }
    }

    /// Message shown to the client
    ///
    /// Upstream and internal failures get a fixed text; their detail (backend
    /// error bodies, request URLs) only goes to the log.
    fn client_message(&self) -> String {
        match self.error_code() {
            "upstream_error" => "The backend service failed to handle the request".to_string(),
            "internal_error" => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

fn backend_code(e: &SupabaseError) -> &'static str {
    match e {
        SupabaseError::Conflict(_) => "conflict",
        SupabaseError::NotFound(_) => "not_found",
        SupabaseError::Unauthorized => "unauthorized",
        SupabaseError::Cancelled => "cancelled",
        SupabaseError::RequestError(_)
        | SupabaseError::ApiError { .. }
        | SupabaseError::InvalidResponse(_) => "upstream_error",
    }
}

fn backend_status(e: &SupabaseError) -> StatusCode {
    match e {
        SupabaseError::Conflict(_) => StatusCode::CONFLICT,
        SupabaseError::NotFound(_) => StatusCode::NOT_FOUND,
        SupabaseError::Unauthorized => StatusCode::UNAUTHORIZED,
        SupabaseError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        SupabaseError::RequestError(_)
        | SupabaseError::ApiError { .. }
        | SupabaseError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Session(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::AlreadyInList => StatusCode::CONFLICT,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Backend(e) => backend_status(e),
            ApiError::Feed(FeedError::Friends(e)) => backend_status(e),
            ApiError::Feed(FeedError::AllSourcesFailed) => StatusCode::BAD_GATEWAY,
            ApiError::Feed(FeedError::Cancelled) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        HttpResponse::build(status).json(ErrorResponse {
            error: self.error_code().to_string(),
            message: self.client_message(),
            status_code: status.as_u16(),
        })
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    ApiError::Validation(format!("Invalid JSON: {}", err)).into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Validation(format!("Invalid query: {}", err)).into()
}

/// Handle path segment errors (e.g. a malformed UUID)
pub fn handle_path_error(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Validation(format!("Invalid path: {}", err)).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn test_duplicate_membership_is_a_notice() {
        let response = ApiError::AlreadyInList.error_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "already_in_list");
        assert_eq!(json["message"], "This location is already in this list!");
        assert_eq!(json["status_code"], 409);
    }

    #[actix_web::test]
    async fn test_upstream_detail_stays_out_of_response() {
        let err = ApiError::from(SupabaseError::ApiError {
            status: 500,
            code: Some("42P01".into()),
            message: "relation \"ratings\" does not exist".into(),
        });
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "upstream_error");
        assert_eq!(json["message"], "The backend service failed to handle the request");
        assert!(!body.windows(8).any(|w| w == b"relation"));
    }

    #[actix_web::test]
    async fn test_friend_lookup_failure_is_generic() {
        let err = ApiError::from(FeedError::Friends(SupabaseError::InvalidResponse(
            "Failed to parse friends rows at /rest/v1/friends?user_id=eq.abc".into(),
        )));
        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "The backend service failed to handle the request");
    }

    #[actix_web::test]
    async fn test_client_errors_keep_their_message() {
        let body = to_bytes(
            ApiError::Validation("lat and lng must be provided together".into())
                .error_response()
                .into_body(),
        )
        .await
        .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "lat and lng must be provided together");
    }

    #[test]
    fn test_backend_status_mapping() {
        assert_eq!(
            ApiError::from(SupabaseError::Conflict("dup".into())).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(SupabaseError::InvalidResponse("bad".into())).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(FeedError::Cancelled).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(SessionError::MissingToken).status_code(),
            StatusCode::UNAUTHORIZED
        );
    }
}
