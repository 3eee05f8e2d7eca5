use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header::AUTHORIZATION, web, FromRequest, HttpRequest};

use crate::routes::error::ApiError;
use crate::services::{Session, SessionError, SessionVerifier};

/// Extracts a verified [`Session`] from the `Authorization` header
impl FromRequest for Session {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(session_from_request(req))
    }
}

fn session_from_request(req: &HttpRequest) -> Result<Session, ApiError> {
    let verifier = req
        .app_data::<web::Data<SessionVerifier>>()
        .ok_or_else(|| ApiError::Internal("session verifier is not configured".to_string()))?;

    let header = match req.headers().get(AUTHORIZATION) {
        Some(value) => Some(value.to_str().map_err(|_| SessionError::MalformedHeader)?),
        None => None,
    };

    let session = verifier.from_authorization_header(header).map_err(|e| {
        tracing::debug!("Rejected request to {}: {}", req.path(), e);
        e
    })?;

    Ok(session)
}
