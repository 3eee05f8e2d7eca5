use actix_web::{web, HttpResponse};

use crate::models::FeedResponse;
use crate::routes::{ApiError, AppState};
use crate::services::Session;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/feed", web::get().to(get_feed));
}

/// Friends activity feed
///
/// GET /api/v1/feed
///
/// Ratings and photos by accepted friends, newest first. When one of the two
/// sources fails the response is still 200 with `degraded: true`.
async fn get_feed(state: web::Data<AppState>, session: Session) -> Result<HttpResponse, ApiError> {
    let cancel = state.request_token();
    let _guard = cancel.clone().drop_guard();

    let merged = state.feed.load(&session, &cancel).await?;
    let degraded = merged.is_degraded();

    Ok(HttpResponse::Ok().json(FeedResponse {
        items: merged.items,
        degraded,
        failed_sources: merged.failed_sources,
    }))
}
