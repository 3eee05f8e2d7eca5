// Route exports
pub mod auth;
pub mod error;
pub mod feed;
pub mod health;
pub mod lists;
pub mod locations;

use std::sync::Arc;

use actix_web::web;
use tokio_util::sync::CancellationToken;

use crate::services::{FeedService, SupabaseClient};

pub use error::ApiError;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub supabase: Arc<SupabaseClient>,
    pub feed: FeedService,
    /// Cancelled when the server shuts down
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Token for one request's backend fetches
    ///
    /// Child of the shutdown token. Handlers hold a drop guard on it so that a
    /// request torn down mid-flight cancels whatever it was waiting on.
    pub fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(health::configure)
            .configure(locations::configure)
            .configure(feed::configure)
            .configure(lists::configure),
    );
}
