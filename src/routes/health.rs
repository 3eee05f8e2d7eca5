use actix_web::{web, HttpResponse, Responder};

use crate::models::{CategoriesResponse, Category, HealthResponse};
use crate::routes::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/categories", web::get().to(list_categories));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let backend_healthy = match state.supabase.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            tracing::warn!("Supabase health check failed: {}", e);
            false
        }
    };

    let status = if backend_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// GET /api/v1/categories
async fn list_categories() -> impl Responder {
    HttpResponse::Ok().json(CategoriesResponse {
        categories: Category::ALL.to_vec(),
    })
}
