use actix_web::{web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::models::requests::non_blank;
use crate::models::{
    AddToListRequest, CreateListRequest, ListLocationsResponse, ListsResponse, MembershipResponse,
};
use crate::routes::{ApiError, AppState};
use crate::services::{with_cancel, Session, SupabaseError};

/// Configure favorite list routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/lists", web::get().to(get_lists))
        .route("/lists", web::post().to(create_list))
        .route("/lists/{id}", web::delete().to(delete_list))
        .route("/lists/{id}/locations", web::get().to(get_list_locations))
        .route("/lists/{id}/locations", web::post().to(add_to_list))
        .route(
            "/lists/{id}/locations/{location_id}",
            web::delete().to(remove_from_list),
        );
}

/// GET /api/v1/lists
async fn get_lists(state: web::Data<AppState>, session: Session) -> Result<HttpResponse, ApiError> {
    let cancel = state.request_token();
    let _guard = cancel.clone().drop_guard();

    let lists = with_cancel(&cancel, state.supabase.favorite_lists(&session)).await?;
    Ok(HttpResponse::Ok().json(ListsResponse { lists }))
}

/// POST /api/v1/lists
///
/// Request body:
/// ```json
/// { "name": "Weekend Parks", "description": null, "is_public": false }
/// ```
async fn create_list(
    state: web::Data<AppState>,
    session: Session,
    req: web::Json<CreateListRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate().map_err(|e| ApiError::Validation(e.to_string()))?;

    let description = non_blank(req.description.as_deref());
    let list = state
        .supabase
        .create_list(&session, req.name.trim(), description.as_deref(), req.is_public)
        .await?;

    tracing::info!("User {} created list {}", session.user_id(), list.id);
    Ok(HttpResponse::Created().json(list))
}

/// DELETE /api/v1/lists/{id}
async fn delete_list(
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let list_id = path.into_inner();

    if !state.supabase.delete_list(&session, list_id).await? {
        return Err(ApiError::NotFound(format!("List {} not found", list_id)));
    }

    tracing::info!("User {} deleted list {}", session.user_id(), list_id);
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/v1/lists/{id}/locations
async fn get_list_locations(
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let list_id = path.into_inner();

    let cancel = state.request_token();
    let _guard = cancel.clone().drop_guard();

    let locations = with_cancel(&cancel, state.supabase.list_members(&session, list_id)).await?;
    Ok(HttpResponse::Ok().json(ListLocationsResponse { list_id, locations }))
}

/// Add a location to a list
///
/// POST /api/v1/lists/{id}/locations
///
/// A location that is already on the list yields 409 `already_in_list`,
/// meant to be shown to the user as a notice.
async fn add_to_list(
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<Uuid>,
    req: web::Json<AddToListRequest>,
) -> Result<HttpResponse, ApiError> {
    let list_id = path.into_inner();

    let membership = match state
        .supabase
        .add_to_list(&session, list_id, req.location_id)
        .await
    {
        Ok(m) => m,
        Err(SupabaseError::Conflict(_)) => {
            tracing::debug!("Location {} already in list {}", req.location_id, list_id);
            return Err(ApiError::AlreadyInList);
        }
        Err(e) => return Err(e.into()),
    };

    Ok(HttpResponse::Created().json(MembershipResponse {
        membership,
        message: "Location added to list!".to_string(),
    }))
}

/// DELETE /api/v1/lists/{id}/locations/{location_id}
async fn remove_from_list(
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, ApiError> {
    let (list_id, location_id) = path.into_inner();

    state
        .supabase
        .remove_from_list(&session, list_id, location_id)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}
