//! Service catalog routes.

use crate::{
    api::AppState,
    core::service::{self, ServiceInput},
    entities,
    errors::Result,
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
};
use serde::Deserialize;

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/api/services", get(list).post(create))
        .route("/api/services/{id}", put(update).delete(delete))
        .route("/api/services/{id}/active", put(set_active))
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ListQuery {
    /// Only services offered at check-in
    #[serde(default)]
    active: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct ActiveToggle {
    is_active: bool,
}

/// GET /api/services?active=true
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<entities::service::Model>>> {
    let services = if query.active {
        service::list_active_services(&state.db).await?
    } else {
        service::list_services(&state.db).await?
    };
    Ok(Json(services))
}

/// POST /api/services
async fn create(
    State(state): State<AppState>,
    Json(input): Json<ServiceInput>,
) -> Result<(StatusCode, Json<entities::service::Model>)> {
    let created = service::create_service(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/services/{id}
async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<ServiceInput>,
) -> Result<Json<entities::service::Model>> {
    let updated = service::update_service(&state.db, id, input).await?;
    Ok(Json(updated))
}

/// PUT /api/services/{id}/active
async fn set_active(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(toggle): Json<ActiveToggle>,
) -> Result<Json<entities::service::Model>> {
    let updated = service::set_service_active(&state.db, id, toggle.is_active).await?;
    Ok(Json(updated))
}

/// DELETE /api/services/{id} - refused while visits reference the service
async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    service::delete_service(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
