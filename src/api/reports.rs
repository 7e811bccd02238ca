//! Dashboard, reports and health routes.

use crate::{
    api::AppState,
    core::report::{self, Dashboard, ReportsOverview},
    errors::Result,
};
use axum::{Json, Router, extract::State, routing::get};
use chrono::Local;
use serde_json::{Value, json};

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/dashboard", get(dashboard))
        .route("/api/reports", get(reports))
}

/// GET /api/health
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /api/dashboard
async fn dashboard(State(state): State<AppState>) -> Result<Json<Dashboard>> {
    let today = Local::now().date_naive();
    Ok(Json(report::dashboard(&state.db, today).await?))
}

/// GET /api/reports
async fn reports(State(state): State<AppState>) -> Result<Json<ReportsOverview>> {
    let today = Local::now().date_naive();
    Ok(Json(report::reports_overview(&state.db, today).await?))
}
