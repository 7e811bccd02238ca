//! Check-in route: the only way visits enter the ledger over HTTP.

use crate::{
    api::AppState,
    core::ledger::{VisitOutcome, VisitRequest, record_visit},
    errors::Result,
};
use axum::{Json, Router, extract::State, http::StatusCode, routing::post};

pub(super) fn router() -> Router<AppState> {
    Router::new().route("/api/checkin", post(check_in))
}

/// POST /api/checkin
async fn check_in(
    State(state): State<AppState>,
    Json(request): Json<VisitRequest>,
) -> Result<(StatusCode, Json<VisitOutcome>)> {
    let outcome = record_visit(&state.db, request, state.settings.reward_policy).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}
