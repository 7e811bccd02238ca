//! Customer routes.

use crate::{
    api::AppState,
    core::{
        customer::{self, CustomerProfile},
        ledger::is_reward_eligible,
        visit::{VisitSummary, visits_for_customer},
    },
    entities,
    errors::{Error, Result},
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};

/// Shortest query the quick lookup answers.
const QUICK_SEARCH_MIN_CHARS: usize = 2;

/// Most results the quick lookup returns.
const QUICK_SEARCH_LIMIT: u64 = 10;

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/api/customers", get(list).post(create))
        .route(
            "/api/customers/{id}",
            get(get_by_id).put(update).delete(delete),
        )
        .route("/api/customer/search", get(quick_search))
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ListQuery {
    #[serde(default)]
    search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct SearchQuery {
    #[serde(default)]
    q: String,
}

/// A customer with their visit history.
#[derive(Debug, Serialize)]
pub(super) struct CustomerDetail {
    #[serde(flatten)]
    customer: entities::customer::Model,
    reward_eligible: bool,
    visits: Vec<VisitSummary>,
}

/// GET /api/customers?search= - all customers, or those matching `search`
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<entities::customer::Model>>> {
    let customers = match query.search.as_deref().map(str::trim) {
        Some(search) if !search.is_empty() => {
            customer::search_customers(&state.db, search, None).await?
        }
        _ => customer::list_customers(&state.db).await?,
    };
    Ok(Json(customers))
}

/// GET /api/customer/search?q= - type-ahead lookup for the check-in form
async fn quick_search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<entities::customer::Model>>> {
    let q = query.q.trim();
    if q.chars().count() < QUICK_SEARCH_MIN_CHARS {
        return Ok(Json(Vec::new()));
    }

    let customers = customer::search_customers(&state.db, q, Some(QUICK_SEARCH_LIMIT)).await?;
    Ok(Json(customers))
}

/// POST /api/customers
async fn create(
    State(state): State<AppState>,
    Json(profile): Json<CustomerProfile>,
) -> Result<(StatusCode, Json<entities::customer::Model>)> {
    let created = customer::register_customer(&state.db, profile).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/customers/{id}
async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CustomerDetail>> {
    let customer = customer::get_customer_by_id(&state.db, id)
        .await?
        .ok_or(Error::CustomerNotFound { id })?;
    let visits = visits_for_customer(&state.db, id).await?;

    Ok(Json(CustomerDetail {
        reward_eligible: is_reward_eligible(customer.loyalty_points),
        customer,
        visits,
    }))
}

/// PUT /api/customers/{id}
async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(profile): Json<CustomerProfile>,
) -> Result<Json<entities::customer::Model>> {
    let updated = customer::update_customer(&state.db, id, profile).await?;
    Ok(Json(updated))
}

/// DELETE /api/customers/{id} - removes the customer and their visits
async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    customer::delete_customer(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
