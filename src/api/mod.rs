//! HTTP API for `SafiWash`.
//!
//! JSON routes over the core operations. Handlers are thin: they extract the
//! request, call one core function and serialize the result. Core errors turn
//! into responses through the `IntoResponse` impl in `error`.

mod checkin;
mod customers;
mod error;
mod reports;
mod services;

use crate::config::settings::Settings;
use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: DatabaseConnection,
    /// Runtime settings
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Bundles a connection with the settings it was opened from.
    pub fn new(db: DatabaseConnection, settings: Settings) -> Self {
        Self {
            db,
            settings: Arc::new(settings),
        }
    }
}

/// Builds the application router with request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(reports::router())
        .merge(customers::router())
        .merge(services::router())
        .merge(checkin::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
