//! Shared test utilities for `SafiWash`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test customers, services and visits with sensible defaults.

use crate::{
    core::{
        customer::{self, CustomerProfile},
        ledger::{RewardPolicy, VisitOutcome, VisitRequest, record_visit},
        service::{self, ServiceInput},
    },
    entities::{self, Customer},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{Set, prelude::*};
use tempfile::TempDir;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a file-backed `SQLite` database in a fresh temporary directory.
///
/// Unlike [`setup_test_db`], the pool holds several connections, so
/// concurrent operations really run side by side. Keep the returned
/// directory alive for as long as the connection is used.
pub async fn setup_file_db() -> Result<(TempDir, DatabaseConnection)> {
    let dir = tempfile::tempdir()?;
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("safiwash.sqlite").display());
    let db = crate::config::database::create_connection(&url).await?;
    crate::config::database::create_tables(&db).await?;
    Ok((dir, db))
}

/// Installs a test subscriber so `tracing` output shows up under `--nocapture`.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("safiwash=debug")
        .try_init();
}

/// Builds a profile with no car model or notes.
pub fn profile(name: &str, phone: &str, plate_number: &str) -> CustomerProfile {
    CustomerProfile {
        name: name.to_string(),
        phone: phone.to_string(),
        plate_number: plate_number.to_string(),
        car_model: None,
        notes: None,
    }
}

/// Registers a test customer identified by `phone`.
///
/// # Defaults
/// * `name`: `"Customer <phone>"`
/// * `plate_number`: `"KAA <last four digits of phone>"`
pub async fn create_test_customer(
    db: &DatabaseConnection,
    phone: &str,
) -> Result<entities::customer::Model> {
    let suffix = &phone[phone.len().saturating_sub(4)..];
    customer::register_customer(
        db,
        profile(&format!("Customer {phone}"), phone, &format!("KAA {suffix}")),
    )
    .await
}

/// Creates a test service with sensible defaults.
///
/// # Defaults
/// * price: 350.0
/// * `duration_minutes`: 30
pub async fn create_test_service(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::service::Model> {
    create_custom_service(db, name, 350.0).await
}

/// Creates a test service with custom price.
pub async fn create_custom_service(
    db: &DatabaseConnection,
    name: &str,
    price: f64,
) -> Result<entities::service::Model> {
    service::create_service(
        db,
        ServiceInput {
            name: name.to_string(),
            description: None,
            price,
            duration_minutes: 30,
        },
    )
    .await
}

/// Records a paid visit under the strict policy at the current time.
pub async fn record_test_visit(
    db: &DatabaseConnection,
    customer_id: i64,
    service_id: i64,
) -> Result<VisitOutcome> {
    record_visit(
        db,
        VisitRequest {
            customer_id,
            service_id,
            payment_method: None,
            is_reward: false,
        },
        RewardPolicy::Strict,
    )
    .await
}

/// Re-reads a customer, failing if it no longer exists.
pub async fn reload_customer(
    db: &DatabaseConnection,
    customer_id: i64,
) -> Result<entities::customer::Model> {
    Customer::find_by_id(customer_id)
        .one(db)
        .await?
        .ok_or(Error::CustomerNotFound { id: customer_id })
}

/// Overwrites a customer's loyalty points directly, bypassing the ledger.
/// Returns the updated row.
pub async fn set_customer_points(
    db: &DatabaseConnection,
    customer_id: i64,
    points: i32,
) -> Result<entities::customer::Model> {
    entities::customer::ActiveModel {
        id: Set(customer_id),
        loyalty_points: Set(points),
        ..Default::default()
    }
    .update(db)
    .await
    .map_err(Into::into)
}

/// Overwrites a customer's last visit date directly, bypassing the ledger.
pub async fn set_last_visit(
    db: &DatabaseConnection,
    customer_id: i64,
    date: NaiveDate,
) -> Result<entities::customer::Model> {
    entities::customer::ActiveModel {
        id: Set(customer_id),
        last_visit_date: Set(Some(date)),
        ..Default::default()
    }
    .update(db)
    .await
    .map_err(Into::into)
}

/// Sets up a complete test environment with one customer.
/// Returns (db, customer) for common test scenarios.
pub async fn setup_with_customer() -> Result<(DatabaseConnection, entities::customer::Model)> {
    let db = setup_test_db().await?;
    let customer = create_test_customer(&db, "0712345678").await?;
    Ok((db, customer))
}

/// Sets up a complete test environment with a customer and a 350.0 service.
/// Returns (db, customer, service) for visit-related tests.
pub async fn setup_with_customer_and_service() -> Result<(
    DatabaseConnection,
    entities::customer::Model,
    entities::service::Model,
)> {
    let db = setup_test_db().await?;
    let customer = create_test_customer(&db, "0712345678").await?;
    let service = create_test_service(&db, "Standard Wash").await?;
    Ok((db, customer, service))
}
