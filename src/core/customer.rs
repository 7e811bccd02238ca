//! Customer business logic - Registration, profile edits, lookup and deletion.
//!
//! Profile operations never touch the visit aggregates (`visit_count`,
//! `total_spent`, `loyalty_points`, `last_visit_date`); those belong to the
//! ledger. Phone numbers are unique, and a collision is reported as
//! [`Error::DuplicatePhone`] without writing anything.

use crate::{
    entities::{Customer, Visit, customer, visit},
    errors::{Error, Result},
};
use chrono::{Local, NaiveDate};
use sea_orm::{
    Condition, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait, prelude::*,
};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Profile fields supplied when registering or editing a customer.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerProfile {
    /// Display name
    pub name: String,
    /// Phone number (identity)
    pub phone: String,
    /// Vehicle plate
    pub plate_number: String,
    /// Vehicle model
    #[serde(default)]
    pub car_model: Option<String>,
    /// Free-text notes
    #[serde(default)]
    pub notes: Option<String>,
}

/// A profile after trimming and normalisation.
struct CleanProfile {
    name: String,
    phone: String,
    plate_number: String,
    car_model: Option<String>,
    notes: Option<String>,
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required_text(field: &'static str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid(field, format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn clean_profile(profile: CustomerProfile) -> Result<CleanProfile> {
    Ok(CleanProfile {
        name: required_text("name", &profile.name)?,
        phone: required_text("phone", &profile.phone)?,
        plate_number: required_text("plate_number", &profile.plate_number)?.to_uppercase(),
        car_model: optional_text(profile.car_model),
        notes: optional_text(profile.notes),
    })
}

/// Maps a unique-constraint violation on insert/update to `DuplicatePhone`.
fn map_unique_violation(err: DbErr, phone: &str) -> Error {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        Error::DuplicatePhone {
            phone: phone.to_string(),
        }
    } else {
        Error::Database(err)
    }
}

/// Registers a new customer joining today.
pub async fn register_customer(
    db: &DatabaseConnection,
    profile: CustomerProfile,
) -> Result<customer::Model> {
    register_customer_on(db, profile, Local::now().date_naive()).await
}

/// Registers a new customer with an explicit join date.
///
/// All visit aggregates start at zero. A phone number that is already taken
/// fails with [`Error::DuplicatePhone`].
pub async fn register_customer_on(
    db: &DatabaseConnection,
    profile: CustomerProfile,
    joined_date: NaiveDate,
) -> Result<customer::Model> {
    let profile = clean_profile(profile)?;

    if find_customer_by_phone(db, &profile.phone).await?.is_some() {
        warn!("Rejected registration: phone {} already exists", profile.phone);
        return Err(Error::DuplicatePhone {
            phone: profile.phone,
        });
    }

    let phone = profile.phone.clone();
    let customer = customer::ActiveModel {
        name: Set(profile.name),
        phone: Set(profile.phone),
        plate_number: Set(profile.plate_number),
        car_model: Set(profile.car_model),
        notes: Set(profile.notes),
        joined_date: Set(joined_date),
        visit_count: Set(0),
        total_spent: Set(0.0),
        loyalty_points: Set(0),
        last_visit_date: Set(None),
        ..Default::default()
    };

    let created = customer
        .insert(db)
        .await
        .map_err(|e| map_unique_violation(e, &phone))?;
    info!(
        "Registered customer '{}' ({}), plate {}",
        created.name, created.phone, created.plate_number
    );
    Ok(created)
}

/// Replaces the profile fields of an existing customer.
pub async fn update_customer(
    db: &DatabaseConnection,
    customer_id: i64,
    profile: CustomerProfile,
) -> Result<customer::Model> {
    let profile = clean_profile(profile)?;

    let existing = Customer::find_by_id(customer_id)
        .one(db)
        .await?
        .ok_or(Error::CustomerNotFound { id: customer_id })?;

    if let Some(other) = find_customer_by_phone(db, &profile.phone).await? {
        if other.id != customer_id {
            warn!(
                "Rejected update of customer {customer_id}: phone {} belongs to customer {}",
                profile.phone, other.id
            );
            return Err(Error::DuplicatePhone {
                phone: profile.phone,
            });
        }
    }

    let phone = profile.phone.clone();
    let mut active: customer::ActiveModel = existing.into();
    active.name = Set(profile.name);
    active.phone = Set(profile.phone);
    active.plate_number = Set(profile.plate_number);
    active.car_model = Set(profile.car_model);
    active.notes = Set(profile.notes);

    active
        .update(db)
        .await
        .map_err(|e| map_unique_violation(e, &phone))
}

/// Deletes a customer together with their visit history.
pub async fn delete_customer(db: &DatabaseConnection, customer_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let customer = Customer::find_by_id(customer_id)
        .one(&txn)
        .await?
        .ok_or(Error::CustomerNotFound { id: customer_id })?;

    let removed = Visit::delete_many()
        .filter(visit::Column::CustomerId.eq(customer_id))
        .exec(&txn)
        .await?;

    let name = customer.name.clone();
    customer.delete(&txn).await?;

    txn.commit().await?;
    info!(
        "Deleted customer '{name}' ({customer_id}) and {} visits",
        removed.rows_affected
    );
    Ok(())
}

/// Finds a customer by ID.
pub async fn get_customer_by_id(
    db: &DatabaseConnection,
    customer_id: i64,
) -> Result<Option<customer::Model>> {
    Customer::find_by_id(customer_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a customer by exact phone number (surrounding whitespace ignored).
pub async fn find_customer_by_phone(
    db: &DatabaseConnection,
    phone: &str,
) -> Result<Option<customer::Model>> {
    Customer::find()
        .filter(customer::Column::Phone.eq(phone.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds the first customer registered with this plate.
///
/// Plates are stored upper-case, so the lookup is case-insensitive.
pub async fn find_customer_by_plate(
    db: &DatabaseConnection,
    plate_number: &str,
) -> Result<Option<customer::Model>> {
    Customer::find()
        .filter(customer::Column::PlateNumber.eq(plate_number.trim().to_uppercase()))
        .order_by_asc(customer::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists every customer, most frequent visitors first.
pub async fn list_customers(db: &DatabaseConnection) -> Result<Vec<customer::Model>> {
    Customer::find()
        .order_by_desc(customer::Column::VisitCount)
        .order_by_asc(customer::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds customers whose name, phone or plate contains `query`.
///
/// Matching is a case-insensitive substring match (`SQLite` `LIKE`). Results
/// are ordered by visit count, most frequent first; `limit` caps how many are
/// returned.
pub async fn search_customers(
    db: &DatabaseConnection,
    query: &str,
    limit: Option<u64>,
) -> Result<Vec<customer::Model>> {
    let needle = query.trim();
    debug!("Searching customers for '{needle}'");

    let mut select = Customer::find()
        .filter(
            Condition::any()
                .add(customer::Column::Name.contains(needle))
                .add(customer::Column::Phone.contains(needle))
                .add(customer::Column::PlateNumber.contains(needle)),
        )
        .order_by_desc(customer::Column::VisitCount)
        .order_by_asc(customer::Column::Name);

    if let Some(limit) = limit {
        select = select.limit(limit);
    }

    select.all(db).await.map_err(Into::into)
}
