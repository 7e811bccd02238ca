//! Customer entity - A registered car wash customer and their running totals.
//!
//! The phone number is the customer's identity and is unique. `visit_count`,
//! `total_spent`, `loyalty_points` and `last_visit_date` are aggregates that only
//! the visit ledger writes.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Customer database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    /// Unique identifier for the customer
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub name: String,
    /// Phone number, unique per customer
    #[sea_orm(unique)]
    pub phone: String,
    /// Vehicle registration plate, stored upper-case
    pub plate_number: String,
    /// Vehicle make/model (e.g., "Toyota Axio")
    pub car_model: Option<String>,
    /// Free-text notes
    pub notes: Option<String>,
    /// Date the customer was registered
    pub joined_date: Date,
    /// Number of visits recorded for this customer
    pub visit_count: i32,
    /// Sum of `amount_paid` across all visits
    pub total_spent: f64,
    /// Current loyalty balance, never negative
    pub loyalty_points: i32,
    /// Date of the most recent visit, None if never visited
    pub last_visit_date: Option<Date>,
}

/// Defines relationships between Customer and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One customer has many visits
    #[sea_orm(has_many = "super::visit::Entity")]
    Visits,
}

impl Related<super::visit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Visits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
