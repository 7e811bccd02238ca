//! Service entity - An entry in the wash catalog.
//!
//! Inactive services are hidden from check-in but stay referenced by the visits
//! already recorded against them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Service database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "services")]
pub struct Model {
    /// Unique identifier for the service
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name shown at check-in (e.g., "Standard Wash")
    pub name: String,
    /// Optional longer description
    pub description: Option<String>,
    /// Price charged for a paid visit
    pub price: f64,
    /// Nominal duration of the service in minutes
    pub duration_minutes: i32,
    /// Whether the service is offered for new check-ins
    pub is_active: bool,
}

/// Defines relationships between Service and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One service is referenced by many visits
    #[sea_orm(has_many = "super::visit::Entity")]
    Visits,
}

impl Related<super::visit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Visits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
