//! Visit entity - The append-only log of check-ins.
//!
//! Each visit has a `customer_id`, `service_id`, date and time, the amount actually
//! paid, a payment method tag and the `is_reward` flag. Visits are never updated;
//! they disappear only when their customer is deleted.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Visit database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "visits")]
pub struct Model {
    /// Unique identifier for the visit
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Customer who was served
    pub customer_id: i64,
    /// Service that was performed
    pub service_id: i64,
    /// Local date of the visit
    #[sea_orm(indexed)]
    pub visit_date: Date,
    /// Local time of the visit
    pub visit_time: Time,
    /// Amount charged; zero for reward visits
    pub amount_paid: f64,
    /// Payment method tag (e.g., `"Cash"`, `"M-Pesa"`)
    pub payment_method: String,
    /// Whether this visit was a loyalty redemption
    pub is_reward: bool,
}

/// Defines relationships between Visit and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each visit belongs to one customer
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id",
        on_delete = "Cascade"
    )]
    Customer,
    /// Each visit references one service
    #[sea_orm(
        belongs_to = "super::service::Entity",
        from = "Column::ServiceId",
        to = "super::service::Column::Id"
    )]
    Service,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Service.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
