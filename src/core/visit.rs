//! Visit history queries.
//!
//! Visits are written only by the ledger; this module reads them back joined
//! with the customer and service names for display.

use crate::{
    entities::{Visit, customer, service, visit},
    errors::Result,
};
use chrono::{NaiveDate, NaiveTime};
use sea_orm::{FromQueryResult, JoinType, QueryOrder, QuerySelect, prelude::*};
use serde::Serialize;

/// A visit row with the names needed to show it in a list.
#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct VisitSummary {
    /// Visit id
    pub id: i64,
    /// Customer id
    pub customer_id: i64,
    /// Customer display name
    pub customer_name: String,
    /// Customer plate number
    pub plate_number: String,
    /// Service name
    pub service_name: String,
    /// Visit date
    pub visit_date: NaiveDate,
    /// Visit time
    pub visit_time: NaiveTime,
    /// Amount charged
    pub amount_paid: f64,
    /// Payment method tag
    pub payment_method: String,
    /// Whether the visit was a reward redemption
    pub is_reward: bool,
}

fn summary_query() -> Select<Visit> {
    Visit::find()
        .select_only()
        .column(visit::Column::Id)
        .column(visit::Column::CustomerId)
        .column_as(customer::Column::Name, "customer_name")
        .column(customer::Column::PlateNumber)
        .column_as(service::Column::Name, "service_name")
        .column(visit::Column::VisitDate)
        .column(visit::Column::VisitTime)
        .column(visit::Column::AmountPaid)
        .column(visit::Column::PaymentMethod)
        .column(visit::Column::IsReward)
        .join(JoinType::InnerJoin, visit::Relation::Customer.def())
        .join(JoinType::InnerJoin, visit::Relation::Service.def())
}

/// Returns a customer's visits, newest first.
pub async fn visits_for_customer(
    db: &DatabaseConnection,
    customer_id: i64,
) -> Result<Vec<VisitSummary>> {
    summary_query()
        .filter(visit::Column::CustomerId.eq(customer_id))
        .order_by_desc(visit::Column::Id)
        .into_model::<VisitSummary>()
        .all(db)
        .await
        .map_err(Into::into)
}

/// Returns the most recent visits across all customers, newest first.
pub async fn recent_visits(db: &DatabaseConnection, limit: u64) -> Result<Vec<VisitSummary>> {
    summary_query()
        .order_by_desc(visit::Column::Id)
        .limit(limit)
        .into_model::<VisitSummary>()
        .all(db)
        .await
        .map_err(Into::into)
}
