//! Report generation business logic.
//!
//! Read-only aggregates over customers and visits: revenue by day, week and
//! month, revenue per service, loyalty statistics and the "at risk" list of
//! customers who have not been back for a while. All functions take the date
//! to report on explicitly and return structured data for the API layer to
//! serialize.

use crate::{
    core::{
        ledger::LOYALTY_THRESHOLD,
        visit::{VisitSummary, recent_visits},
    },
    entities::{Customer, Service, Visit, customer, service, visit},
    errors::Result,
};
use chrono::{Datelike, Duration, NaiveDate};
use sea_orm::{
    Condition, FromQueryResult, JoinType, PaginatorTrait, QueryOrder, QuerySelect,
    prelude::*,
    sea_query::{Expr, Func, SimpleExpr},
};
use serde::Serialize;

/// Days without a visit after which a customer counts as at risk.
pub const AT_RISK_DAYS: i64 = 14;

/// Price assumed per lost visit when no service is active.
pub const FALLBACK_VISIT_PRICE: f64 = 350.0;

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    /// Number of registered customers
    pub total_customers: u64,
    /// Visits recorded today
    pub visits_today: u64,
    /// Revenue taken today
    pub revenue_today: f64,
    /// Revenue from seven days before today through today
    pub revenue_week: f64,
    /// Revenue since the first of the month
    pub revenue_month: f64,
    /// Customers holding enough points for a free wash
    pub loyalty_due: u64,
    /// Customers absent for more than [`AT_RISK_DAYS`]
    pub at_risk_count: u64,
    /// At-risk customers multiplied by the mean active service price
    pub lost_revenue: f64,
}

/// Revenue for one calendar day.
#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct DailyRevenue {
    /// The day
    pub visit_date: NaiveDate,
    /// Visits recorded that day
    pub visit_count: i64,
    /// Sum of amounts paid that day
    pub total_revenue: f64,
}

/// Revenue attributed to one service.
#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct ServiceRevenue {
    /// Service id
    pub service_id: i64,
    /// Service name
    pub service_name: String,
    /// Visits for this service
    pub visit_count: i64,
    /// Sum of amounts paid for this service
    pub total_revenue: f64,
}

/// Loyalty programme summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoyaltyStats {
    /// Customers eligible for a free wash
    pub eligible_count: u64,
    /// Mean loyalty points across all customers, zero when there are none
    pub average_points: f64,
    /// Points needed for a free wash
    pub threshold: i32,
}

/// A customer who has not visited recently.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtRiskCustomer {
    /// The customer
    #[serde(flatten)]
    pub customer: customer::Model,
    /// Whole days since the last visit
    pub days_since_visit: i64,
}

/// Everything the dashboard shows.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    /// Headline numbers
    pub stats: DashboardStats,
    /// Ten most recent visits
    pub recent_visits: Vec<VisitSummary>,
    /// Five biggest spenders
    pub top_customers: Vec<customer::Model>,
    /// Up to ten customers absent the longest
    pub at_risk_customers: Vec<AtRiskCustomer>,
}

/// Everything the reports page shows.
#[derive(Debug, Clone, Serialize)]
pub struct ReportsOverview {
    /// Revenue per service, highest first
    pub revenue_by_service: Vec<ServiceRevenue>,
    /// Revenue per day over the last week, newest first
    pub revenue_daily: Vec<DailyRevenue>,
    /// Loyalty programme summary
    pub loyalty: LoyaltyStats,
}

fn at_risk_condition(today: NaiveDate, days: i64) -> Condition {
    let cutoff = today - Duration::days(days);
    Condition::all()
        .add(customer::Column::LastVisitDate.is_not_null())
        .add(customer::Column::LastVisitDate.lt(cutoff))
}

fn month_start(today: NaiveDate) -> NaiveDate {
    today.with_day(1).unwrap_or(today)
}

async fn sum_revenue(db: &DatabaseConnection, condition: Condition) -> Result<f64> {
    let total: Option<Option<f64>> = Visit::find()
        .select_only()
        .column_as(visit::Column::AmountPaid.sum(), "total")
        .filter(condition)
        .into_tuple()
        .one(db)
        .await?;
    Ok(total.flatten().unwrap_or(0.0))
}

/// Revenue taken between `from` and `to`, both days included.
pub async fn revenue_between(
    db: &DatabaseConnection,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<f64> {
    sum_revenue(
        db,
        Condition::all().add(visit::Column::VisitDate.between(from, to)),
    )
    .await
}

/// Revenue taken on `day`.
pub async fn revenue_on(db: &DatabaseConnection, day: NaiveDate) -> Result<f64> {
    revenue_between(db, day, day).await
}

/// Revenue taken on or after `since`.
pub async fn revenue_since(db: &DatabaseConnection, since: NaiveDate) -> Result<f64> {
    sum_revenue(db, Condition::all().add(visit::Column::VisitDate.gte(since))).await
}

/// Number of visits recorded on `day`.
pub async fn count_visits_on(db: &DatabaseConnection, day: NaiveDate) -> Result<u64> {
    Visit::find()
        .filter(visit::Column::VisitDate.eq(day))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Number of customers holding at least [`LOYALTY_THRESHOLD`] points.
pub async fn count_reward_eligible(db: &DatabaseConnection) -> Result<u64> {
    Customer::find()
        .filter(customer::Column::LoyaltyPoints.gte(LOYALTY_THRESHOLD))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Number of customers whose last visit is more than `days` before `today`.
///
/// Customers who have never visited are not counted.
pub async fn count_at_risk(db: &DatabaseConnection, today: NaiveDate, days: i64) -> Result<u64> {
    Customer::find()
        .filter(at_risk_condition(today, days))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Customers whose last visit is more than `days` before `today`, longest
/// absent first.
pub async fn at_risk_customers(
    db: &DatabaseConnection,
    today: NaiveDate,
    days: i64,
    limit: Option<u64>,
) -> Result<Vec<AtRiskCustomer>> {
    let mut select = Customer::find()
        .filter(at_risk_condition(today, days))
        .order_by_asc(customer::Column::LastVisitDate);

    if let Some(limit) = limit {
        select = select.limit(limit);
    }

    let customers = select.all(db).await?;
    Ok(customers
        .into_iter()
        .map(|customer| {
            let days_since_visit = customer
                .last_visit_date
                .map_or(0, |last| (today - last).num_days());
            AtRiskCustomer {
                customer,
                days_since_visit,
            }
        })
        .collect())
}

/// Visit count and revenue per day from `since` onwards, newest day first.
pub async fn revenue_by_day(
    db: &DatabaseConnection,
    since: NaiveDate,
) -> Result<Vec<DailyRevenue>> {
    Visit::find()
        .select_only()
        .column(visit::Column::VisitDate)
        .column_as(visit::Column::Id.count(), "visit_count")
        .column_as(visit::Column::AmountPaid.sum(), "total_revenue")
        .filter(visit::Column::VisitDate.gte(since))
        .group_by(visit::Column::VisitDate)
        .order_by_desc(visit::Column::VisitDate)
        .into_model::<DailyRevenue>()
        .all(db)
        .await
        .map_err(Into::into)
}

/// Visit count and revenue per service, highest revenue first.
///
/// Services without any visits are omitted.
pub async fn revenue_by_service(db: &DatabaseConnection) -> Result<Vec<ServiceRevenue>> {
    Visit::find()
        .select_only()
        .column_as(service::Column::Id, "service_id")
        .column_as(service::Column::Name, "service_name")
        .column_as(visit::Column::Id.count(), "visit_count")
        .column_as(visit::Column::AmountPaid.sum(), "total_revenue")
        .join(JoinType::InnerJoin, visit::Relation::Service.def())
        .group_by(service::Column::Id)
        .group_by(service::Column::Name)
        .order_by_desc(visit::Column::AmountPaid.sum())
        .order_by_asc(service::Column::Name)
        .into_model::<ServiceRevenue>()
        .all(db)
        .await
        .map_err(Into::into)
}

/// Reward eligibility count and mean points across all customers.
pub async fn loyalty_stats(db: &DatabaseConnection) -> Result<LoyaltyStats> {
    let eligible_count = count_reward_eligible(db).await?;

    let average: Option<Option<f64>> = Customer::find()
        .select_only()
        .column_as(
            SimpleExpr::from(Func::avg(Expr::col(customer::Column::LoyaltyPoints))),
            "average_points",
        )
        .into_tuple()
        .one(db)
        .await?;

    Ok(LoyaltyStats {
        eligible_count,
        average_points: average.flatten().unwrap_or(0.0),
        threshold: LOYALTY_THRESHOLD,
    })
}

/// Mean price of the active services, if any are active.
pub async fn average_active_price(db: &DatabaseConnection) -> Result<Option<f64>> {
    let average: Option<Option<f64>> = Service::find()
        .select_only()
        .column_as(
            SimpleExpr::from(Func::avg(Expr::col(service::Column::Price))),
            "average_price",
        )
        .filter(service::Column::IsActive.eq(true))
        .into_tuple()
        .one(db)
        .await?;
    Ok(average.flatten())
}

/// The biggest spenders, highest `total_spent` first.
pub async fn top_customers(db: &DatabaseConnection, limit: u64) -> Result<Vec<customer::Model>> {
    Customer::find()
        .order_by_desc(customer::Column::TotalSpent)
        .order_by_asc(customer::Column::Name)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Computes the dashboard headline numbers as of `today`.
pub async fn dashboard_stats(db: &DatabaseConnection, today: NaiveDate) -> Result<DashboardStats> {
    let at_risk_count = count_at_risk(db, today, AT_RISK_DAYS).await?;
    let visit_price = average_active_price(db)
        .await?
        .unwrap_or(FALLBACK_VISIT_PRICE);

    // Customer counts stay far below 2^52, so the conversion is exact.
    #[allow(clippy::cast_precision_loss)]
    let lost_revenue = at_risk_count as f64 * visit_price;

    Ok(DashboardStats {
        total_customers: Customer::find().count(db).await?,
        visits_today: count_visits_on(db, today).await?,
        revenue_today: revenue_on(db, today).await?,
        revenue_week: revenue_since(db, today - Duration::days(7)).await?,
        revenue_month: revenue_since(db, month_start(today)).await?,
        loyalty_due: count_reward_eligible(db).await?,
        at_risk_count,
        lost_revenue,
    })
}

/// Builds the full dashboard as of `today`.
pub async fn dashboard(db: &DatabaseConnection, today: NaiveDate) -> Result<Dashboard> {
    Ok(Dashboard {
        stats: dashboard_stats(db, today).await?,
        recent_visits: recent_visits(db, 10).await?,
        top_customers: top_customers(db, 5).await?,
        at_risk_customers: at_risk_customers(db, today, AT_RISK_DAYS, Some(10)).await?,
    })
}

/// Builds the reports page as of `today`.
pub async fn reports_overview(db: &DatabaseConnection, today: NaiveDate) -> Result<ReportsOverview> {
    Ok(ReportsOverview {
        revenue_by_service: revenue_by_service(db).await?,
        revenue_daily: revenue_by_day(db, today - Duration::days(7)).await?,
        loyalty: loyalty_stats(db).await?,
    })
}
