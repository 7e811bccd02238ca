//! Visit ledger - Applies a check-in to a customer's running totals.
//!
//! A visit either charges the service price and earns one loyalty point, or is
//! a reward redemption that costs nothing and spends [`LOYALTY_THRESHOLD`]
//! points. Recording a visit appends the immutable visit row and updates the
//! customer's `visit_count`, `total_spent`, `loyalty_points` and
//! `last_visit_date` inside one database transaction: both writes land or
//! neither does.
//!
//! The aggregate update is a single `UPDATE ... SET col = col + ?` statement,
//! so two concurrent check-ins for the same customer are serialized by the
//! database rather than racing on values read into memory.

use crate::{
    entities::{Customer, Service, customer, visit},
    errors::{Error, Result},
};
use chrono::{Local, NaiveDateTime};
use sea_orm::{
    Set, TransactionTrait,
    prelude::*,
    sea_query::{Expr, SimpleExpr},
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{info, instrument, warn};

/// Paid visits needed to earn one free wash, and the points a redemption spends.
pub const LOYALTY_THRESHOLD: i32 = 10;

/// Payment method recorded when the caller does not name one.
pub const DEFAULT_PAYMENT_METHOD: &str = "Cash";

/// How the ledger treats a reward request from a customer below the threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardPolicy {
    /// Reject the redemption with [`Error::InsufficientPoints`].
    #[default]
    Strict,
    /// Accept the redemption and floor the points at zero.
    Lenient,
}

impl FromStr for RewardPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            other => Err(Error::Config {
                message: format!("Unknown reward policy '{other}' (expected strict or lenient)"),
            }),
        }
    }
}

/// A check-in as submitted by the front desk.
#[derive(Debug, Clone, Deserialize)]
pub struct VisitRequest {
    /// Customer being served
    pub customer_id: i64,
    /// Service performed
    pub service_id: i64,
    /// Payment method tag, `"Cash"` when absent or blank
    #[serde(default)]
    pub payment_method: Option<String>,
    /// Whether this visit redeems a free wash
    #[serde(default)]
    pub is_reward: bool,
}

/// What a visit costs and what it does to the loyalty balance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisitCharge {
    /// Amount to charge
    pub amount: f64,
    /// Loyalty points after the visit
    pub new_points: i32,
}

/// The customer after the visit, and the visit that was recorded.
#[derive(Debug, Clone, Serialize)]
pub struct VisitOutcome {
    /// Customer with updated aggregates
    pub customer: customer::Model,
    /// Newly appended visit
    pub visit: visit::Model,
}

/// Computes the charge and the resulting loyalty balance for one visit.
///
/// A reward visit is free and spends [`LOYALTY_THRESHOLD`] points, never going
/// below zero; any other visit charges `price` and earns one point.
///
/// The ledger charges `amount`. `new_points` is a preview: the stored balance
/// is updated in SQL by the same rule.
#[must_use]
pub fn compute_charge(loyalty_points: i32, price: f64, is_reward: bool) -> VisitCharge {
    if is_reward {
        VisitCharge {
            amount: 0.0,
            new_points: (loyalty_points - LOYALTY_THRESHOLD).max(0),
        }
    } else {
        VisitCharge {
            amount: price,
            new_points: loyalty_points + 1,
        }
    }
}

/// The `loyalty_points` column expression applied by the ledger's `UPDATE`.
///
/// This is [`compute_charge`]'s points rule evaluated against the stored
/// balance, so the new value never depends on a balance read earlier in the
/// transaction. The two must stay in step.
fn points_update_expr(is_reward: bool) -> SimpleExpr {
    let points = Expr::col(customer::Column::LoyaltyPoints);
    if is_reward {
        Expr::case(points.clone().lt(LOYALTY_THRESHOLD), 0)
            .finally(points.sub(LOYALTY_THRESHOLD))
            .into()
    } else {
        points.add(1)
    }
}

/// Whether a customer holding `loyalty_points` may redeem a free wash.
#[must_use]
pub const fn is_reward_eligible(loyalty_points: i32) -> bool {
    loyalty_points >= LOYALTY_THRESHOLD
}

fn payment_method_or_default(method: Option<&str>) -> String {
    method
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_PAYMENT_METHOD)
        .to_string()
}

/// Records a visit stamped with the current local date and time.
pub async fn record_visit(
    db: &DatabaseConnection,
    request: VisitRequest,
    policy: RewardPolicy,
) -> Result<VisitOutcome> {
    record_visit_at(db, request, policy, Local::now().naive_local()).await
}

/// Records a visit that happened at `now`.
///
/// Fails with [`Error::CustomerNotFound`] or [`Error::ServiceNotFound`] for
/// unknown ids, [`Error::ServiceInactive`] for a retired service, and, under
/// [`RewardPolicy::Strict`], [`Error::InsufficientPoints`] for a redemption
/// below the threshold. Every failure leaves the customer and the visit log
/// unchanged.
#[instrument(skip(db, request), fields(customer_id = request.customer_id, service_id = request.service_id, is_reward = request.is_reward))]
pub async fn record_visit_at(
    db: &DatabaseConnection,
    request: VisitRequest,
    policy: RewardPolicy,
    now: NaiveDateTime,
) -> Result<VisitOutcome> {
    let txn = db.begin().await?;

    let outcome = match apply_visit(&txn, &request, policy, now).await {
        Ok(outcome) => outcome,
        Err(e) => {
            txn.rollback().await?;
            return Err(e);
        }
    };

    txn.commit().await?;

    if outcome.visit.is_reward {
        info!(
            "Loyalty reward redeemed for '{}' ({} points left)",
            outcome.customer.name, outcome.customer.loyalty_points
        );
    } else {
        info!(
            "Check-in complete for '{}': {:.2} via {}",
            outcome.customer.name, outcome.visit.amount_paid, outcome.visit.payment_method
        );
    }

    Ok(outcome)
}

async fn apply_visit<C>(
    txn: &C,
    request: &VisitRequest,
    policy: RewardPolicy,
    now: NaiveDateTime,
) -> Result<VisitOutcome>
where
    C: ConnectionTrait,
{
    let customer = Customer::find_by_id(request.customer_id)
        .one(txn)
        .await?
        .ok_or(Error::CustomerNotFound {
            id: request.customer_id,
        })?;

    let service = Service::find_by_id(request.service_id)
        .one(txn)
        .await?
        .ok_or(Error::ServiceNotFound {
            id: request.service_id,
        })?;

    if !service.is_active {
        warn!("Check-in refused: service '{}' is inactive", service.name);
        return Err(Error::ServiceInactive { name: service.name });
    }

    let enforce_threshold = request.is_reward && policy == RewardPolicy::Strict;
    if enforce_threshold && !is_reward_eligible(customer.loyalty_points) {
        warn!(
            "Reward refused for customer {}: {} points",
            customer.id, customer.loyalty_points
        );
        return Err(Error::InsufficientPoints {
            points: customer.loyalty_points,
            required: LOYALTY_THRESHOLD,
        });
    }

    let charge = compute_charge(customer.loyalty_points, service.price, request.is_reward);
    let today = now.date();

    let mut update = Customer::update_many()
        .col_expr(
            customer::Column::VisitCount,
            Expr::col(customer::Column::VisitCount).add(1),
        )
        .col_expr(
            customer::Column::TotalSpent,
            Expr::col(customer::Column::TotalSpent).add(charge.amount),
        )
        .col_expr(customer::Column::LoyaltyPoints, points_update_expr(request.is_reward))
        .col_expr(customer::Column::LastVisitDate, Expr::value(today))
        .filter(customer::Column::Id.eq(customer.id));

    // Re-check eligibility in the same statement that spends the points.
    if enforce_threshold {
        update = update.filter(customer::Column::LoyaltyPoints.gte(LOYALTY_THRESHOLD));
    }

    let updated = update.exec(txn).await?;
    if updated.rows_affected == 0 {
        return Err(Error::InsufficientPoints {
            points: customer.loyalty_points,
            required: LOYALTY_THRESHOLD,
        });
    }

    let visit = visit::ActiveModel {
        customer_id: Set(customer.id),
        service_id: Set(service.id),
        visit_date: Set(today),
        visit_time: Set(now.time()),
        amount_paid: Set(charge.amount),
        payment_method: Set(payment_method_or_default(request.payment_method.as_deref())),
        is_reward: Set(request.is_reward),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    let customer = Customer::find_by_id(customer.id)
        .one(txn)
        .await?
        .ok_or(Error::CustomerNotFound { id: customer.id })?;

    Ok(VisitOutcome { customer, visit })
}
