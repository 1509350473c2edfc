use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::models::subscription::AdditionalCreditBatch;

/// Plan allowance for the period. `used + remaining == monthly`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanCredits {
    /// Plan name as stored on the subscription
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub monthly: i64,
    pub used: i64,
    pub remaining: i64,
}

/// Purchased credits on top of the plan. `used + remaining == total`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionalCredits {
    /// Sum of active batch amounts
    pub total: i64,
    pub used: i64,
    pub remaining: i64,
    /// Active batches in purchase order
    pub batches: Vec<AdditionalCreditBatch>,
    /// Active batches expiring within the warning window
    pub expiring: Vec<AdditionalCreditBatch>,
}

impl AdditionalCredits {
    pub fn expiring_amount(&self) -> i64 {
        self.expiring
            .iter()
            .fold(0, |total: i64, b| total.saturating_add(b.amount))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalCredits {
    pub available: i64,
    pub used: i64,
    pub remaining: i64,
    /// `used / available * 100`, or 0 when nothing is available
    pub usage_percentage: f64,
}

/// Cost estimate for the current period, in dollars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingEstimate {
    pub plan_price: f64,
    pub overage_credits: i64,
    pub overage_rate: f64,
    pub overage_cost: f64,
    pub estimated_cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub reset_date: NaiveDate,
}

/// Reconciled credit picture for one account in one billing period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegratedCreditView {
    pub account_id: String,
    pub plan_credits: PlanCredits,
    pub additional_credits: AdditionalCredits,
    pub total_credits: TotalCredits,
    pub billing: BillingEstimate,
    pub period: BillingPeriod,
}
