use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::core::models::plan::Plan;

/// Days an additional credit purchase stays valid unless stated otherwise.
pub const DEFAULT_VALIDITY_DAYS: i64 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Active,
    Used,
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Used => write!(f, "used"),
        }
    }
}

/// A block of credits bought on top of the plan allowance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionalCreditBatch {
    pub id: String,
    pub amount: i64,
    /// Price paid in dollars
    pub price: f64,
    pub purchase_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub status: BatchStatus,
}

impl AdditionalCreditBatch {
    pub fn is_active(&self) -> bool {
        self.status == BatchStatus::Active
    }
}

/// The account's subscription as the dashboard sees it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionState {
    #[serde(default)]
    pub current_plan: Option<String>,
    /// Monthly plan price in dollars
    #[serde(default)]
    pub plan_price: f64,
    /// Batches in purchase order; consumption follows this order.
    #[serde(default)]
    pub additional_credits: Vec<AdditionalCreditBatch>,
    /// Cumulative additional credits consumed across all batches
    #[serde(default)]
    pub used_additional_credits: i64,
}

impl SubscriptionState {
    /// Demo subscription used when nothing is stored or fetched.
    pub fn sample(today: NaiveDate) -> Self {
        let mut state = Self::default();
        state.set_plan(Plan::FamilyPlus);
        state.purchase_additional(500, 40.0, today - Duration::days(20), DEFAULT_VALIDITY_DAYS);
        state
    }

    pub fn plan(&self) -> Option<Plan> {
        self.current_plan.as_deref().and_then(Plan::from_name)
    }

    /// Switch plans, taking the price from the catalog.
    pub fn set_plan(&mut self, plan: Plan) {
        self.current_plan = Some(plan.display_name().to_string());
        self.plan_price = plan.monthly_price();
    }

    /// Record a purchase of `amount` credits and return the new batch id.
    ///
    /// `None` when the expiry date falls outside the calendar; nothing is recorded.
    pub fn purchase_additional(
        &mut self,
        amount: i64,
        price: f64,
        purchased_on: NaiveDate,
        validity_days: i64,
    ) -> Option<String> {
        let expiry_date = purchased_on.checked_add_signed(Duration::try_days(validity_days)?)?;
        let id = format!(
            "batch-{}-{}",
            purchased_on.format("%Y%m%d"),
            self.additional_credits.len() + 1
        );
        self.additional_credits.push(AdditionalCreditBatch {
            id: id.clone(),
            amount,
            price,
            purchase_date: purchased_on,
            expiry_date,
            status: BatchStatus::Active,
        });
        Some(id)
    }

    /// Add `credits` to the consumption counter and retire every batch the
    /// counter now fully covers. Returns the ids of batches that flipped to used.
    ///
    /// Coverage is cumulative in purchase order: with batches of 200 and 300,
    /// the second retires once the counter reaches 500. Used batches stay used.
    pub fn consume_additional(&mut self, credits: i64) -> Vec<String> {
        self.used_additional_credits = self.used_additional_credits.saturating_add(credits);
        let consumed = self.used_additional_credits;

        let mut covered: i64 = 0;
        let mut retired = Vec::new();
        for batch in &mut self.additional_credits {
            covered = covered.saturating_add(batch.amount);
            if batch.is_active() && consumed >= covered {
                batch.status = BatchStatus::Used;
                retired.push(batch.id.clone());
            }
        }
        retired
    }

    /// Sum of credits across active batches.
    pub fn active_additional_total(&self) -> i64 {
        self.additional_credits
            .iter()
            .filter(|b| b.is_active())
            .fold(0, |total: i64, b| total.saturating_add(b.amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn set_plan_uses_catalog_price() {
        let mut state = SubscriptionState::default();
        state.set_plan(Plan::Business);
        assert_eq!(state.current_plan.as_deref(), Some("Business"));
        assert!((state.plan_price - 299.0).abs() < 1e-10);
        assert_eq!(state.plan(), Some(Plan::Business));
    }

    #[test]
    fn purchase_sets_expiry_and_status() {
        let mut state = SubscriptionState::default();
        let id = state.purchase_additional(250, 20.0, day(2026, 1, 10), 30).unwrap();
        let batch = &state.additional_credits[0];
        assert_eq!(batch.id, id);
        assert_eq!(batch.expiry_date, day(2026, 2, 9));
        assert_eq!(batch.status, BatchStatus::Active);
        assert_eq!(state.active_additional_total(), 250);
    }

    #[test]
    fn purchase_with_out_of_range_expiry_is_rejected() {
        let mut state = SubscriptionState::default();
        assert!(state
            .purchase_additional(100, 0.0, day(2026, 10, 19), 100_000_000)
            .is_none());
        assert!(state
            .purchase_additional(100, 0.0, day(2026, 10, 19), i64::MAX)
            .is_none());
        assert!(state.additional_credits.is_empty());
    }

    #[test]
    fn huge_amounts_saturate_instead_of_overflowing() {
        let mut state = SubscriptionState::default();
        state.purchase_additional(i64::MAX, 0.0, day(2026, 3, 1), 365);
        state.purchase_additional(i64::MAX, 0.0, day(2026, 3, 2), 365);
        assert_eq!(state.active_additional_total(), i64::MAX);

        state.consume_additional(i64::MAX);
        state.consume_additional(i64::MAX);
        assert_eq!(state.used_additional_credits, i64::MAX);
        assert_eq!(state.additional_credits[0].status, BatchStatus::Used);
        assert_eq!(state.additional_credits[1].status, BatchStatus::Used);
    }

    #[test]
    fn batch_retires_exactly_at_its_amount() {
        let mut state = SubscriptionState::default();
        state.purchase_additional(200, 16.0, day(2026, 3, 1), 365);

        let retired = state.consume_additional(199);
        assert!(retired.is_empty());
        assert_eq!(state.additional_credits[0].status, BatchStatus::Active);

        let retired = state.consume_additional(1);
        assert_eq!(retired.len(), 1);
        assert_eq!(state.additional_credits[0].status, BatchStatus::Used);
        assert_eq!(state.used_additional_credits, 200);
    }

    #[test]
    fn consumption_is_cumulative_in_purchase_order() {
        let mut state = SubscriptionState::default();
        state.purchase_additional(200, 16.0, day(2026, 3, 1), 365);
        state.purchase_additional(300, 24.0, day(2026, 3, 2), 365);

        state.consume_additional(450);
        assert_eq!(state.additional_credits[0].status, BatchStatus::Used);
        assert_eq!(state.additional_credits[1].status, BatchStatus::Active);

        state.consume_additional(50);
        assert_eq!(state.additional_credits[1].status, BatchStatus::Used);
        assert_eq!(state.active_additional_total(), 0);
    }

    #[test]
    fn used_batches_never_reactivate() {
        let mut state = SubscriptionState::default();
        state.purchase_additional(100, 8.0, day(2026, 3, 1), 365);
        state.consume_additional(100);
        state.consume_additional(-50);
        assert_eq!(state.additional_credits[0].status, BatchStatus::Used);
    }

    #[test]
    fn sample_has_plan_and_one_batch() {
        let state = SubscriptionState::sample(day(2026, 5, 15));
        assert_eq!(state.plan(), Some(Plan::FamilyPlus));
        assert_eq!(state.additional_credits.len(), 1);
        assert_eq!(state.active_additional_total(), 500);
    }

    #[test]
    fn deserialize_minimal_state() {
        let state: SubscriptionState = serde_json::from_str("{}").unwrap();
        assert!(state.current_plan.is_none());
        assert!(state.additional_credits.is_empty());
        assert_eq!(state.used_additional_credits, 0);
    }
}
