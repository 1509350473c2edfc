use chrono::{Duration, NaiveDate};

use crate::core::credits::period::billing_period;
use crate::core::models::credits::{
    AdditionalCredits, BillingEstimate, IntegratedCreditView, PlanCredits, TotalCredits,
};
use crate::core::models::plan::{monthly_credits_for, overage_rate_for};
use crate::core::models::stats::DashboardStats;
use crate::core::models::subscription::{AdditionalCreditBatch, SubscriptionState};

/// Active batches expiring within this many days are flagged.
pub const EXPIRY_WARNING_DAYS: i64 = 30;

/// Merge plan allowance, purchased batches and period usage into one view.
///
/// Pure and total: inputs are trusted as-is, so a negative usage counter
/// flows straight through to the output. Credit arithmetic saturates at the
/// `i64` bounds.
///
/// Overage is measured against the plan allowance alone. Usage past the
/// allowance is reported as drawn from additional credits *and* billed as
/// overage; purchased credits do not reduce the overage charge.
pub fn calculate_integrated_credits(
    stats: &DashboardStats,
    subscription: &SubscriptionState,
    account_id: &str,
    today: NaiveDate,
) -> IntegratedCreditView {
    let plan_name = subscription.current_plan.as_deref();
    let plan_monthly = monthly_credits_for(plan_name);

    let active: Vec<AdditionalCreditBatch> = subscription
        .additional_credits
        .iter()
        .filter(|b| b.is_active())
        .cloned()
        .collect();
    let additional_total = active
        .iter()
        .fold(0, |total: i64, b| total.saturating_add(b.amount));

    let total_available = plan_monthly.saturating_add(additional_total);
    let total_used = stats.total_credits_used;

    let plan_used = total_used.min(plan_monthly);
    let additional_used = total_used.saturating_sub(plan_monthly).max(0);

    let overage_credits = total_used.saturating_sub(plan_monthly).max(0);
    let overage_rate = overage_rate_for(plan_name);
    let overage_cost = overage_credits as f64 * overage_rate;

    let usage_percentage = if total_available == 0 {
        0.0
    } else {
        total_used as f64 * 100.0 / total_available as f64
    };

    let expiring = expiring_batches(&active, today);

    IntegratedCreditView {
        account_id: account_id.to_string(),
        plan_credits: PlanCredits {
            name: subscription.current_plan.clone(),
            monthly: plan_monthly,
            used: plan_used,
            remaining: plan_monthly.saturating_sub(plan_used),
        },
        additional_credits: AdditionalCredits {
            total: additional_total,
            used: additional_used,
            remaining: additional_total.saturating_sub(additional_used),
            batches: active,
            expiring,
        },
        total_credits: TotalCredits {
            available: total_available,
            used: total_used,
            remaining: total_available.saturating_sub(total_used),
            usage_percentage,
        },
        billing: BillingEstimate {
            plan_price: subscription.plan_price,
            overage_credits,
            overage_rate,
            overage_cost,
            estimated_cost: subscription.plan_price + overage_cost,
        },
        period: billing_period(today),
    }
}

fn expiring_batches(active: &[AdditionalCreditBatch], today: NaiveDate) -> Vec<AdditionalCreditBatch> {
    let horizon = today + Duration::days(EXPIRY_WARNING_DAYS);
    active
        .iter()
        .filter(|b| b.expiry_date >= today && b.expiry_date <= horizon)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::plan::Plan;
    use crate::core::models::subscription::BatchStatus;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn stats(used: i64) -> DashboardStats {
        DashboardStats {
            total_credits_used: used,
            ..Default::default()
        }
    }

    fn subscription(plan: Option<Plan>, batches: &[i64]) -> SubscriptionState {
        let mut state = SubscriptionState::default();
        if let Some(plan) = plan {
            state.set_plan(plan);
        }
        for amount in batches {
            state.purchase_additional(*amount, 0.0, today() - Duration::days(10), 365);
        }
        state
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn family_plus_with_overage() {
        let sub = subscription(Some(Plan::FamilyPlus), &[500]);
        let view = calculate_integrated_credits(&stats(1800), &sub, "acct-1", today());

        assert_eq!(view.plan_credits.monthly, 1500);
        assert_eq!(view.plan_credits.used, 1500);
        assert_eq!(view.plan_credits.remaining, 0);
        assert_eq!(view.additional_credits.total, 500);
        assert_eq!(view.additional_credits.used, 300);
        assert_eq!(view.additional_credits.remaining, 200);
        assert_eq!(view.total_credits.available, 2000);
        assert_eq!(view.billing.overage_credits, 300);
        assert!(approx(view.billing.overage_cost, 24.0));
        assert!(approx(view.billing.estimated_cost, 123.0));
        assert!(approx(view.total_credits.usage_percentage, 90.0));
    }

    #[test]
    fn unknown_plan_with_no_credits_available() {
        let mut sub = SubscriptionState::default();
        sub.current_plan = Some("Legacy Gold".to_string());
        let view = calculate_integrated_credits(&stats(100), &sub, "acct-1", today());

        assert_eq!(view.plan_credits.monthly, 0);
        assert!(approx(view.billing.overage_rate, 0.15));
        assert_eq!(view.total_credits.available, 0);
        assert!(approx(view.total_credits.usage_percentage, 0.0));
        assert_eq!(view.billing.overage_credits, 100);
        assert!(approx(view.billing.overage_cost, 15.0));
    }

    #[test]
    fn usage_within_allowance_costs_plan_price() {
        let sub = subscription(Some(Plan::Family), &[]);
        for used in [0, 1, 500, 999, 1000] {
            let view = calculate_integrated_credits(&stats(used), &sub, "a", today());
            assert_eq!(view.billing.overage_credits, 0);
            assert!(approx(view.billing.estimated_cost, 59.0));
        }
    }

    #[test]
    fn usage_over_allowance_is_billed_per_credit() {
        let sub = subscription(Some(Plan::Starter), &[1000]);
        for used in [501, 750, 2000] {
            let view = calculate_integrated_credits(&stats(used), &sub, "a", today());
            assert_eq!(view.billing.overage_credits, used - 500);
            assert!(approx(
                view.billing.estimated_cost,
                29.0 + (used - 500) as f64 * 0.12
            ));
        }
    }

    #[test]
    fn plan_and_additional_usage_sum_to_total() {
        let sub = subscription(Some(Plan::Business), &[300, 200]);
        for used in [-20, 0, 4999, 5000, 5001, 5500, 9000] {
            let view = calculate_integrated_credits(&stats(used), &sub, "a", today());
            assert_eq!(view.plan_credits.used + view.additional_credits.used, used);
            assert_eq!(
                view.plan_credits.used + view.plan_credits.remaining,
                view.plan_credits.monthly
            );
            assert_eq!(
                view.additional_credits.used + view.additional_credits.remaining,
                view.additional_credits.total
            );
            assert_eq!(
                view.total_credits.available,
                view.plan_credits.monthly + view.additional_credits.total
            );
        }
    }

    #[test]
    fn used_batches_are_excluded_from_total() {
        let mut sub = subscription(Some(Plan::Family), &[200, 300]);
        sub.consume_additional(200);
        assert_eq!(sub.additional_credits[0].status, BatchStatus::Used);

        let view = calculate_integrated_credits(&stats(0), &sub, "a", today());
        assert_eq!(view.additional_credits.total, 300);
        assert_eq!(view.additional_credits.batches.len(), 1);
    }

    #[test]
    fn expiring_batches_are_flagged_without_changing_totals() {
        let mut sub = subscription(Some(Plan::Family), &[]);
        // expires in 30 days: flagged
        sub.purchase_additional(100, 0.0, today() - Duration::days(335), 365);
        // expires in 31 days: not flagged
        sub.purchase_additional(200, 0.0, today() - Duration::days(334), 365);
        // already expired: not flagged
        sub.purchase_additional(400, 0.0, today() - Duration::days(400), 365);

        let view = calculate_integrated_credits(&stats(0), &sub, "a", today());
        assert_eq!(view.additional_credits.expiring.len(), 1);
        assert_eq!(view.additional_credits.expiring_amount(), 100);
        assert_eq!(view.additional_credits.total, 700);
    }

    #[test]
    fn batch_expiring_today_is_flagged() {
        let mut sub = subscription(Some(Plan::Family), &[]);
        sub.purchase_additional(150, 0.0, today() - Duration::days(365), 365);
        assert_eq!(sub.additional_credits[0].expiry_date, today());

        let view = calculate_integrated_credits(&stats(0), &sub, "a", today());
        assert_eq!(view.additional_credits.expiring.len(), 1);
        assert_eq!(view.additional_credits.expiring_amount(), 150);
    }

    #[test]
    fn extreme_inputs_saturate() {
        let sub = subscription(Some(Plan::Starter), &[i64::MAX]);
        let view = calculate_integrated_credits(&stats(100), &sub, "a", today());
        assert_eq!(view.additional_credits.total, i64::MAX);
        assert_eq!(view.total_credits.available, i64::MAX);
        assert_eq!(view.billing.overage_credits, 0);

        let view = calculate_integrated_credits(&stats(i64::MIN), &sub, "a", today());
        assert_eq!(view.plan_credits.used, i64::MIN);
        assert_eq!(view.plan_credits.remaining, i64::MAX);
        assert_eq!(view.additional_credits.used, 0);
        assert_eq!(view.total_credits.remaining, i64::MAX);

        let sub = subscription(None, &[]);
        let view = calculate_integrated_credits(&stats(i64::MAX), &sub, "a", today());
        assert_eq!(view.billing.overage_credits, i64::MAX);
        assert!(view.billing.overage_cost.is_finite());
    }

    #[test]
    fn used_batch_is_never_expiring() {
        let mut sub = subscription(None, &[]);
        sub.purchase_additional(100, 0.0, today() - Duration::days(360), 365);
        sub.consume_additional(100);
        let view = calculate_integrated_credits(&stats(0), &sub, "a", today());
        assert!(view.additional_credits.expiring.is_empty());
    }

    #[test]
    fn period_follows_today() {
        let sub = subscription(Some(Plan::Family), &[]);
        let view = calculate_integrated_credits(&stats(0), &sub, "a", today());
        assert_eq!(view.period.start, NaiveDate::from_ymd_opt(2026, 10, 1).unwrap());
        assert_eq!(view.period.reset_date, NaiveDate::from_ymd_opt(2026, 11, 1).unwrap());
    }

    #[test]
    fn account_id_and_plan_name_are_carried() {
        let sub = subscription(Some(Plan::Enterprise), &[]);
        let view = calculate_integrated_credits(&stats(10), &sub, "acct-42", today());
        assert_eq!(view.account_id, "acct-42");
        assert_eq!(view.plan_credits.name.as_deref(), Some("Enterprise"));
    }

    #[test]
    fn calculation_is_repeatable() {
        let sub = subscription(Some(Plan::FamilyPlus), &[500]);
        let a = calculate_integrated_credits(&stats(1234), &sub, "a", today());
        let b = calculate_integrated_credits(&stats(1234), &sub, "a", today());
        assert_eq!(a, b);
    }
}
