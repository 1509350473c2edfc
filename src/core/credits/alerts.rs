use crate::core::credits::calculator::EXPIRY_WARNING_DAYS;
use crate::core::models::alert::{AlertLevel, CreditAlert};
use crate::core::models::credits::IntegratedCreditView;

pub const CRITICAL_USAGE_PERCENT: f64 = 90.0;
pub const HIGH_USAGE_PERCENT: f64 = 75.0;

/// Derive alerts from a credit view, most severe first. Each rule fires
/// independently, so a view may yield none or several.
pub fn derive_alerts(view: &IntegratedCreditView) -> Vec<CreditAlert> {
    let mut alerts = Vec::new();
    let usage = view.total_credits.usage_percentage;

    if usage >= CRITICAL_USAGE_PERCENT {
        alerts.push(CreditAlert {
            level: AlertLevel::Error,
            title: "Credits nearly exhausted".to_string(),
            message: format!(
                "You have used {:.1}% of your available credits this period.",
                usage
            ),
        });
    } else if usage >= HIGH_USAGE_PERCENT {
        alerts.push(CreditAlert {
            level: AlertLevel::Warning,
            title: "High credit usage".to_string(),
            message: format!(
                "You have used {:.1}% of your available credits. Consider purchasing additional credits.",
                usage
            ),
        });
    }

    let billing = &view.billing;
    if billing.overage_credits > 0 {
        alerts.push(CreditAlert {
            level: AlertLevel::Warning,
            title: "Overage charges".to_string(),
            message: format!(
                "{} credits over your plan allowance will add ${:.2} to this period's bill.",
                billing.overage_credits, billing.overage_cost
            ),
        });
    }

    if !view.additional_credits.expiring.is_empty() {
        alerts.push(CreditAlert {
            level: AlertLevel::Info,
            title: "Credits expiring soon".to_string(),
            message: format!(
                "{} additional credits expire within {} days.",
                view.additional_credits.expiring_amount(),
                EXPIRY_WARNING_DAYS
            ),
        });
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::credits::calculator::calculate_integrated_credits;
    use crate::core::models::plan::Plan;
    use crate::core::models::stats::DashboardStats;
    use crate::core::models::subscription::SubscriptionState;
    use chrono::{Duration, NaiveDate};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn view_for(plan: Plan, batches: &[(i64, i64)], used: i64) -> IntegratedCreditView {
        let mut sub = SubscriptionState::default();
        sub.set_plan(plan);
        for (amount, days_left) in batches {
            sub.purchase_additional(*amount, 0.0, today() + Duration::days(*days_left - 365), 365);
        }
        let stats = DashboardStats {
            total_credits_used: used,
            ..Default::default()
        };
        calculate_integrated_credits(&stats, &sub, "acct", today())
    }

    fn levels(alerts: &[CreditAlert]) -> Vec<AlertLevel> {
        alerts.iter().map(|a| a.level).collect()
    }

    #[test]
    fn no_alerts_for_light_usage() {
        let view = view_for(Plan::Family, &[], 100);
        assert!(derive_alerts(&view).is_empty());
    }

    #[test]
    fn warning_between_75_and_90_percent() {
        let view = view_for(Plan::Family, &[], 750);
        let alerts = derive_alerts(&view);
        assert_eq!(levels(&alerts), vec![AlertLevel::Warning]);
        assert!(alerts[0].message.contains("75.0%"));

        let view = view_for(Plan::Family, &[], 899);
        assert_eq!(levels(&derive_alerts(&view)), vec![AlertLevel::Warning]);
    }

    #[test]
    fn error_at_90_percent() {
        let view = view_for(Plan::Family, &[], 900);
        let alerts = derive_alerts(&view);
        assert_eq!(levels(&alerts), vec![AlertLevel::Error]);
        assert!(alerts[0].message.contains("90.0%"));
    }

    #[test]
    fn family_plus_overage_fires_error_and_overage_warning() {
        let view = view_for(Plan::FamilyPlus, &[(500, 200)], 1800);
        let alerts = derive_alerts(&view);
        assert_eq!(levels(&alerts), vec![AlertLevel::Error, AlertLevel::Warning]);
        assert!(alerts[1].message.contains("300 credits"));
        assert!(alerts[1].message.contains("$24.00"));
    }

    #[test]
    fn unknown_plan_gets_overage_warning_only() {
        let mut sub = SubscriptionState::default();
        sub.current_plan = Some("Legacy Gold".to_string());
        let stats = DashboardStats {
            total_credits_used: 100,
            ..Default::default()
        };
        let view = calculate_integrated_credits(&stats, &sub, "acct", today());
        let alerts = derive_alerts(&view);
        assert_eq!(levels(&alerts), vec![AlertLevel::Warning]);
        assert_eq!(alerts[0].title, "Overage charges");
        assert!(alerts[0].message.contains("100 credits"));
        assert!(alerts[0].message.contains("$15.00"));
    }

    #[test]
    fn expiring_batches_add_info_with_summed_amount() {
        let view = view_for(Plan::Business, &[(100, 5), (250, 29), (400, 90)], 0);
        let alerts = derive_alerts(&view);
        assert_eq!(levels(&alerts), vec![AlertLevel::Info]);
        assert!(alerts[0].message.starts_with("350 additional credits"));
    }

    #[test]
    fn all_rules_can_fire_together() {
        let view = view_for(Plan::Starter, &[(100, 10)], 700);
        let alerts = derive_alerts(&view);
        assert_eq!(
            levels(&alerts),
            vec![AlertLevel::Error, AlertLevel::Warning, AlertLevel::Info]
        );
    }
}
