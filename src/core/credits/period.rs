use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::core::models::credits::BillingPeriod;

/// Calendar-month billing period containing `today`.
pub fn billing_period(today: NaiveDate) -> BillingPeriod {
    let start = today - Duration::days(today.day0() as i64);
    let reset_date = start
        .checked_add_months(Months::new(1))
        .unwrap_or(NaiveDate::MAX);
    let end = reset_date.pred_opt().unwrap_or(reset_date);
    BillingPeriod {
        start,
        end,
        reset_date,
    }
}
