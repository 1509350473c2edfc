use chrono::NaiveDate;
use colored::{control, ColoredString, Colorize};

use crate::core::formatter::{
    format_credits, format_dollars, format_period, format_reset_date, format_usage_bar,
    format_usage_percent,
};
use crate::core::models::alert::{AlertLevel, CreditAlert};
use crate::core::models::credits::IntegratedCreditView;
use crate::core::models::plan::Plan;
use crate::core::models::subscription::{BatchStatus, SubscriptionState};

const BAR_WIDTH: usize = 12;

fn label(text: &str) -> ColoredString {
    format!("{:<10}", text).cyan()
}

/// Render the credit view followed by its alerts.
///
/// Layout:
/// ```text
///  Navi credits (acct-1)
///   Plan        Family Plus ($99.00/mo)
///   Period      Oct 1 - Oct 31
///               Resets Nov 1 (in 13 days)
///   Usage       90.0% used [█░░░░░░░░░░░]
///   Included    1,500 / 1,500 used, 0 left
///   Additional  300 / 500 used, 200 left
///   Total       1,800 / 2,000 used, 200 left
///   Overage     300 credits at $0.08 = $24.00
///   Estimate    $123.00
/// ```
pub fn render_credit_view(
    view: &IntegratedCreditView,
    alerts: &[CreditAlert],
    today: NaiveDate,
    use_color: bool,
) -> String {
    control::set_override(use_color);

    let mut lines: Vec<String> = Vec::new();
    lines.push(format!(" Navi credits ({})", view.account_id).bold().to_string());

    let plan_line = match &view.plan_credits.name {
        Some(name) => format!("{} ({}/mo)", name, format_dollars(view.billing.plan_price)),
        None => "No plan".dimmed().to_string(),
    };
    lines.push(format!("  {}  {}", label("Plan"), plan_line));

    lines.push(format!(
        "  {}  {}",
        label("Period"),
        format_period(view.period.start, view.period.end)
    ));
    lines.push(format!(
        "              {}",
        format_reset_date(view.period.reset_date, today).dimmed()
    ));

    let usage = view.total_credits.usage_percentage;
    lines.push(format!(
        "  {}  {} {}",
        label("Usage"),
        color_by_usage(usage, &format_usage_percent(usage)),
        format_usage_bar(usage, BAR_WIDTH).magenta()
    ));

    let plan = &view.plan_credits;
    lines.push(format!(
        "  {}  {}",
        label("Included"),
        used_of(plan.used, plan.monthly, plan.remaining)
    ));

    let additional = &view.additional_credits;
    if additional.total > 0 || additional.used > 0 {
        lines.push(format!(
            "  {}  {}",
            label("Additional"),
            used_of(additional.used, additional.total, additional.remaining)
        ));
    }

    let total = &view.total_credits;
    lines.push(format!(
        "  {}  {}",
        label("Total"),
        used_of(total.used, total.available, total.remaining)
    ));

    let billing = &view.billing;
    if billing.overage_credits > 0 {
        let overage = format!(
            "{} credits at {} = {}",
            format_credits(billing.overage_credits),
            format_dollars(billing.overage_rate),
            format_dollars(billing.overage_cost)
        );
        lines.push(format!("  {}  {}", label("Overage"), overage.yellow()));
    }
    lines.push(format!(
        "  {}  {}",
        label("Estimate"),
        format_dollars(billing.estimated_cost).bold()
    ));

    if !alerts.is_empty() {
        lines.push(String::new());
        lines.push(render_alerts(alerts, use_color));
    }

    lines.join("\n")
}

fn used_of(used: i64, of: i64, remaining: i64) -> String {
    format!(
        "{} / {} used, {} left",
        format_credits(used),
        format_credits(of),
        format_credits(remaining)
    )
}

/// Color the usage string green/yellow/red at the alert thresholds.
fn color_by_usage(used_percent: f64, text: &str) -> ColoredString {
    if used_percent >= 90.0 {
        text.red()
    } else if used_percent >= 75.0 {
        text.yellow()
    } else {
        text.green()
    }
}

pub fn render_alerts(alerts: &[CreditAlert], use_color: bool) -> String {
    control::set_override(use_color);

    if alerts.is_empty() {
        return format!(" {}\n  {}", "Alerts".bold(), "No alerts".green());
    }

    let mut lines = vec![format!(" {}", "Alerts".bold())];
    for alert in alerts {
        let tag = format!("[{}]", alert.level);
        let tag = match alert.level {
            AlertLevel::Error => tag.red().bold(),
            AlertLevel::Warning => tag.yellow().bold(),
            AlertLevel::Info => tag.blue().bold(),
        };
        lines.push(format!("  {} {}", tag, alert.title.bold()));
        lines.push(format!("      {}", alert.message));
    }
    lines.join("\n")
}

/// Plan catalog table, marking the current plan.
pub fn render_plans(current: Option<Plan>, use_color: bool) -> String {
    control::set_override(use_color);

    let mut lines = vec![format!(
        " {:<2}{:<14} {:<11} {:>8} {:>10} {:>9}",
        "", "Plan", "Category", "Credits", "Price", "Overage"
    )
    .bold()
    .to_string()];

    for plan in Plan::all() {
        let marker = if Some(*plan) == current { "*" } else { " " };
        let row = format!(
            " {:<2}{:<14} {:<11} {:>8} {:>10} {:>9}",
            marker,
            plan.display_name(),
            plan.category().to_string(),
            format_credits(plan.monthly_credits()),
            format!("{}/mo", format_dollars(plan.monthly_price())),
            format_dollars(plan.overage_rate()),
        );
        if Some(*plan) == current {
            lines.push(row.green().to_string());
        } else {
            lines.push(row);
        }
    }
    lines.join("\n")
}

pub fn render_subscription(state: &SubscriptionState, use_color: bool) -> String {
    control::set_override(use_color);

    let mut lines = vec![" Subscription".bold().to_string()];
    let plan = match &state.current_plan {
        Some(name) => format!("{} ({}/mo)", name, format_dollars(state.plan_price)),
        None => "No plan".dimmed().to_string(),
    };
    lines.push(format!("  {}  {}", label("Plan"), plan));
    lines.push(format!(
        "  {}  {}",
        label("Consumed"),
        format!("{} additional credits", format_credits(state.used_additional_credits))
    ));

    if state.additional_credits.is_empty() {
        lines.push(format!("  {}  {}", label("Batches"), "none".dimmed()));
    } else {
        lines.push(format!("  {}:", "Batches".cyan()));
        for batch in &state.additional_credits {
            let status = match batch.status {
                BatchStatus::Active => batch.status.to_string().green(),
                BatchStatus::Used => batch.status.to_string().dimmed(),
            };
            lines.push(format!(
                "    {:<20} {:>7} credits  {:>9}  expires {}  {}",
                batch.id,
                format_credits(batch.amount),
                format_dollars(batch.price),
                batch.expiry_date.format("%Y-%m-%d"),
                status
            ));
        }
    }
    lines.join("\n")
}
