use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};

use crate::cli::output::{OutputFormat, OutputOptions};
use crate::cli::renderer;
use crate::cli::selector::{self, Selection};
use crate::core::config::AppConfig;
use crate::core::formatter::{format_credits, format_dollars};
use crate::core::models::plan::{overage_rate_for, Plan};
use crate::core::models::subscription::SubscriptionState;
use crate::core::store::SubscriptionStore;

fn open_store() -> SubscriptionStore {
    let config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "falling back to default config");
        AppConfig::default()
    });
    SubscriptionStore::new(config.store_path())
}

fn load(store: &SubscriptionStore, today: NaiveDate) -> SubscriptionState {
    store.load_or(|| SubscriptionState::sample(today))
}

fn save(store: &SubscriptionStore, state: &SubscriptionState) -> Result<()> {
    store
        .save(state)
        .with_context(|| format!("Failed to save subscription to {}", store.path().display()))
}

/// Price charged for a purchase when none is given: the plan's per-credit overage rate.
pub fn default_purchase_price(state: &SubscriptionState, amount: i64) -> f64 {
    amount as f64 * overage_rate_for(state.current_plan.as_deref())
}

pub fn plans(opts: &OutputOptions) -> Result<()> {
    let store = open_store();
    let current = load(&store, Local::now().date_naive()).plan();

    match opts.format {
        OutputFormat::Text => println!("{}", renderer::render_plans(current, opts.use_color)),
        OutputFormat::Json => {
            let rows: Vec<serde_json::Value> = Plan::all()
                .iter()
                .map(|p| {
                    serde_json::json!({
                        "id": p.id(),
                        "name": p.display_name(),
                        "category": p.category(),
                        "monthly_credits": p.monthly_credits(),
                        "monthly_price": p.monthly_price(),
                        "overage_rate": p.overage_rate(),
                        "current": Some(*p) == current,
                    })
                })
                .collect();
            println!("{}", opts.to_json(&rows)?);
        }
    }
    Ok(())
}

pub fn show(opts: &OutputOptions) -> Result<()> {
    let store = open_store();
    let state = load(&store, Local::now().date_naive());

    match opts.format {
        OutputFormat::Text => println!("{}", renderer::render_subscription(&state, opts.use_color)),
        OutputFormat::Json => println!("{}", opts.to_json(&state)?),
    }
    Ok(())
}

pub fn set_plan(name: Option<String>, _opts: &OutputOptions) -> Result<()> {
    let store = open_store();
    let mut state = load(&store, Local::now().date_naive());

    let plan = match name {
        Some(name) => match Plan::from_name(&name) {
            Some(p) => p,
            None => {
                let known: Vec<&str> = Plan::all().iter().map(|p| p.display_name()).collect();
                eprintln!("Unknown plan: '{}' (known: {})", name, known.join(", "));
                std::process::exit(1);
            }
        },
        None => match selector::select_plan(state.plan()).context("Plan picker failed")? {
            Selection::Chosen(p) => p,
            Selection::NotATerminal => {
                eprintln!("Not a terminal. Pass a plan name, e.g. `navi subscription set-plan \"Family Plus\"`.");
                std::process::exit(1);
            }
            Selection::Cancelled => {
                eprintln!("Plan change cancelled.");
                return Ok(());
            }
        },
    };

    if state.plan() == Some(plan) {
        println!("Already on {}", plan.display_name());
        return Ok(());
    }

    state.set_plan(plan);
    save(&store, &state)?;
    println!(
        "Switched to {} ({} credits, {}/mo)",
        plan.display_name(),
        format_credits(plan.monthly_credits()),
        format_dollars(plan.monthly_price())
    );
    Ok(())
}

pub fn buy(amount: i64, price: Option<f64>, days: i64, _opts: &OutputOptions) -> Result<()> {
    if amount <= 0 {
        eprintln!("Credit amount must be positive, got {}", amount);
        std::process::exit(1);
    }
    if days <= 0 {
        eprintln!("Validity must be at least one day, got {}", days);
        std::process::exit(1);
    }
    if price.is_some_and(|p| p < 0.0) {
        eprintln!("Price must not be negative");
        std::process::exit(1);
    }

    let store = open_store();
    let today = Local::now().date_naive();
    let mut state = load(&store, today);

    let price = price.unwrap_or_else(|| default_purchase_price(&state, amount));
    let Some(id) = state.purchase_additional(amount, price, today, days) else {
        eprintln!("Validity too long: {} days from {} is past the last supported date", days, today);
        std::process::exit(1);
    };
    save(&store, &state)?;
    tracing::debug!(%id, amount, price, "recorded credit purchase");

    println!(
        "Purchased {} credits for {} (batch {}, valid {} days)",
        format_credits(amount),
        format_dollars(price),
        id,
        days
    );
    Ok(())
}

pub fn consume(credits: i64, _opts: &OutputOptions) -> Result<()> {
    if credits <= 0 {
        eprintln!("Credits to consume must be positive, got {}", credits);
        std::process::exit(1);
    }

    let store = open_store();
    let mut state = load(&store, Local::now().date_naive());
    let retired = state.consume_additional(credits);
    save(&store, &state)?;

    println!(
        "Consumed {} additional credits ({} total)",
        format_credits(credits),
        format_credits(state.used_additional_credits)
    );
    for id in &retired {
        println!("  Batch {} is now used", id);
    }
    Ok(())
}

pub fn reset(_opts: &OutputOptions) -> Result<()> {
    let store = open_store();
    let removed = store
        .clear()
        .with_context(|| format!("Failed to remove {}", store.path().display()))?;
    if removed {
        println!("Removed stored subscription at {}", store.path().display());
    } else {
        println!("No stored subscription at {}", store.path().display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_price_follows_plan_rate() {
        let mut state = SubscriptionState::default();
        state.set_plan(Plan::FamilyPlus);
        assert!((default_purchase_price(&state, 500) - 40.0).abs() < 1e-9);
    }

    #[test]
    fn default_price_without_plan_uses_fallback_rate() {
        let state = SubscriptionState::default();
        assert!((default_purchase_price(&state, 100) - 15.0).abs() < 1e-9);
    }
}
