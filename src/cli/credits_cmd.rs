use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::cli::output::{OutputFormat, OutputOptions};
use crate::cli::renderer;
use crate::core::api::ApiClient;
use crate::core::config::AppConfig;
use crate::core::credits::{calculate_integrated_credits, derive_alerts};
use crate::core::models::alert::CreditAlert;
use crate::core::models::credits::IntegratedCreditView;
use crate::core::models::stats::DashboardStats;
use crate::core::models::subscription::SubscriptionState;
use crate::core::store::SubscriptionStore;

#[derive(Debug, Clone, Default)]
pub struct CreditsArgs {
    /// Replace the fetched usage counter
    pub used: Option<i64>,
    /// Read stats from a JSON file instead of the API
    pub stats_file: Option<PathBuf>,
    /// Skip the API even when one is configured
    pub offline: bool,
}

#[derive(Serialize)]
struct CreditReport<'a> {
    #[serde(flatten)]
    view: &'a IntegratedCreditView,
    alerts: &'a [CreditAlert],
}

fn read_stats_file(path: &Path) -> Result<DashboardStats> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read stats file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse stats file {}", path.display()))
}

fn api_client(config: &AppConfig, offline: bool) -> Option<ApiClient> {
    if offline {
        return None;
    }
    match ApiClient::from_config(&config.api) {
        Ok(Some(client)) => {
            tracing::debug!(base_url = client.base_url(), "using dashboard API");
            Some(client)
        }
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(error = %e, "dashboard API disabled");
            None
        }
    }
}

/// Gather stats and subscription. Every remote failure falls back to local or
/// sample data, so this only errors on an unreadable `--stats` file.
pub async fn load_inputs(
    config: &AppConfig,
    store: &SubscriptionStore,
    args: &CreditsArgs,
    today: NaiveDate,
) -> Result<(DashboardStats, SubscriptionState)> {
    let client = api_client(config, args.offline);
    let account_id = config.account.id.as_str();

    let stats_fut = async {
        if let Some(path) = &args.stats_file {
            return read_stats_file(path);
        }
        let Some(client) = &client else {
            return Ok(DashboardStats::sample());
        };
        Ok(match client.fetch_dashboard_stats(account_id).await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!(error = %e, "using sample stats");
                DashboardStats::sample()
            }
        })
    };

    let subscription_fut = async {
        let local = || store.load_or(|| SubscriptionState::sample(today));
        let Some(client) = &client else {
            return local();
        };
        match client.fetch_subscription(account_id).await {
            Ok(state) => {
                if let Err(e) = store.save(&state) {
                    tracing::warn!(error = %e, "failed to mirror subscription locally");
                }
                state
            }
            Err(e) => {
                tracing::warn!(error = %e, "using locally stored subscription");
                local()
            }
        }
    };

    let (stats, subscription) = tokio::join!(stats_fut, subscription_fut);
    let mut stats = stats?;
    if let Some(used) = args.used {
        stats.total_credits_used = used;
    }
    Ok((stats, subscription))
}

pub async fn run(args: CreditsArgs, alerts_only: bool, opts: &OutputOptions) -> Result<()> {
    let config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "falling back to default config");
        AppConfig::default()
    });
    let store = SubscriptionStore::new(config.store_path());
    let today = Local::now().date_naive();

    let (stats, subscription) = load_inputs(&config, &store, &args, today).await?;
    let view = calculate_integrated_credits(&stats, &subscription, &config.account.id, today);
    let alerts = derive_alerts(&view);
    tracing::debug!(
        used = view.total_credits.used,
        available = view.total_credits.available,
        alerts = alerts.len(),
        "credits calculated"
    );

    match (opts.format, alerts_only) {
        (OutputFormat::Text, false) => {
            println!(
                "{}",
                renderer::render_credit_view(&view, &alerts, today, opts.use_color)
            );
        }
        (OutputFormat::Text, true) => {
            println!("{}", renderer::render_alerts(&alerts, opts.use_color));
        }
        (OutputFormat::Json, false) => {
            let report = CreditReport {
                view: &view,
                alerts: &alerts,
            };
            println!("{}", opts.to_json(&report)?);
        }
        (OutputFormat::Json, true) => {
            println!("{}", opts.to_json(&alerts)?);
        }
    }

    Ok(())
}
