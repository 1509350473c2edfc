use std::time::Duration;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::core::config::ApiConfig;
use crate::core::models::stats::DashboardStats;
use crate::core::models::subscription::{AdditionalCreditBatch, BatchStatus, SubscriptionState};

const STATS_PATH: &str = "/api/dashboard/stats";
const SUBSCRIPTION_PATH: &str = "/api/subscription";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("endpoint must use HTTPS (plain HTTP only for localhost), got: {0}")]
    InsecureEndpoint(String),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unauthorized - check the API key env var")]
    Unauthorized,
    #[error("HTTP {status} from {path}: {body}")]
    Status {
        status: u16,
        path: &'static str,
        body: String,
    },
}

/// Validate a dashboard base URL before any credentials are sent to it.
pub fn validate_endpoint(url: &str) -> Result<(), ApiError> {
    if url.starts_with("https://") {
        return Ok(());
    }
    let loopback = ["http://localhost", "http://127.0.0.1", "http://[::1]"];
    let is_loopback = loopback.iter().any(|prefix| {
        url.strip_prefix(prefix)
            .map(|rest| rest.is_empty() || rest.starts_with(':') || rest.starts_with('/'))
            .unwrap_or(false)
    });
    if is_loopback {
        Ok(())
    } else {
        Err(ApiError::InsecureEndpoint(url.to_string()))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    total_credits_used: Option<i64>,
    total_agents: Option<u32>,
    active_agents: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchResponse {
    id: Option<String>,
    amount: i64,
    #[serde(default)]
    price: f64,
    purchase_date: String,
    expiry_date: String,
    #[serde(default)]
    status: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionResponse {
    current_plan: Option<String>,
    plan_price: Option<f64>,
    #[serde(default)]
    additional_credits: Vec<BatchResponse>,
    used_additional_credits: Option<i64>,
}

/// Accepts "2026-10-19" as well as ISO timestamps like "2026-10-19T08:00:00.000Z".
fn parse_api_date(value: &str) -> Option<NaiveDate> {
    let date_part = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Anything other than "active" is treated as spent.
fn parse_status(id: &str, status: &str) -> BatchStatus {
    if status.eq_ignore_ascii_case("active") {
        return BatchStatus::Active;
    }
    if !status.eq_ignore_ascii_case("used") {
        tracing::warn!(batch = id, status, "unknown credit batch status, treating as used");
    }
    BatchStatus::Used
}

fn convert_stats(resp: StatsResponse) -> DashboardStats {
    DashboardStats {
        total_credits_used: resp.total_credits_used.unwrap_or(0),
        total_agents: resp.total_agents.unwrap_or(0),
        active_agents: resp.active_agents.unwrap_or(0),
    }
}

fn convert_subscription(resp: SubscriptionResponse) -> SubscriptionState {
    let batches = resp
        .additional_credits
        .into_iter()
        .enumerate()
        .filter_map(|(i, b)| {
            let (Some(purchase_date), Some(expiry_date)) =
                (parse_api_date(&b.purchase_date), parse_api_date(&b.expiry_date))
            else {
                tracing::warn!(
                    purchase_date = %b.purchase_date,
                    expiry_date = %b.expiry_date,
                    "skipping credit batch with unparseable dates"
                );
                return None;
            };
            let id = b.id.unwrap_or_else(|| format!("batch-{}", i + 1));
            let status = parse_status(&id, &b.status);
            Some(AdditionalCreditBatch {
                id,
                amount: b.amount,
                price: b.price,
                purchase_date,
                expiry_date,
                status,
            })
        })
        .collect();

    SubscriptionState {
        current_plan: resp.current_plan,
        plan_price: resp.plan_price.unwrap_or(0.0),
        additional_credits: batches,
        used_additional_credits: resp.used_additional_credits.unwrap_or(0),
    }
}

/// Client for the dashboard's JSON API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self, ApiError> {
        validate_endpoint(base_url)?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Build a client from config. `Ok(None)` when no base URL is configured.
    pub fn from_config(config: &ApiConfig) -> Result<Option<Self>, ApiError> {
        match &config.base_url {
            Some(url) => Self::new(
                url,
                config.api_key(),
                Duration::from_secs(config.timeout_secs),
            )
            .map(Some),
            None => Ok(None),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &'static str,
        account_id: &str,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, account_id, "fetching");

        let mut request = self
            .http
            .get(&url)
            .query(&[("accountId", account_id)])
            .header("Accept", "application/json");
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                path,
                body,
            });
        }
        Ok(response.json().await?)
    }

    pub async fn fetch_dashboard_stats(&self, account_id: &str) -> Result<DashboardStats, ApiError> {
        let resp: StatsResponse = self.get_json(STATS_PATH, account_id).await?;
        Ok(convert_stats(resp))
    }

    pub async fn fetch_subscription(&self, account_id: &str) -> Result<SubscriptionState, ApiError> {
        let resp: SubscriptionResponse = self.get_json(SUBSCRIPTION_PATH, account_id).await?;
        Ok(convert_subscription(resp))
    }
}
