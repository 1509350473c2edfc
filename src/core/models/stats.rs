use serde::{Deserialize, Serialize};

/// Period-to-date usage for one account, aggregated by the dashboard backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Credits consumed in the current billing period
    pub total_credits_used: i64,
    #[serde(default)]
    pub total_agents: u32,
    #[serde(default)]
    pub active_agents: u32,
}

impl DashboardStats {
    /// Placeholder stats shown when the backend can't be reached.
    pub fn sample() -> Self {
        Self {
            total_credits_used: 1250,
            total_agents: 4,
            active_agents: 3,
        }
    }
}
