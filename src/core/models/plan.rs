use serde::{Deserialize, Serialize};

/// Overage rate in dollars per credit when no plan (or an unknown plan) is active.
pub const DEFAULT_OVERAGE_RATE: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanCategory {
    Individual,
    Family,
    Business,
}

impl std::fmt::Display for PlanCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Individual => write!(f, "Individual"),
            Self::Family => write!(f, "Family"),
            Self::Business => write!(f, "Business"),
        }
    }
}

/// Subscription tiers offered by Navi.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    Starter,
    Family,
    FamilyPlus,
    Business,
    Enterprise,
}

impl Plan {
    /// Resolve a stored plan name. Accepts display names ("Family Plus") and
    /// ids ("family_plus", "family-plus"), case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '-' || c == ' ' { '_' } else { c })
            .collect();
        match normalized.as_str() {
            "starter" => Some(Self::Starter),
            "family" => Some(Self::Family),
            "family_plus" | "familyplus" => Some(Self::FamilyPlus),
            "business" => Some(Self::Business),
            "enterprise" => Some(Self::Enterprise),
            _ => None,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::Starter => "starter",
            Self::Family => "family",
            Self::FamilyPlus => "family_plus",
            Self::Business => "business",
            Self::Enterprise => "enterprise",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Starter => "Starter",
            Self::Family => "Family",
            Self::FamilyPlus => "Family Plus",
            Self::Business => "Business",
            Self::Enterprise => "Enterprise",
        }
    }

    /// Credits included with the plan each billing period.
    pub fn monthly_credits(&self) -> i64 {
        match self {
            Self::Starter => 500,
            Self::Family => 1000,
            Self::FamilyPlus => 1500,
            Self::Business => 5000,
            Self::Enterprise => 20000,
        }
    }

    /// Monthly price in dollars.
    pub fn monthly_price(&self) -> f64 {
        match self {
            Self::Starter => 29.0,
            Self::Family => 59.0,
            Self::FamilyPlus => 99.0,
            Self::Business => 299.0,
            Self::Enterprise => 999.0,
        }
    }

    /// Dollars charged per credit used beyond the monthly allowance.
    pub fn overage_rate(&self) -> f64 {
        match self {
            Self::Starter => 0.12,
            Self::Family => 0.10,
            Self::FamilyPlus => 0.08,
            Self::Business => 0.05,
            Self::Enterprise => 0.03,
        }
    }

    pub fn category(&self) -> PlanCategory {
        match self {
            Self::Starter => PlanCategory::Individual,
            Self::Family | Self::FamilyPlus => PlanCategory::Family,
            Self::Business | Self::Enterprise => PlanCategory::Business,
        }
    }

    /// All plans in catalog order (cheapest first).
    pub fn all() -> &'static [Plan] {
        &[
            Plan::Starter,
            Plan::Family,
            Plan::FamilyPlus,
            Plan::Business,
            Plan::Enterprise,
        ]
    }
}

/// Monthly allowance for a stored plan name. Unknown or missing plans get 0.
pub fn monthly_credits_for(plan_name: Option<&str>) -> i64 {
    plan_name
        .and_then(Plan::from_name)
        .map(|p| p.monthly_credits())
        .unwrap_or(0)
}

/// Overage rate for a stored plan name, falling back to [`DEFAULT_OVERAGE_RATE`].
pub fn overage_rate_for(plan_name: Option<&str>) -> f64 {
    plan_name
        .and_then(Plan::from_name)
        .map(|p| p.overage_rate())
        .unwrap_or(DEFAULT_OVERAGE_RATE)
}
