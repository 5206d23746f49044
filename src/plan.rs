use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{LedgerError, Result};

/// Subscription tier of the signed-in business
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Plan {
    #[serde(rename = "SME", alias = "sme")]
    Sme,
    #[serde(alias = "startup")]
    Startup,
    #[serde(alias = "enterprise")]
    Enterprise,
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plan::Sme => write!(f, "SME"),
            Plan::Startup => write!(f, "Startup"),
            Plan::Enterprise => write!(f, "Enterprise"),
        }
    }
}

impl FromStr for Plan {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sme" => Ok(Plan::Sme),
            "startup" => Ok(Plan::Startup),
            "enterprise" => Ok(Plan::Enterprise),
            _ => Err(LedgerError::InvalidPlan(s.to_string())),
        }
    }
}

/// A gated entry point of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Dashboard,
    Ledger,
    Reports,
    CategorySuggestion,
    TaxAdvisor,
    AuditLog,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Feature::Dashboard => "Dashboard",
            Feature::Ledger => "Ledger entries",
            Feature::Reports => "Financial reports",
            Feature::CategorySuggestion => "AI category suggestion",
            Feature::TaxAdvisor => "AI tax consultant",
            Feature::AuditLog => "Audit log",
        };
        f.write_str(name)
    }
}

const ALL_PLANS: &[Plan] = &[Plan::Sme, Plan::Startup, Plan::Enterprise];
const PAID_PLANS: &[Plan] = &[Plan::Startup, Plan::Enterprise];

/// Which plans unlock which feature. Enterprise is implicitly allowed everywhere.
const GATES: &[(Feature, &[Plan])] = &[
    (Feature::Dashboard, ALL_PLANS),
    (Feature::Ledger, ALL_PLANS),
    (Feature::Reports, ALL_PLANS),
    (Feature::CategorySuggestion, ALL_PLANS),
    (Feature::TaxAdvisor, PAID_PLANS),
    (Feature::AuditLog, PAID_PLANS),
];

fn allowed_plans(feature: Feature) -> &'static [Plan] {
    GATES
        .iter()
        .find(|(f, _)| *f == feature)
        .map(|(_, plans)| *plans)
        .unwrap_or(&[])
}

/// Capability check consulted by every gated session command
pub fn allows(plan: Plan, feature: Feature) -> bool {
    plan == Plan::Enterprise || allowed_plans(feature).contains(&plan)
}

/// Like [`allows`], but returns the error to show the user
pub fn require(plan: Plan, feature: Feature) -> Result<()> {
    if allows(plan, feature) {
        return Ok(());
    }
    let upgrade = allowed_plans(feature)
        .first()
        .copied()
        .unwrap_or(Plan::Enterprise);
    Err(LedgerError::FeatureLocked {
        feature,
        plan,
        upgrade,
    })
}
