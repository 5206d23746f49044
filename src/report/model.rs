use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Allowed gap between total assets and equity plus liabilities
pub const BALANCE_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStatement {
    #[serde(default)]
    pub revenue_items: Vec<LineItem>,
    pub total_revenue: f64,
    #[serde(default)]
    pub cost_of_sales_items: Vec<LineItem>,
    pub total_cost_of_sales: f64,
    pub gross_profit: f64,
    #[serde(default)]
    pub operating_expenses: Vec<LineItem>,
    pub total_operating_expenses: f64,
    pub operating_profit: f64,
    pub taxation: f64,
    pub net_profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheet {
    #[serde(default)]
    pub current_assets: Vec<LineItem>,
    #[serde(default)]
    pub non_current_assets: Vec<LineItem>,
    pub total_assets: f64,
    #[serde(default)]
    pub current_liabilities: Vec<LineItem>,
    #[serde(default)]
    pub non_current_liabilities: Vec<LineItem>,
    pub total_liabilities: f64,
    #[serde(default)]
    pub equity_items: Vec<LineItem>,
    pub total_equity: f64,
}

impl BalanceSheet {
    pub fn total_equity_and_liabilities(&self) -> f64 {
        self.total_equity + self.total_liabilities
    }

    /// Assets minus (equity + liabilities)
    pub fn imbalance(&self) -> f64 {
        self.total_assets - self.total_equity_and_liabilities()
    }

    pub fn is_balanced(&self) -> bool {
        self.imbalance().abs() <= BALANCE_TOLERANCE
    }
}

/// Audited financial statements as returned by the text-generation service.
///
/// `generated_at` is never taken from the service; it is stamped when the
/// reply is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredReport {
    pub company_name: String,
    pub statement_date: String,
    #[serde(default)]
    pub auditor_opinion: String,
    pub income_statement: IncomeStatement,
    pub balance_sheet: BalanceSheet,
    #[serde(default)]
    pub notes_to_accounts: Vec<String>,
    #[serde(skip_deserializing, default = "Utc::now")]
    pub generated_at: DateTime<Utc>,
}

impl StructuredReport {
    pub fn is_balanced(&self) -> bool {
        self.balance_sheet.is_balanced()
    }
}
