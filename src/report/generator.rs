use chrono::{NaiveDate, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use super::model::StructuredReport;
use crate::ai::TextGenerator;
use crate::error::{LedgerError, Result};
use crate::ledger::{Transaction, TransactionType};

/// Compact row submitted to the service
#[derive(Serialize)]
struct CompactTransaction<'a> {
    date: NaiveDate,
    desc: &'a str,
    amt: f64,
    #[serde(rename = "type")]
    kind: TransactionType,
    cat: &'a str,
}

pub fn compact_transactions(transactions: &[Transaction]) -> String {
    let rows: Vec<CompactTransaction> = transactions
        .iter()
        .map(|t| CompactTransaction {
            date: t.date,
            desc: &t.description,
            amt: t.amount,
            kind: t.kind,
            cat: &t.category,
        })
        .collect();
    serde_json::to_string(&rows).unwrap_or_else(|_| "[]".to_string())
}

pub fn build_prompt(company_name: &str, transaction_data: &str) -> String {
    format!(
        r#"You are an expert Chartered Accountant and Independent Auditor acting for a Nigerian company "{company_name}".

Task: Prepare a standard "Audited Financial Statement" based on the provided transaction ledger.
The report must comply with IFRS and the Nigerian Finance Act.

Transactions:
{transaction_data}

Instructions:
1. Prepare a "Statement of Profit or Loss and Other Comprehensive Income".
   - Categorize transactions into Revenue, Cost of Sales (if applicable, otherwise 0), and Operating Expenses.
   - Calculate Gross Profit, Operating Profit, and Net Profit.
   - ESTIMATE Taxation (CIT @ 30% of profit if profitable, otherwise 0) and Education Tax if applicable.

2. Prepare a "Statement of Financial Position" (Balance Sheet).
   - Assume the net difference in cash flow resides in "Cash and Cash Equivalents" under Current Assets.
   - Classify items like "Rent" as expenses, but if there are asset purchases (e.g., Computers, Furniture), classify them as Non-Current Assets.
   - Calculate Retained Earnings (Equity) based on the Net Profit.
   - Ensure the Balance Sheet balances (Assets = Liabilities + Equity).

3. Provide an "Independent Auditor's Opinion" summarizing the financial state and compliance.

4. Provide "Notes to the Accounts" explaining the basis of preparation.

Response Format: Return ONLY valid JSON matching the schema provided."#
    )
}

fn line_items() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "description": { "type": "STRING" },
                "amount": { "type": "NUMBER" }
            },
            "required": ["description", "amount"]
        }
    })
}

/// Response schema for [`StructuredReport`]
pub fn report_schema() -> Value {
    let number = json!({ "type": "NUMBER" });
    json!({
        "type": "OBJECT",
        "properties": {
            "statementDate": { "type": "STRING" },
            "companyName": { "type": "STRING" },
            "auditorOpinion": { "type": "STRING" },
            "incomeStatement": {
                "type": "OBJECT",
                "properties": {
                    "revenueItems": line_items(),
                    "totalRevenue": number,
                    "costOfSalesItems": line_items(),
                    "totalCostOfSales": number,
                    "grossProfit": number,
                    "operatingExpenses": line_items(),
                    "totalOperatingExpenses": number,
                    "operatingProfit": number,
                    "taxation": number,
                    "netProfit": number
                },
                "required": [
                    "revenueItems", "totalRevenue", "costOfSalesItems", "totalCostOfSales",
                    "grossProfit", "operatingExpenses", "totalOperatingExpenses",
                    "operatingProfit", "taxation", "netProfit"
                ]
            },
            "balanceSheet": {
                "type": "OBJECT",
                "properties": {
                    "currentAssets": line_items(),
                    "nonCurrentAssets": line_items(),
                    "totalAssets": number,
                    "currentLiabilities": line_items(),
                    "nonCurrentLiabilities": line_items(),
                    "totalLiabilities": number,
                    "equityItems": line_items(),
                    "totalEquity": number
                },
                "required": [
                    "currentAssets", "nonCurrentAssets", "totalAssets", "currentLiabilities",
                    "nonCurrentLiabilities", "totalLiabilities", "equityItems", "totalEquity"
                ]
            },
            "notesToAccounts": { "type": "ARRAY", "items": { "type": "STRING" } }
        },
        "required": [
            "statementDate", "companyName", "auditorOpinion",
            "incomeStatement", "balanceSheet", "notesToAccounts"
        ]
    })
}

/// Parse the service reply, tolerating a fenced ```json block
pub fn parse_report(text: &str) -> Result<StructuredReport> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::ReportGenerationFailed(
            "the service returned no content".to_string(),
        ));
    }
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed);

    serde_json::from_str(body)
        .map_err(|e| LedgerError::ReportGenerationFailed(format!("invalid report JSON: {e}")))
}

/// Ask the service for audited statements over `transactions`.
///
/// An empty ledger is rejected before any call is made.
pub async fn generate(
    transactions: &[Transaction],
    company_name: &str,
    service: &dyn TextGenerator,
) -> Result<StructuredReport> {
    if transactions.is_empty() {
        return Err(LedgerError::EmptyLedger);
    }

    let prompt = build_prompt(company_name, &compact_transactions(transactions));
    let text = service
        .generate_json(&prompt, &report_schema())
        .await
        .map_err(|e| LedgerError::ReportGenerationFailed(e.to_string()))?;

    let mut report = parse_report(&text)?;
    report.generated_at = Utc::now();
    tracing::info!(
        statement_date = %report.statement_date,
        balanced = report.is_balanced(),
        "financial statements received"
    );
    Ok(report)
}
