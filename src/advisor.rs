use std::sync::Arc;

use crate::ai::{ChatTurn, TextGenerator};
use crate::audit::{AuditAction, AuditTrail};
use crate::error::{LedgerError, Result};
use crate::ledger::DEFAULT_CATEGORY;
use crate::report::format_money;

pub const SYSTEM_INSTRUCTION: &str = "You are 'LedgerBot', a helpful AI Accountant for Nigerian \
businesses. You know about FIRS, VAT (7.5%), CIT (30% for large, 20% for medium, 0% for small), \
and Withholding Tax. Keep answers professional but accessible to SMEs.";

pub const GREETING: &str = "Hello! I am LedgerBot, your AI Tax Consultant. How can I help you \
regarding Nigerian tax laws (CAMA, VAT, CIT) or accounting standards today?";

/// Reply used when the service call fails
pub const HIGH_TRAFFIC_REPLY: &str =
    "I am currently experiencing high traffic. Please try again later.";

/// Reply used when the service answers with no text
pub const EMPTY_REPLY: &str = "I apologize, I could not generate a response at this time.";

/// Category used when the suggestion comes back empty
pub const UNCATEGORIZED: &str = "Uncategorized";

const QUERY_PREVIEW_CHARS: usize = 60;

/// Tax-advice conversation for one session
pub struct TaxAdvisor {
    service: Arc<dyn TextGenerator>,
    audit: AuditTrail,
    history: Vec<ChatTurn>,
}

impl TaxAdvisor {
    pub fn new(service: Arc<dyn TextGenerator>, audit: AuditTrail) -> Self {
        Self {
            service,
            audit,
            history: vec![ChatTurn::assistant(GREETING)],
        }
    }

    /// Conversation so far, opening with the greeting
    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    pub async fn ask(&mut self, question: &str) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(LedgerError::EmptyQuestion);
        }
        Ok(self.send(question, AuditAction::TaxConsultation).await)
    }

    /// Ask for a CIT / education tax / VAT assessment of the given figures
    pub async fn estimate_tax(&mut self, revenue: f64, expenses: f64) -> Result<String> {
        for value in [revenue, expenses] {
            if !value.is_finite() || value < 0.0 {
                return Err(LedgerError::InvalidAmount(value.to_string()));
            }
        }
        let prompt = tax_estimate_prompt(revenue, expenses);
        Ok(self.send(&prompt, AuditAction::TaxCalculation).await)
    }

    async fn send(&mut self, message: &str, action: AuditAction) -> String {
        let preview: String = message.chars().take(QUERY_PREVIEW_CHARS).collect();
        self.audit
            .record(action, format!("User Query: {preview}..."), None)
            .await;

        let reply = match self
            .service
            .chat(SYSTEM_INSTRUCTION, &self.history, message)
            .await
        {
            Ok(text) if text.trim().is_empty() => EMPTY_REPLY.to_string(),
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "tax advice unavailable");
                HIGH_TRAFFIC_REPLY.to_string()
            }
        };

        self.history.push(ChatTurn::user(message));
        self.history.push(ChatTurn::assistant(reply.clone()));
        reply
    }
}

pub fn tax_estimate_prompt(revenue: f64, expenses: f64) -> String {
    format!(
        "I need a tax assessment for a Nigerian business with the following annual figures:

- Total Revenue: ₦{revenue}
- Total Allowable Expenses: ₦{expenses}

Please calculate and explain the estimated liability for:
1. Companies Income Tax (CIT) - Determine if Small (0%), Medium (20%), or Large (30%) company based on revenue.
2. Tertiary Education Tax (2.5% of Assessable Profit).
3. VAT (Value Added Tax) implications (Assuming standard 7.5% on revenue if applicable).

Provide a clear summary of total estimated tax payable.",
        revenue = format_figure(revenue),
        expenses = format_figure(expenses),
    )
}

/// Grouped figure, keeping two decimals only when present
fn format_figure(value: f64) -> String {
    let grouped = format_money(value, "");
    match grouped.strip_suffix(".00") {
        Some(whole) => whole.to_string(),
        None => grouped,
    }
}

/// One-word category for a transaction description.
///
/// Never fails: an empty reply yields "Uncategorized" and a failed call
/// falls back to the default category.
pub async fn suggest_category(
    service: &dyn TextGenerator,
    audit: &AuditTrail,
    description: &str,
) -> String {
    let prompt = format!(
        "Categorize this transaction description into one word \
         (e.g., Marketing, Utilities, Payroll, Inventory, Sales, Logistics): \"{description}\""
    );
    let suggested = match service.complete(&prompt, 10, 0.2).await {
        Ok(text) => match text.trim() {
            "" => UNCATEGORIZED.to_string(),
            word => word.to_string(),
        },
        Err(e) => {
            tracing::warn!(error = %e, "category suggestion unavailable");
            DEFAULT_CATEGORY.to_string()
        }
    };

    audit
        .record(
            AuditAction::AiCategorization,
            format!("Suggested category '{suggested}' for description '{description}'"),
            None,
        )
        .await;
    suggested
}
