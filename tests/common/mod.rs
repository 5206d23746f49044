#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ledgerbook::ai::{ChatTurn, TextGenerator};
use ledgerbook::config::parse_config;
use ledgerbook::error::{LedgerError, Result};
use ledgerbook::ledger::DeterministicConfirmer;
use ledgerbook::{AuditAction, Config, Session};

/// Text generator that plays back queued replies and counts calls.
/// Once the queue is empty every call answers with empty text.
#[derive(Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String>>>,
    calls: AtomicUsize,
    last_history: Mutex<Vec<ChatTurn>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()))
    }

    pub fn fail(self) -> Self {
        self.push(Err(LedgerError::ServiceUnavailable(
            "scripted outage".to_string(),
        )))
    }

    fn push(self, reply: Result<String>) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_history(&self) -> Vec<ChatTurn> {
        self.last_history.lock().unwrap().clone()
    }

    fn next(&self) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(String::new()))
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate_json(&self, _prompt: &str, _schema: &serde_json::Value) -> Result<String> {
        self.next()
    }

    async fn chat(&self, _system: &str, history: &[ChatTurn], _message: &str) -> Result<String> {
        *self.last_history.lock().unwrap() = history.to_vec();
        self.next()
    }

    async fn complete(
        &self,
        _prompt: &str,
        _max_output_tokens: u32,
        _temperature: f32,
    ) -> Result<String> {
        self.next()
    }
}

pub fn config(plan: &str, seed_samples: bool) -> Config {
    parse_config(&format!(
        r#"
[company]
name = "Acme Corp Ltd"

[session]
email = "admin@acme.com"
plan = "{plan}"
seed_samples = {seed_samples}
"#
    ))
    .unwrap()
}

pub async fn session(
    plan: &str,
    seed_samples: bool,
    ai: Arc<ScriptedGenerator>,
    output_dir: &Path,
) -> Session {
    Session::start(
        config(plan, seed_samples),
        output_dir.to_path_buf(),
        Arc::new(DeterministicConfirmer::new()),
        ai,
    )
    .await
}

pub async fn actions(session: &Session) -> Vec<AuditAction> {
    session
        .audit()
        .entries()
        .await
        .iter()
        .map(|e| e.action)
        .collect()
}

/// Balanced statements for the two sample entries
pub const ACME_REPORT_JSON: &str = r#"{
  "companyName": "Acme Corp Ltd",
  "statementDate": "31 October 2023",
  "auditorOpinion": "In our opinion the financial statements give a true and fair view.",
  "incomeStatement": {
    "revenueItems": [{ "description": "Consulting Revenue", "amount": 450000 }],
    "totalRevenue": 450000,
    "costOfSalesItems": [],
    "totalCostOfSales": 0,
    "grossProfit": 450000,
    "operatingExpenses": [{ "description": "Rent", "amount": 120000 }],
    "totalOperatingExpenses": 120000,
    "operatingProfit": 330000,
    "taxation": 99000,
    "netProfit": 231000
  },
  "balanceSheet": {
    "currentAssets": [{ "description": "Cash and Cash Equivalents", "amount": 330000 }],
    "nonCurrentAssets": [],
    "totalAssets": 330000,
    "currentLiabilities": [{ "description": "Tax Payable", "amount": 99000 }],
    "nonCurrentLiabilities": [],
    "totalLiabilities": 99000,
    "equityItems": [{ "description": "Retained Earnings", "amount": 231000 }],
    "totalEquity": 231000
  },
  "notesToAccounts": [
    "The financial statements have been prepared in accordance with IFRS."
  ]
}"#;
