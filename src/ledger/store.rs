use chrono::NaiveDate;

use super::transaction::{Confirmation, Transaction, TransactionType};
use crate::error::{LedgerError, Result};

/// In-memory, insertion-ordered ledger. Entries are never removed.
#[derive(Debug, Default, Clone)]
pub struct LedgerStore {
    transactions: Vec<Transaction>,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the two confirmed demo entries
    pub fn with_samples() -> Self {
        let mut store = Self::new();
        for tx in sample_transactions() {
            store.append(tx);
        }
        store
    }

    pub fn append(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    /// Swap the entry with `id` for `transaction`, keeping its position
    pub fn replace(&mut self, id: &str, transaction: Transaction) -> Result<()> {
        let slot = self
            .transactions
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| LedgerError::UnknownTransaction(id.to_string()))?;
        *slot = transaction;
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn snapshot(&self) -> Vec<Transaction> {
        self.transactions.clone()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

fn sample_transactions() -> Vec<Transaction> {
    let samples = [
        (
            "tx_1",
            (2023, 10, 24),
            "Consulting Revenue - Client A",
            450000.0,
            TransactionType::Income,
            "Sales",
            "tx_8f43g87g8743g87f4387f3487f",
        ),
        (
            "tx_2",
            (2023, 10, 25),
            "Office Rent Payment",
            120000.0,
            TransactionType::Expense,
            "Rent",
            "tx_98g78g787g87g87g87g87g87",
        ),
    ];

    samples
        .into_iter()
        .enumerate()
        .filter_map(|(i, (id, (y, m, d), desc, amount, kind, category, hash))| {
            let date = NaiveDate::from_ymd_opt(y, m, d)?;
            Transaction::pending(
                id.to_string(),
                date,
                desc.to_string(),
                amount,
                kind,
                category.to_string(),
            )
            .confirm(Confirmation {
                confirmation_hash: hash.to_string(),
                ledger_index: 40_000_000 + i as u64,
            })
            .ok()
        })
        .collect()
}
