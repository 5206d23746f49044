use chrono::NaiveDate;

use super::transaction::{Transaction, TransactionType};

/// Display/export filter over a ledger snapshot. Every set field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub kind: Option<TransactionType>,
    /// Case-insensitive substring of description or category
    pub search: Option<String>,
}

impl FilterCriteria {
    pub fn is_active(&self) -> bool {
        self.from.is_some()
            || self.to.is_some()
            || self.kind.is_some()
            || self.search.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Number of active predicates
    pub fn active_count(&self) -> usize {
        [
            self.from.is_some(),
            self.to.is_some(),
            self.kind.is_some(),
            self.search.as_deref().is_some_and(|s| !s.is_empty()),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        if self.from.is_some_and(|from| tx.date < from) {
            return false;
        }
        if self.to.is_some_and(|to| tx.date > to) {
            return false;
        }
        if self.kind.is_some_and(|kind| tx.kind != kind) {
            return false;
        }
        match self.search.as_deref() {
            Some(needle) if !needle.is_empty() => {
                let needle = needle.to_lowercase();
                tx.description.to_lowercase().contains(&needle)
                    || tx.category.to_lowercase().contains(&needle)
            }
            _ => true,
        }
    }
}

/// Transactions matching `criteria`, in ledger order
pub fn filter(transactions: &[Transaction], criteria: &FilterCriteria) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|tx| criteria.matches(tx))
        .cloned()
        .collect()
}
