use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{LedgerError, Result};

pub const DEFAULT_CATEGORY: &str = "General";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Income,
    Expense,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Income => write!(f, "INCOME"),
            TransactionType::Expense => write!(f, "EXPENSE"),
        }
    }
}

impl FromStr for TransactionType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            _ => Err(LedgerError::InvalidType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Confirmed,
    Failed,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "PENDING"),
            TransactionStatus::Confirmed => write!(f, "CONFIRMED"),
            TransactionStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// Fields a confirmer hands back once a transaction is on the external ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    pub confirmation_hash: String,
    pub ledger_index: u64,
}

/// Lifecycle state. The confirmation fields only exist in the confirmed variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Lifecycle {
    Pending,
    Confirmed {
        #[serde(rename = "confirmationHash")]
        confirmation_hash: String,
        #[serde(rename = "ledgerIndex")]
        ledger_index: u64,
    },
    Failed {
        #[serde(default)]
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    pub description: String,
    /// Always non-negative; the sign comes from `kind`
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: String,
    #[serde(flatten)]
    lifecycle: Lifecycle,
}

impl Transaction {
    pub fn pending(
        id: String,
        date: NaiveDate,
        description: String,
        amount: f64,
        kind: TransactionType,
        category: String,
    ) -> Self {
        Self {
            id,
            date,
            description,
            amount,
            kind,
            category,
            lifecycle: Lifecycle::Pending,
        }
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn status(&self) -> TransactionStatus {
        match self.lifecycle {
            Lifecycle::Pending => TransactionStatus::Pending,
            Lifecycle::Confirmed { .. } => TransactionStatus::Confirmed,
            Lifecycle::Failed { .. } => TransactionStatus::Failed,
        }
    }

    pub fn confirmation_hash(&self) -> Option<&str> {
        match &self.lifecycle {
            Lifecycle::Confirmed {
                confirmation_hash, ..
            } => Some(confirmation_hash),
            _ => None,
        }
    }

    pub fn ledger_index(&self) -> Option<u64> {
        match self.lifecycle {
            Lifecycle::Confirmed { ledger_index, .. } => Some(ledger_index),
            _ => None,
        }
    }

    /// Amount with the sign implied by the transaction type
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }

    /// PENDING -> CONFIRMED
    pub fn confirm(mut self, confirmation: Confirmation) -> Result<Self> {
        self.ensure_pending()?;
        self.lifecycle = Lifecycle::Confirmed {
            confirmation_hash: confirmation.confirmation_hash,
            ledger_index: confirmation.ledger_index,
        };
        Ok(self)
    }

    /// PENDING -> FAILED
    pub fn fail(mut self, reason: impl Into<String>) -> Result<Self> {
        self.ensure_pending()?;
        self.lifecycle = Lifecycle::Failed {
            reason: reason.into(),
        };
        Ok(self)
    }

    fn ensure_pending(&self) -> Result<()> {
        match self.status() {
            TransactionStatus::Pending => Ok(()),
            status => Err(LedgerError::InvalidTransition {
                id: self.id.clone(),
                status,
            }),
        }
    }
}

/// Raw user input for a new ledger entry, validated by [`NewTransaction::validate`]
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub description: String,
    pub amount: String,
    pub kind: TransactionType,
    pub category: Option<String>,
}

/// Input that passed validation
#[derive(Debug, Clone)]
pub struct ValidTransaction {
    pub description: String,
    pub amount: f64,
    pub kind: TransactionType,
    pub category: String,
}

impl NewTransaction {
    pub fn validate(&self) -> Result<ValidTransaction> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(LedgerError::EmptyDescription);
        }

        let amount: f64 = self
            .amount
            .trim()
            .parse()
            .map_err(|_| LedgerError::InvalidAmount(self.amount.clone()))?;
        if !amount.is_finite() || amount <= 0.0 {
            return Err(LedgerError::InvalidAmount(self.amount.clone()));
        }

        let category = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY)
            .to_string();

        Ok(ValidTransaction {
            description: description.to_string(),
            amount,
            kind: self.kind,
            category,
        })
    }
}
