use chrono::Local;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinSet;

use super::confirm::Confirmer;
use super::filter::{filter, FilterCriteria};
use super::store::LedgerStore;
use super::transaction::{NewTransaction, Transaction, TransactionStatus};
use crate::audit::{AuditAction, AuditTrail};
use crate::error::{LedgerError, Result};
use crate::util::ids::new_id;

/// Drives transactions from optimistic insert to a confirmed or failed record.
///
/// `create` returns as soon as the pending entry is in the store; the
/// confirmation runs as a background task that writes the outcome back and
/// audits it. Dropping the controller abandons confirmations still in flight.
pub struct LedgerController {
    store: Arc<RwLock<LedgerStore>>,
    audit: AuditTrail,
    confirmer: Arc<dyn Confirmer>,
    currency_symbol: String,
    in_flight: Mutex<JoinSet<()>>,
}

impl LedgerController {
    pub fn new(store: LedgerStore, audit: AuditTrail, confirmer: Arc<dyn Confirmer>) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            audit,
            confirmer,
            currency_symbol: "₦".to_string(),
            in_flight: Mutex::new(JoinSet::new()),
        }
    }

    pub fn with_currency_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.currency_symbol = symbol.into();
        self
    }

    /// Validate, insert as PENDING, audit, and start confirmation
    pub async fn create(&self, input: NewTransaction) -> Result<Transaction> {
        let valid = input.validate()?;
        let tx = Transaction::pending(
            new_id(),
            Local::now().date_naive(),
            valid.description,
            valid.amount,
            valid.kind,
            valid.category,
        );

        self.store.write().await.append(tx.clone());
        self.audit
            .record(
                AuditAction::CreateTransaction,
                format!(
                    "Initiated {} transaction: {} ({}{})",
                    tx.kind, tx.description, self.currency_symbol, tx.amount
                ),
                Some(&tx.id),
            )
            .await;
        tracing::info!(id = %tx.id, kind = %tx.kind, amount = tx.amount, "transaction pending");

        let store = Arc::clone(&self.store);
        let audit = self.audit.clone();
        let confirmer = Arc::clone(&self.confirmer);
        let pending = tx.clone();

        let mut in_flight = self.in_flight.lock().await;
        while in_flight.try_join_next().is_some() {}
        in_flight.spawn(async move {
            finish_confirmation(store, audit, confirmer, pending).await;
        });

        Ok(tx)
    }

    /// Wait for every confirmation started so far to settle
    pub async fn settle(&self) {
        let mut in_flight = std::mem::take(&mut *self.in_flight.lock().await);
        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "confirmation task did not complete");
            }
        }
    }

    pub async fn snapshot(&self) -> Vec<Transaction> {
        self.store.read().await.snapshot()
    }

    pub async fn get(&self, id: &str) -> Option<Transaction> {
        self.store.read().await.get(id).cloned()
    }

    /// Filtered view of the current ledger, in ledger order
    pub async fn filter(&self, criteria: &FilterCriteria) -> Vec<Transaction> {
        let snapshot = self.snapshot().await;
        filter(&snapshot, criteria)
    }

    pub async fn pending_count(&self) -> usize {
        self.snapshot()
            .await
            .iter()
            .filter(|t| t.status() == TransactionStatus::Pending)
            .count()
    }

    pub fn audit(&self) -> &AuditTrail {
        &self.audit
    }
}

enum Outcome {
    Confirmed(u64),
    Failed(String),
}

async fn finish_confirmation(
    store: Arc<RwLock<LedgerStore>>,
    audit: AuditTrail,
    confirmer: Arc<dyn Confirmer>,
    pending: Transaction,
) {
    let id = pending.id.clone();
    let outcome = match confirmer.confirm(&pending).await {
        Ok(confirmation) => {
            let ledger_index = confirmation.ledger_index;
            apply(&store, &id, |tx| tx.confirm(confirmation))
                .await
                .map(|_| Outcome::Confirmed(ledger_index))
        }
        Err(e) => {
            tracing::warn!(id = %id, error = %e, "confirmation rejected");
            let reason = e.to_string();
            let applied = apply(&store, &id, |tx| tx.fail(reason.clone())).await;
            applied.map(|_| Outcome::Failed(reason))
        }
    };

    match outcome {
        Ok(Outcome::Confirmed(ledger_index)) => {
            tracing::info!(id = %id, ledger_index, "transaction confirmed");
            audit
                .record(
                    AuditAction::BlockchainConfirmation,
                    format!("Transaction confirmed on ledger #{ledger_index}"),
                    Some(&id),
                )
                .await;
        }
        Ok(Outcome::Failed(reason)) => {
            audit
                .record(
                    AuditAction::TransactionFailed,
                    format!(
                        "Failed to record transaction on ledger: {} ({reason})",
                        pending.description
                    ),
                    Some(&id),
                )
                .await;
        }
        Err(e) => {
            tracing::error!(id = %id, error = %e, "could not apply confirmation outcome");
        }
    }
}

/// Transition the stored copy of `id` under the write lock
async fn apply<F>(store: &RwLock<LedgerStore>, id: &str, transition: F) -> Result<()>
where
    F: FnOnce(Transaction) -> Result<Transaction>,
{
    let mut store = store.write().await;
    let current = store
        .get(id)
        .cloned()
        .ok_or_else(|| LedgerError::UnknownTransaction(id.to_string()))?;
    let next = transition(current)?;
    store.replace(id, next)
}
