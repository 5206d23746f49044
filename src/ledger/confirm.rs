use async_trait::async_trait;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::transaction::{Confirmation, Transaction};
use crate::config::{ConfirmationBackend, ConfirmationSettings};
use crate::error::{LedgerError, Result};

pub const HASH_PREFIX: &str = "tx_";
const HASH_DIGITS: usize = 56;

/// Range the simulated ledger index is drawn from
pub const LEDGER_INDEX_RANGE: std::ops::Range<u64> = 40_000_000..41_000_000;

/// Puts a transaction on an external ledger.
///
/// Implementations may take arbitrarily long and may reject with
/// [`LedgerError::ConfirmationFailed`]; the lifecycle controller maps a
/// rejection to the FAILED state.
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm(&self, transaction: &Transaction) -> Result<Confirmation>;
}

/// Placeholder digest: a 32-bit rolling checksum over the serialized
/// transaction and the given instant, rendered as zero-padded hex.
/// Not cryptographic.
pub fn pseudo_hash(transaction: &Transaction, instant_millis: i64) -> String {
    let serialized = serde_json::to_string(transaction).unwrap_or_default();
    let mut hash: i32 = 0;
    for c in serialized
        .chars()
        .chain(instant_millis.to_string().chars())
    {
        hash = hash.wrapping_shl(5).wrapping_sub(hash).wrapping_add(c as i32);
    }
    format!(
        "{HASH_PREFIX}{:0>width$x}",
        hash.unsigned_abs(),
        width = HASH_DIGITS
    )
}

/// Stand-in for a consensus network: waits a fixed delay, then confirms
pub struct SimulatedConfirmer {
    delay: Duration,
}

impl SimulatedConfirmer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Confirmer for SimulatedConfirmer {
    async fn confirm(&self, transaction: &Transaction) -> Result<Confirmation> {
        tokio::time::sleep(self.delay).await;
        let now = chrono::Utc::now().timestamp_millis();
        let ledger_index = rand::thread_rng().gen_range(LEDGER_INDEX_RANGE);
        Ok(Confirmation {
            confirmation_hash: pseudo_hash(transaction, now),
            ledger_index,
        })
    }
}

/// Reproducible confirmer: sequential ledger indexes, instant-independent
/// hashes, and scripted failures by description.
pub struct DeterministicConfirmer {
    delay: Duration,
    next_index: AtomicU64,
    failing: Vec<String>,
}

impl DeterministicConfirmer {
    pub fn new() -> Self {
        Self {
            delay: Duration::ZERO,
            next_index: AtomicU64::new(LEDGER_INDEX_RANGE.start),
            failing: Vec::new(),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Reject every transaction whose description equals `description`
    pub fn failing_on(mut self, description: impl Into<String>) -> Self {
        self.failing.push(description.into());
        self
    }
}

impl Default for DeterministicConfirmer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Confirmer for DeterministicConfirmer {
    async fn confirm(&self, transaction: &Transaction) -> Result<Confirmation> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing.iter().any(|d| *d == transaction.description) {
            return Err(LedgerError::ConfirmationFailed(format!(
                "ledger rejected '{}'",
                transaction.description
            )));
        }
        Ok(Confirmation {
            confirmation_hash: pseudo_hash(transaction, 0),
            ledger_index: self.next_index.fetch_add(1, Ordering::SeqCst),
        })
    }
}

/// Network-backed confirmer: POSTs the transaction as JSON and expects
/// `{"confirmationHash": ..., "ledgerIndex": ...}` back.
pub struct RemoteConfirmer {
    endpoint: String,
    timeout: Duration,
}

impl RemoteConfirmer {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
        }
    }

    fn submit(endpoint: &str, timeout: Duration, body: String) -> Result<Confirmation> {
        use ureq::Agent;

        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();

        let text = agent
            .post(endpoint)
            .header("content-type", "application/json")
            .send(body)
            .map_err(|e| LedgerError::ConfirmationFailed(e.to_string()))?
            .body_mut()
            .read_to_string()
            .map_err(|e| LedgerError::ConfirmationFailed(e.to_string()))?;

        let confirmation: Confirmation = serde_json::from_str(&text)
            .map_err(|e| LedgerError::ConfirmationFailed(format!("malformed response: {e}")))?;
        if confirmation.confirmation_hash.is_empty() {
            return Err(LedgerError::ConfirmationFailed(
                "response carried an empty hash".to_string(),
            ));
        }
        Ok(confirmation)
    }
}

#[async_trait]
impl Confirmer for RemoteConfirmer {
    async fn confirm(&self, transaction: &Transaction) -> Result<Confirmation> {
        let body = serde_json::to_string(transaction)
            .map_err(|e| LedgerError::ConfirmationFailed(e.to_string()))?;
        let endpoint = self.endpoint.clone();
        let timeout = self.timeout;

        tracing::debug!(%endpoint, id = %transaction.id, "submitting transaction for confirmation");
        tokio::task::spawn_blocking(move || Self::submit(&endpoint, timeout, body))
            .await
            .map_err(|e| LedgerError::ConfirmationFailed(e.to_string()))?
    }
}

/// Build the confirmer named by the `[confirmation]` config section
pub fn confirmer_from_settings(settings: &ConfirmationSettings) -> Result<Arc<dyn Confirmer>> {
    let delay = Duration::from_millis(settings.delay_ms);
    let confirmer: Arc<dyn Confirmer> = match settings.backend {
        ConfirmationBackend::Simulated => Arc::new(SimulatedConfirmer::new(delay)),
        ConfirmationBackend::Deterministic => {
            Arc::new(DeterministicConfirmer::new().with_delay(delay))
        }
        ConfirmationBackend::Remote => {
            let endpoint = settings.endpoint.clone().ok_or_else(|| {
                LedgerError::InvalidConfig(
                    "confirmation.endpoint is required for the remote backend".to_string(),
                )
            })?;
            Arc::new(RemoteConfirmer::new(
                endpoint,
                Duration::from_secs(settings.timeout_secs),
            ))
        }
    };
    Ok(confirmer)
}
