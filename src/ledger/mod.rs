mod confirm;
mod csv;
mod filter;
mod lifecycle;
mod store;
mod summary;
mod transaction;

pub use self::csv::{export_filename, read_csv, write_csv, LedgerCsvRecord};
pub use confirm::{
    confirmer_from_settings, pseudo_hash, Confirmer, DeterministicConfirmer, RemoteConfirmer,
    SimulatedConfirmer, HASH_PREFIX, LEDGER_INDEX_RANGE,
};
pub use filter::{filter, FilterCriteria};
pub use lifecycle::LedgerController;
pub use store::LedgerStore;
pub use summary::{summarize, FinancialSummary};
pub use transaction::{
    Confirmation, Lifecycle, NewTransaction, Transaction, TransactionStatus, TransactionType,
    ValidTransaction, DEFAULT_CATEGORY,
};
