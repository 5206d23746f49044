pub mod advisor;
pub mod ai;
pub mod audit;
pub mod config;
pub mod error;
pub mod ledger;
pub mod pdf;
pub mod plan;
pub mod report;
pub mod session;
pub mod util;

pub use audit::{AuditAction, AuditLogEntry, AuditTrail};
pub use config::Config;
pub use error::{LedgerError, Result};
pub use ledger::{LedgerController, Transaction, TransactionStatus, TransactionType};
pub use plan::{Feature, Plan};
pub use report::{Document, StructuredReport};
pub use session::Session;
