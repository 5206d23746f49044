use std::path::PathBuf;
use thiserror::Error;

use crate::ledger::TransactionStatus;
use crate::plan::{Feature, Plan};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Config directory not found at {0}. Run 'ledgerbook init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Invalid amount '{0}': must be a positive number")]
    InvalidAmount(String),

    #[error("Description must not be empty")]
    EmptyDescription,

    #[error("Unterminated quote in command line")]
    UnterminatedQuote,

    #[error("Question must not be empty")]
    EmptyQuestion,

    #[error("Invalid date '{0}'. Use YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("Invalid transaction type '{0}'. Use 'income' or 'expense'.")]
    InvalidType(String),

    #[error("Unknown plan '{0}'. Use 'SME', 'Startup', or 'Enterprise'.")]
    InvalidPlan(String),

    #[error("Transaction '{0}' not found in ledger")]
    UnknownTransaction(String),

    #[error("Transaction '{id}' is already {status} and cannot transition again")]
    InvalidTransition { id: String, status: TransactionStatus },

    #[error("Confirmation failed: {0}")]
    ConfirmationFailed(String),

    #[error("Please add transactions before generating a report.")]
    EmptyLedger,

    #[error("Failed to generate financial report: {0}")]
    ReportGenerationFailed(String),

    #[error("No financial statement generated yet. Run 'report generate' first.")]
    NoReport,

    #[error("AI service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("{feature} is not available on the {plan} plan (upgrade to {upgrade})")]
    FeatureLocked {
        feature: Feature,
        plan: Plan,
        upgrade: Plan,
    },

    #[error("Typst not found. Install it from https://typst.app/ or run: cargo install typst-cli")]
    TypstNotFound,

    #[error("Failed to export PDF: {0}")]
    PdfExport(String),

    #[error("Failed to send document to printer: {0}")]
    PrintFailed(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
