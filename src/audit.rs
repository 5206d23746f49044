use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::util::ids::new_id;

/// Domain events recorded in the audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    UserLogin,
    UserLogout,
    SystemStartup,
    CreateTransaction,
    BlockchainConfirmation,
    TransactionFailed,
    AiCategorization,
    ExportData,
    ExportCsv,
    GenerateReport,
    ReportSuccess,
    ReportFailed,
    ReportImbalanced,
    DownloadPdf,
    DownloadComplete,
    DownloadError,
    DownloadText,
    PrintReport,
    TaxConsultation,
    TaxCalculation,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::UserLogin => "USER_LOGIN",
            AuditAction::UserLogout => "USER_LOGOUT",
            AuditAction::SystemStartup => "SYSTEM_STARTUP",
            AuditAction::CreateTransaction => "CREATE_TRANSACTION",
            AuditAction::BlockchainConfirmation => "BLOCKCHAIN_CONFIRMATION",
            AuditAction::TransactionFailed => "TRANSACTION_FAILED",
            AuditAction::AiCategorization => "AI_CATEGORIZATION",
            AuditAction::ExportData => "EXPORT_DATA",
            AuditAction::ExportCsv => "EXPORT_CSV",
            AuditAction::GenerateReport => "GENERATE_REPORT",
            AuditAction::ReportSuccess => "REPORT_SUCCESS",
            AuditAction::ReportFailed => "REPORT_FAILED",
            AuditAction::ReportImbalanced => "REPORT_IMBALANCED",
            AuditAction::DownloadPdf => "DOWNLOAD_PDF",
            AuditAction::DownloadComplete => "DOWNLOAD_COMPLETE",
            AuditAction::DownloadError => "DOWNLOAD_ERROR",
            AuditAction::DownloadText => "DOWNLOAD_TEXT",
            AuditAction::PrintReport => "PRINT_REPORT",
            AuditAction::TaxConsultation => "TAX_CONSULTATION",
            AuditAction::TaxCalculation => "TAX_CALCULATION",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub user: String,
    pub action: AuditAction,
    pub details: String,
    /// Transaction this event refers to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
}

/// Append-only event log shared by every component of a session.
///
/// Cloning yields another handle to the same log.
#[derive(Debug, Clone)]
pub struct AuditTrail {
    user: String,
    entries: Arc<RwLock<Vec<AuditLogEntry>>>,
}

impl AuditTrail {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub async fn record(
        &self,
        action: AuditAction,
        details: impl Into<String>,
        entity_id: Option<&str>,
    ) -> AuditLogEntry {
        let entry = AuditLogEntry {
            id: new_id(),
            timestamp: Utc::now(),
            user: self.user.clone(),
            action,
            details: details.into(),
            entity_id: entity_id.map(str::to_string),
        };
        tracing::debug!(%action, details = %entry.details, "audit");
        self.entries.write().await.push(entry.clone());
        entry
    }

    /// All entries in the order they were recorded
    pub async fn entries(&self) -> Vec<AuditLogEntry> {
        self.entries.read().await.clone()
    }

    pub async fn recent_first(&self) -> Vec<AuditLogEntry> {
        let mut entries = self.entries().await;
        entries.reverse();
        entries
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
