use chrono::Local;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::advisor::{suggest_category, TaxAdvisor};
use crate::ai::{ChatTurn, TextGenerator};
use crate::audit::{AuditAction, AuditLogEntry, AuditTrail};
use crate::config::Config;
use crate::error::{LedgerError, Result};
use crate::ledger::{
    export_filename, summarize, write_csv, Confirmer, FilterCriteria, FinancialSummary,
    LedgerController, LedgerStore, NewTransaction, Transaction,
};
use crate::plan::{require, Feature, Plan};
use crate::report::{
    export, export_stem, generate, render_document, Document, ExportFormat, ExportOutcome,
    StructuredReport,
};

/// The signed-in user
#[derive(Debug, Clone)]
pub struct Principal {
    pub email: String,
    /// Local part of the email, recorded on every audit entry
    pub user: String,
    pub business_name: String,
    pub plan: Plan,
}

#[derive(Debug, Clone)]
pub struct CsvExport {
    pub path: PathBuf,
    pub rows: usize,
    pub filtered: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ReportStatus {
    pub balanced: bool,
    /// Total assets minus equity and liabilities
    pub imbalance: f64,
}

/// Application state for one signed-in session.
///
/// Owns the ledger, the audit trail, the current report and the advisor
/// conversation. Every entry point checks the plan first.
pub struct Session {
    config: Config,
    principal: Principal,
    output_dir: PathBuf,
    audit: AuditTrail,
    ledger: LedgerController,
    ai: Arc<dyn TextGenerator>,
    advisor: TaxAdvisor,
    report: Option<StructuredReport>,
}

impl Session {
    /// Sign in: records USER_LOGIN then SYSTEM_STARTUP
    pub async fn start(
        config: Config,
        output_dir: PathBuf,
        confirmer: Arc<dyn Confirmer>,
        ai: Arc<dyn TextGenerator>,
    ) -> Self {
        let settings = &config.session;
        let principal = Principal {
            email: settings.email.clone(),
            user: settings.user(),
            business_name: settings.display_business_name(&config.company.name),
            plan: settings.plan,
        };

        let audit = AuditTrail::new(principal.user.clone());
        let store = if settings.seed_samples {
            LedgerStore::with_samples()
        } else {
            LedgerStore::new()
        };
        let ledger = LedgerController::new(store, audit.clone(), confirmer)
            .with_currency_symbol(config.company.currency_symbol.clone());
        let advisor = TaxAdvisor::new(Arc::clone(&ai), audit.clone());

        audit
            .record(
                AuditAction::UserLogin,
                format!("User logged in with {} Plan", principal.plan),
                None,
            )
            .await;
        audit
            .record(
                AuditAction::SystemStartup,
                "Application initialized successfully",
                None,
            )
            .await;
        tracing::info!(user = %principal.user, plan = %principal.plan, "session started");

        Self {
            config,
            principal,
            output_dir,
            audit,
            ledger,
            ai,
            advisor,
            report: None,
        }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn plan(&self) -> Plan {
        self.principal.plan
    }

    pub fn currency_symbol(&self) -> &str {
        &self.config.company.currency_symbol
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub async fn add_transaction(&self, input: NewTransaction) -> Result<Transaction> {
        require(self.plan(), Feature::Ledger)?;
        self.ledger.create(input).await
    }

    pub async fn suggest_category(&self, description: &str) -> Result<String> {
        require(self.plan(), Feature::CategorySuggestion)?;
        let description = description.trim();
        if description.is_empty() {
            return Err(LedgerError::EmptyDescription);
        }
        Ok(suggest_category(self.ai.as_ref(), &self.audit, description).await)
    }

    /// Ledger view, filtered when any criterion is active
    pub async fn transactions(&self, criteria: &FilterCriteria) -> Result<Vec<Transaction>> {
        require(self.plan(), Feature::Ledger)?;
        Ok(self.ledger.filter(criteria).await)
    }

    /// Wait for every pending confirmation to settle
    pub async fn wait_for_confirmations(&self) -> usize {
        let pending = self.ledger.pending_count().await;
        self.ledger.settle().await;
        pending
    }

    pub async fn summary(&self) -> Result<FinancialSummary> {
        require(self.plan(), Feature::Dashboard)?;
        Ok(summarize(&self.ledger.snapshot().await))
    }

    /// Write the ledger CSV: the filtered view when filters are active,
    /// otherwise every transaction.
    pub async fn export_csv(&self, criteria: &FilterCriteria) -> Result<CsvExport> {
        require(self.plan(), Feature::Ledger)?;
        let filtered = criteria.is_active();
        let rows = self.ledger.filter(criteria).await;

        std::fs::create_dir_all(&self.output_dir)?;
        let path = self
            .output_dir
            .join(export_filename(Local::now().date_naive()));
        write_csv(File::create(&path)?, &rows)?;

        let (action, details) = if filtered {
            (
                AuditAction::ExportData,
                format!("Exported {} transactions to CSV", rows.len()),
            )
        } else {
            (
                AuditAction::ExportCsv,
                "Downloaded full ledger as CSV".to_string(),
            )
        };
        self.audit.record(action, details, None).await;
        tracing::info!(path = %path.display(), rows = rows.len(), filtered, "ledger exported");

        Ok(CsvExport {
            path,
            rows: rows.len(),
            filtered,
        })
    }

    /// Generate statements for the current ledger, replacing any earlier
    /// report. A failed attempt keeps the previous report.
    pub async fn generate_report(&mut self) -> Result<ReportStatus> {
        require(self.plan(), Feature::Reports)?;
        let transactions = self.ledger.snapshot().await;
        if transactions.is_empty() {
            return Err(LedgerError::EmptyLedger);
        }

        self.audit
            .record(
                AuditAction::GenerateReport,
                "Initiated AI generation of Financial Statement",
                None,
            )
            .await;

        let report =
            match generate(&transactions, &self.principal.business_name, self.ai.as_ref()).await {
                Ok(report) => report,
                Err(e) => {
                    tracing::warn!(error = %e, "report generation failed");
                    self.audit
                        .record(
                            AuditAction::ReportFailed,
                            "Failed to generate financial report",
                            None,
                        )
                        .await;
                    return Err(e);
                }
            };

        self.audit
            .record(
                AuditAction::ReportSuccess,
                format!(
                    "Financial Report generated successfully for {}",
                    report.statement_date
                ),
                None,
            )
            .await;

        let status = ReportStatus {
            balanced: report.is_balanced(),
            imbalance: report.balance_sheet.imbalance(),
        };
        if !status.balanced {
            tracing::warn!(
                imbalance = status.imbalance,
                "statement of financial position does not balance"
            );
            self.audit
                .record(
                    AuditAction::ReportImbalanced,
                    format!(
                        "Statement of financial position out of balance by {:.2}",
                        status.imbalance
                    ),
                    None,
                )
                .await;
        }

        self.report = Some(report);
        Ok(status)
    }

    pub fn report(&self) -> Result<&StructuredReport> {
        self.report.as_ref().ok_or(LedgerError::NoReport)
    }

    /// Document tree of the current report
    pub fn document(&self) -> Result<Document> {
        require(self.plan(), Feature::Reports)?;
        Ok(render_document(self.report()?, self.currency_symbol()))
    }

    pub async fn export_report(&self, format: ExportFormat) -> Result<ExportOutcome> {
        let doc = self.document()?;
        let statement_date = self.report()?.statement_date.clone();

        match format {
            ExportFormat::Pdf => {
                self.audit
                    .record(
                        AuditAction::DownloadPdf,
                        "Started PDF generation for financial report",
                        None,
                    )
                    .await;
                match self.run_export(doc, statement_date.clone(), format).await {
                    Ok(outcome) => {
                        self.audit
                            .record(
                                AuditAction::DownloadComplete,
                                format!("PDF downloaded: {}.pdf", export_stem(&statement_date)),
                                None,
                            )
                            .await;
                        Ok(outcome)
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "PDF export failed");
                        self.audit
                            .record(AuditAction::DownloadError, "Failed to generate PDF", None)
                            .await;
                        let reason = match e {
                            LedgerError::PdfExport(msg) => msg,
                            other => other.to_string(),
                        };
                        Err(LedgerError::PdfExport(format!(
                            "{reason}. Could not generate PDF automatically; \
                             try 'report export --format print' to print or save as PDF."
                        )))
                    }
                }
            }
            ExportFormat::Text => {
                let outcome = self.run_export(doc, statement_date, format).await?;
                self.audit
                    .record(
                        AuditAction::DownloadText,
                        "Downloaded report as text file",
                        None,
                    )
                    .await;
                Ok(outcome)
            }
            ExportFormat::Print => {
                self.audit
                    .record(
                        AuditAction::PrintReport,
                        "Initiated print of financial report",
                        None,
                    )
                    .await;
                self.run_export(doc, statement_date, format).await
            }
        }
    }

    async fn run_export(
        &self,
        doc: Document,
        statement_date: String,
        format: ExportFormat,
    ) -> Result<ExportOutcome> {
        let output_dir = self.output_dir.clone();
        let settings = self.config.export.clone();
        tokio::task::spawn_blocking(move || {
            export(&doc, &statement_date, format, &output_dir, &settings)
        })
        .await
        .map_err(|e| LedgerError::PdfExport(e.to_string()))?
    }

    pub async fn ask_tax_advisor(&mut self, question: &str) -> Result<String> {
        require(self.plan(), Feature::TaxAdvisor)?;
        self.advisor.ask(question).await
    }

    pub async fn estimate_tax(&mut self, revenue: f64, expenses: f64) -> Result<String> {
        require(self.plan(), Feature::TaxAdvisor)?;
        self.advisor.estimate_tax(revenue, expenses).await
    }

    pub fn advisor_history(&self) -> Result<&[ChatTurn]> {
        require(self.plan(), Feature::TaxAdvisor)?;
        Ok(self.advisor.history())
    }

    /// Audit entries, most recent first
    pub async fn audit_log(&self) -> Result<Vec<AuditLogEntry>> {
        require(self.plan(), Feature::AuditLog)?;
        Ok(self.audit.recent_first().await)
    }

    /// Handle to the trail, ungated
    pub fn audit(&self) -> &AuditTrail {
        &self.audit
    }

    /// Sign out. Confirmations still in flight are abandoned.
    pub async fn logout(self) {
        self.audit
            .record(AuditAction::UserLogout, "User logged out", None)
            .await;
        let pending = self.ledger.pending_count().await;
        if pending > 0 {
            tracing::info!(pending, "abandoning unconfirmed transactions");
        }
    }
}
