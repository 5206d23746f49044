use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::document::{export_stem, Document};
use super::text::render_text;
use crate::config::ExportSettings;
use crate::error::{LedgerError, Result};
use crate::pdf::{export_pdf, print_document};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Text,
    Print,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Pdf => write!(f, "PDF"),
            ExportFormat::Text => write!(f, "TEXT"),
            ExportFormat::Print => write!(f, "PRINT"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "text" | "txt" => Ok(ExportFormat::Text),
            "print" => Ok(ExportFormat::Print),
            _ => Err(LedgerError::InvalidConfig(format!(
                "unknown export format '{s}' (use pdf, text or print)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Saved(PathBuf),
    Printed,
}

/// Produce one export artifact from the document tree. Blocking.
pub fn export(
    doc: &Document,
    statement_date: &str,
    format: ExportFormat,
    output_dir: &Path,
    settings: &ExportSettings,
) -> Result<ExportOutcome> {
    let stem = export_stem(statement_date);
    match format {
        ExportFormat::Text => {
            std::fs::create_dir_all(output_dir)?;
            let path = output_dir.join(format!("{stem}.txt"));
            std::fs::write(&path, render_text(doc))?;
            Ok(ExportOutcome::Saved(path))
        }
        ExportFormat::Pdf => {
            let path = output_dir.join(format!("{stem}.pdf"));
            export_pdf(doc, &path, settings.raster_scale)?;
            Ok(ExportOutcome::Saved(path))
        }
        ExportFormat::Print => {
            print_document(doc, settings.print_command.as_deref())?;
            Ok(ExportOutcome::Printed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::document::render_document;
    use crate::report::model::fixtures::acme_report;
    use tempfile::TempDir;

    #[test]
    fn formats_parse_case_insensitively() {
        assert_eq!("PDF".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert_eq!("txt".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert_eq!("Print".parse::<ExportFormat>().unwrap(), ExportFormat::Print);
        assert!("docx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn text_export_writes_named_file() {
        let dir = TempDir::new().unwrap();
        let report = acme_report();
        let doc = render_document(&report, "₦");

        let outcome = export(
            &doc,
            &report.statement_date,
            ExportFormat::Text,
            dir.path(),
            &ExportSettings::default(),
        )
        .unwrap();

        let expected = dir.path().join("Financial_Statements_31_October_2023.txt");
        assert_eq!(outcome, ExportOutcome::Saved(expected.clone()));
        let content = std::fs::read_to_string(expected).unwrap();
        assert!(content.starts_with("ACME CORP LTD\n"));
    }
}
