mod document;
mod export;
mod format;
mod generator;
mod model;
mod text;

pub use document::{
    export_stem, render_document, Document, Footer, Letterhead, Row, RowGroup, RowStyle, Section,
    REPORT_TITLE,
};
pub use export::{export, ExportFormat, ExportOutcome};
pub use format::{format_money, format_signed};
pub use generator::{build_prompt, compact_transactions, generate, parse_report, report_schema};
pub use model::{BalanceSheet, IncomeStatement, LineItem, StructuredReport, BALANCE_TOLERANCE};
pub use text::{render_text, TEXT_WIDTH};
