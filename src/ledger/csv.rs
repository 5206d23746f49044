//! Ledger CSV export:
//! ID,Date,Description,Category,Type,Amount,Status,ConfirmationHash

use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use super::transaction::{Transaction, TransactionStatus, TransactionType};
use crate::error::Result;

/// One CSV row, as written by [`write_csv`] and read by [`read_csv`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerCsvRecord {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Type")]
    pub kind: TransactionType,
    #[serde(rename = "Amount")]
    pub amount: f64,
    #[serde(rename = "Status")]
    pub status: TransactionStatus,
    #[serde(rename = "ConfirmationHash")]
    pub confirmation_hash: String,
}

impl From<&Transaction> for LedgerCsvRecord {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: tx.id.clone(),
            date: tx.date,
            description: tx.description.clone(),
            category: tx.category.clone(),
            kind: tx.kind,
            amount: tx.amount,
            status: tx.status(),
            confirmation_hash: tx.confirmation_hash().unwrap_or_default().to_string(),
        }
    }
}

pub const HEADERS: [&str; 8] = [
    "ID",
    "Date",
    "Description",
    "Category",
    "Type",
    "Amount",
    "Status",
    "ConfirmationHash",
];

/// Write the header row and one row per transaction
pub fn write_csv<W: Write>(w: W, transactions: &[Transaction]) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(w);
    wtr.write_record(HEADERS)?;
    for tx in transactions {
        wtr.serialize(LedgerCsvRecord::from(tx))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn read_csv<R: Read>(r: R) -> Result<Vec<LedgerCsvRecord>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(r);
    let mut records = Vec::new();
    for rec in rdr.deserialize::<LedgerCsvRecord>() {
        records.push(rec?);
    }
    Ok(records)
}

/// `Transaction_Ledger_<date>.csv`
pub fn export_filename(date: NaiveDate) -> String {
    format!("Transaction_Ledger_{}.csv", date.format("%Y-%m-%d"))
}
