// 📥 CSV Import - bring external transactions into the workspace
//
// Header: id,description,amount,date,category
// Blank ids get a UUID. Rows are deduplicated by content fingerprint, both
// within the file and against transactions already present.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::entities::{CategoryKey, Transaction};

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    id: String,
    description: String,
    amount: f64,
    date: NaiveDate,
    category: CategoryKey,
}

impl From<CsvRow> for Transaction {
    fn from(row: CsvRow) -> Self {
        let id = if row.id.trim().is_empty() {
            uuid::Uuid::new_v4().to_string()
        } else {
            row.id.trim().to_string()
        };

        Transaction {
            id,
            description: row.description,
            amount: row.amount,
            date: row.date,
            category: row.category,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    pub imported: Vec<Transaction>,
    pub duplicates: usize,
}

impl ImportReport {
    pub fn total_rows(&self) -> usize {
        self.imported.len() + self.duplicates
    }
}

/// Read transactions from any CSV source, skipping duplicates of `existing`
pub fn read_transactions<R: Read>(reader: R, existing: &[Transaction]) -> Result<ImportReport> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut seen: HashSet<String> = existing.iter().map(Transaction::fingerprint).collect();
    let mut report = ImportReport::default();

    for (index, result) in rdr.deserialize::<CsvRow>().enumerate() {
        // +2: header line and 1-based numbering
        let row = result.with_context(|| format!("Failed to deserialize transaction on line {}", index + 2))?;
        let transaction = Transaction::from(row);

        if seen.insert(transaction.fingerprint()) {
            report.imported.push(transaction);
        } else {
            report.duplicates += 1;
        }
    }

    Ok(report)
}

pub fn load_csv(csv_path: &Path, existing: &[Transaction]) -> Result<ImportReport> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open CSV file: {:?}", csv_path))?;

    let report = read_transactions(file, existing)?;

    info!(
        path = %csv_path.display(),
        imported = report.imported.len(),
        duplicates = report.duplicates,
        "csv import finished"
    );

    Ok(report)
}
