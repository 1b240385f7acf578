use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::aggregate::MonthlyReport;
use crate::error::Result;
use crate::fmt::major;
use crate::ledger::DateWindow;
use crate::models::ClassifiedRow;

#[derive(Serialize)]
struct LineRecord<'a> {
    date: &'a str,
    description: &'a str,
    #[serde(rename = "transactionId")]
    transaction_id: Option<i64>,
    #[serde(rename = "journalEntryId")]
    journal_entry_id: i64,
    transaction_type: &'a str,
    net_amount_nok: String,
    direction: String,
    category: &'static str,
    expense_accounts: String,
    has_reversals: &'static str,
}

impl<'a> From<&'a ClassifiedRow> for LineRecord<'a> {
    fn from(row: &'a ClassifiedRow) -> Self {
        Self {
            date: &row.date,
            description: &row.description,
            transaction_id: row.transaction_id,
            journal_entry_id: row.journal_entry_id,
            transaction_type: &row.transaction_type,
            net_amount_nok: major(row.amount),
            direction: row.direction.to_string(),
            category: row.category.label(),
            expense_accounts: row
                .expense_accounts
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(","),
            has_reversals: if row.has_reversal_marker { "Yes" } else { "No" },
        }
    }
}

#[derive(Serialize)]
struct MonthlyRecord {
    month: String,
    category: &'static str,
    inflow_nok: String,
    outflow_nok: String,
    net_nok: String,
    transaction_count: u64,
}

/// Write the line-level report. Returns the number of records written.
pub fn write_lines<W: Write>(rows: &[ClassifiedRow], writer: W) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(LineRecord::from(row))?;
    }
    if rows.is_empty() {
        wtr.write_record([
            "date",
            "description",
            "transactionId",
            "journalEntryId",
            "transaction_type",
            "net_amount_nok",
            "direction",
            "category",
            "expense_accounts",
            "has_reversals",
        ])?;
    }
    wtr.flush()?;
    Ok(rows.len())
}

/// Write the month × category report. Returns the number of records written.
pub fn write_monthly<W: Write>(report: &MonthlyReport, writer: W) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    let rows = report.rows();
    for r in &rows {
        wtr.serialize(MonthlyRecord {
            month: r.month.clone(),
            category: r.category.label(),
            inflow_nok: major(r.bucket.inflow),
            outflow_nok: major(r.bucket.outflow),
            net_nok: major(r.bucket.net()),
            transaction_count: r.bucket.count,
        })?;
    }
    if rows.is_empty() {
        wtr.write_record([
            "month",
            "category",
            "inflow_nok",
            "outflow_nok",
            "net_nok",
            "transaction_count",
        ])?;
    }
    wtr.flush()?;
    Ok(rows.len())
}

pub fn lines_path(dir: &Path, window: &DateWindow) -> PathBuf {
    dir.join(format!("fiken_net_transactions_{}.csv", window.slug()))
}

pub fn monthly_path(dir: &Path, window: &DateWindow) -> PathBuf {
    dir.join(format!("fiken_monthly_analysis_{}.csv", window.slug()))
}

fn create(path: &Path) -> Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(std::fs::File::create(path)?)
}

pub fn write_lines_file(rows: &[ClassifiedRow], path: &Path) -> Result<usize> {
    write_lines(rows, create(path)?)
}

pub fn write_monthly_file(report: &MonthlyReport, path: &Path) -> Result<usize> {
    write_monthly(report, create(path)?)
}
