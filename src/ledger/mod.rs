pub mod fiken;
pub mod snapshot;

use chrono::NaiveDate;

use crate::error::{KassaflytError, Result};
use crate::models::{JournalEntry, Transaction};

/// Source of journal entries and transaction detail. Implementations own
/// their retry policy; a returned error is final.
pub trait Ledger {
    /// Every journal entry dated within the window, bounds inclusive.
    fn list_journal_entries(&self, window: &DateWindow) -> Result<Vec<JournalEntry>>;

    fn get_transaction(&self, id: i64) -> Result<Transaction>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateWindow {
    pub fn parse(from: &str, to: &str) -> Result<Self> {
        let from = parse_date(from)?;
        let to = parse_date(to)?;
        if from > to {
            return Err(KassaflytError::InvalidDate(format!(
                "--from {from} is after --to {to}"
            )));
        }
        Ok(Self { from, to })
    }

    pub fn contains(&self, date: &str) -> bool {
        match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
            Ok(d) => d >= self.from && d <= self.to,
            Err(_) => false,
        }
    }

    /// `2025-10-01_to_2025-10-31`, used in output file names.
    pub fn slug(&self) -> String {
        format!("{}_to_{}", self.from, self.to)
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| KassaflytError::InvalidDate(format!("{raw} (expected YYYY-MM-DD)")))
}
