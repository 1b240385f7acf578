use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{DateWindow, Ledger};
use crate::error::{KassaflytError, Result};
use crate::models::{JournalEntry, Transaction};

/// On-disk dump of journal entries and transactions, for offline runs.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub journal_entries: Vec<JournalEntry>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

pub struct SnapshotLedger {
    source: String,
    entries: Vec<JournalEntry>,
    transactions: HashMap<i64, Transaction>,
}

impl SnapshotLedger {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&content)?;
        Ok(Self::from_snapshot(&path.display().to_string(), snapshot))
    }

    pub fn from_snapshot(source: &str, snapshot: Snapshot) -> Self {
        let transactions = snapshot
            .transactions
            .into_iter()
            .map(|t| (t.id, t))
            .collect();
        Self {
            source: source.to_string(),
            entries: snapshot.journal_entries,
            transactions,
        }
    }
}

impl Ledger for SnapshotLedger {
    fn list_journal_entries(&self, window: &DateWindow) -> Result<Vec<JournalEntry>> {
        Ok(self
            .entries
            .iter()
            .filter(|e| window.contains(&e.date))
            .cloned()
            .collect())
    }

    fn get_transaction(&self, id: i64) -> Result<Transaction> {
        self.transactions
            .get(&id)
            .cloned()
            .ok_or_else(|| KassaflytError::Fetch {
                url: format!("{}#transactions/{id}", self.source),
                cause: "transaction not in snapshot".to_string(),
            })
    }
}
