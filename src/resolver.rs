use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};

use crate::error::{KassaflytError, Result};
use crate::ledger::Ledger;
use crate::models::Transaction;

/// Normalized view of one transaction, as the classifier needs it.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionContext {
    pub kind: String,
    /// Trimmed account codes from every line of every entry, bank included.
    pub accounts: BTreeSet<String>,
    pub descriptions: Vec<String>,
}

impl TransactionContext {
    pub fn from_transaction(txn: &Transaction) -> Self {
        let accounts = txn
            .entries
            .iter()
            .flat_map(|e| e.lines.iter())
            .map(|l| l.account.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        let descriptions = txn.entries.iter().map(|e| e.description.clone()).collect();
        Self {
            kind: txn.kind.clone(),
            accounts,
            descriptions,
        }
    }

    pub fn counter_accounts(&self, bank_account: &str) -> BTreeSet<String> {
        self.accounts
            .iter()
            .filter(|a| a.as_str() != bank_account)
            .cloned()
            .collect()
    }
}

enum Slot {
    Resolved(TransactionContext),
    Failed(String),
}

/// Per-run memo of transaction lookups. Each id is fetched at most once,
/// whether the fetch succeeded or not. Share one cache between the passes
/// of a run; never keep it across runs.
#[derive(Default)]
pub struct ContextCache {
    slots: HashMap<i64, Slot>,
    fetches: usize,
}

impl ContextCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of remote lookups issued so far.
    pub fn fetches(&self) -> usize {
        self.fetches
    }

    pub fn resolve(&mut self, ledger: &dyn Ledger, id: i64) -> Result<&TransactionContext> {
        let slot = match self.slots.entry(id) {
            Entry::Occupied(o) => {
                tracing::trace!(id, "transaction context cache hit");
                o.into_mut()
            }
            Entry::Vacant(v) => {
                self.fetches += 1;
                let slot = match ledger.get_transaction(id) {
                    Ok(txn) => Slot::Resolved(TransactionContext::from_transaction(&txn)),
                    Err(e) => {
                        tracing::warn!(id, error = %e, "failed to fetch transaction");
                        Slot::Failed(e.to_string())
                    }
                };
                v.insert(slot)
            }
        };
        match slot {
            Slot::Resolved(ctx) => Ok(ctx),
            Slot::Failed(cause) => Err(KassaflytError::Resolution {
                id,
                cause: cause.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::ledger::DateWindow;
    use crate::models::{JournalEntry, Line, TransactionEntry};

    struct CountingLedger {
        calls: Cell<usize>,
    }

    impl Ledger for CountingLedger {
        fn list_journal_entries(&self, _window: &DateWindow) -> Result<Vec<JournalEntry>> {
            Ok(Vec::new())
        }

        fn get_transaction(&self, id: i64) -> Result<Transaction> {
            self.calls.set(self.calls.get() + 1);
            if id < 0 {
                return Err(KassaflytError::Fetch {
                    url: format!("test/{id}"),
                    cause: "boom".to_string(),
                });
            }
            Ok(Transaction {
                id,
                kind: "Kjøp".to_string(),
                entries: vec![
                    TransactionEntry {
                        description: "Adobe".to_string(),
                        lines: vec![
                            Line { account: " 1920:10001 ".to_string(), amount: -100 },
                            Line { account: "6420".to_string(), amount: 80 },
                        ],
                    },
                    TransactionEntry {
                        description: "inngående mva".to_string(),
                        lines: vec![Line { account: "2710".to_string(), amount: 20 }],
                    },
                ],
            })
        }
    }

    #[test]
    fn test_collects_trimmed_accounts_and_descriptions() {
        let ledger = CountingLedger { calls: Cell::new(0) };
        let mut cache = ContextCache::new();
        let ctx = cache.resolve(&ledger, 1).unwrap();
        assert_eq!(ctx.kind, "Kjøp");
        assert!(ctx.accounts.contains("1920:10001"));
        assert_eq!(ctx.descriptions, vec!["Adobe", "inngående mva"]);
        let counter: Vec<String> = ctx.counter_accounts("1920:10001").into_iter().collect();
        assert_eq!(counter, vec!["2710", "6420"]);
    }

    #[test]
    fn test_fetches_each_id_once() {
        let ledger = CountingLedger { calls: Cell::new(0) };
        let mut cache = ContextCache::new();
        for _ in 0..3 {
            cache.resolve(&ledger, 7).unwrap();
        }
        cache.resolve(&ledger, 8).unwrap();
        assert_eq!(ledger.calls.get(), 2);
        assert_eq!(cache.fetches(), 2);
    }

    #[test]
    fn test_failure_is_cached_and_reported() {
        let ledger = CountingLedger { calls: Cell::new(0) };
        let mut cache = ContextCache::new();
        for _ in 0..2 {
            match cache.resolve(&ledger, -3) {
                Err(KassaflytError::Resolution { id, cause }) => {
                    assert_eq!(id, -3);
                    assert!(cause.contains("boom"));
                }
                other => panic!("expected resolution failure, got {other:?}"),
            }
        }
        assert_eq!(ledger.calls.get(), 1);
    }
}
