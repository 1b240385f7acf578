use std::collections::HashSet;

use regex::Regex;

use crate::classifier::{LineContext, RuleSet};
use crate::error::{KassaflytError, Result};
use crate::ledger::Ledger;
use crate::models::{ClassifiedRow, JournalEntry};
use crate::resolver::{ContextCache, TransactionContext};

const INVOICE_PATTERN: &str = r"(?i)faktura\s*#?(\w+)";

/// Entries with at least one line on the bank account, in input order.
pub fn bank_entries<'a>(entries: &'a [JournalEntry], bank_account: &str) -> Vec<&'a JournalEntry> {
    entries.iter().filter(|e| e.touches(bank_account)).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedTransaction {
    pub id: i64,
    pub cause: String,
}

/// Outcome of one classification pass.
#[derive(Debug, Default)]
pub struct Classification {
    pub rows: Vec<ClassifiedRow>,
    /// Transactions whose context could not be resolved. They are missing
    /// from every total.
    pub skipped: Vec<SkippedTransaction>,
    pub cancelled: usize,
    /// Journal entries dropped because their transaction was already seen.
    pub repeated: usize,
    pub duplicate_invoices: usize,
}

pub struct Engine<'a> {
    ledger: &'a dyn Ledger,
    rules: &'a RuleSet,
    bank_account: &'a str,
    invoice_re: Option<Regex>,
}

impl<'a> Engine<'a> {
    pub fn new(ledger: &'a dyn Ledger, rules: &'a RuleSet, bank_account: &'a str) -> Self {
        Self {
            ledger,
            rules,
            bank_account,
            invoice_re: None,
        }
    }

    /// Report an invoice number found in entry descriptions only once.
    pub fn with_invoice_dedupe(mut self, enabled: bool) -> Result<Self> {
        self.invoice_re = if enabled {
            Some(Regex::new(INVOICE_PATTERN)?)
        } else {
            None
        };
        Ok(self)
    }

    /// Classify every bank line of the given entries. Each transaction id is
    /// handled once per pass; the cache may be shared between passes.
    pub fn classify(&self, entries: &[&JournalEntry], cache: &mut ContextCache) -> Classification {
        let mut out = Classification::default();
        let mut processed: HashSet<i64> = HashSet::new();
        let mut invoices: HashSet<String> = HashSet::new();

        for je in entries {
            let context = match je.transaction_id {
                Some(id) => {
                    if !processed.insert(id) {
                        out.repeated += 1;
                        continue;
                    }
                    match cache.resolve(self.ledger, id) {
                        Ok(ctx) => ctx.clone(),
                        Err(KassaflytError::Resolution { id, cause }) => {
                            out.skipped.push(SkippedTransaction { id, cause });
                            continue;
                        }
                        Err(e) => {
                            out.skipped.push(SkippedTransaction {
                                id,
                                cause: e.to_string(),
                            });
                            continue;
                        }
                    }
                }
                None => entry_context(je),
            };

            if self.rules.is_cancellation(&context.kind) {
                tracing::info!(
                    transaction_id = ?je.transaction_id,
                    kind = %context.kind,
                    "skipping cancelled transaction"
                );
                out.cancelled += 1;
                continue;
            }

            self.classify_entry(je, &context, &mut invoices, &mut out);
        }

        tracing::debug!(
            rows = out.rows.len(),
            skipped = out.skipped.len(),
            cancelled = out.cancelled,
            repeated = out.repeated,
            "classification pass finished"
        );
        out
    }

    fn classify_entry(
        &self,
        je: &JournalEntry,
        context: &TransactionContext,
        invoices: &mut HashSet<String>,
        out: &mut Classification,
    ) {
        let mut description = je.description.clone();
        for d in &context.descriptions {
            description.push(' ');
            description.push_str(d);
        }
        let counter_accounts = context.counter_accounts(self.bank_account);
        let ctx = LineContext {
            transaction_type: &context.kind,
            accounts: &context.accounts,
            counter_accounts: &counter_accounts,
            description: &description,
        };
        let invoice = self
            .invoice_re
            .as_ref()
            .and_then(|re| re.captures(&je.description))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());

        for line in je.bank_lines(self.bank_account) {
            let Some((direction, category)) = self.rules.classify(line.amount, &ctx) else {
                continue;
            };

            if let Some(number) = &invoice {
                if !invoices.insert(number.clone()) {
                    tracing::info!(invoice = %number, "skipping duplicate invoice");
                    out.duplicate_invoices += 1;
                    continue;
                }
            }

            out.rows.push(ClassifiedRow {
                date: je.date.clone(),
                description: je.description.clone(),
                transaction_id: je.transaction_id,
                journal_entry_id: je.journal_entry_id,
                transaction_type: context.kind.clone(),
                amount: line.amount.saturating_abs(),
                direction,
                category,
                expense_accounts: counter_accounts.clone(),
                has_reversal_marker: self.rules.has_reversal_marker(&je.description),
            });
        }
    }
}

// Entries without a transaction id are classified from their own lines.
fn entry_context(je: &JournalEntry) -> TransactionContext {
    TransactionContext {
        kind: String::new(),
        accounts: je
            .lines
            .iter()
            .map(|l| l.account.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect(),
        descriptions: Vec::new(),
    }
}
