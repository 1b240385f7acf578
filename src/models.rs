use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// One line of a journal entry or transaction entry, amount in øre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    #[serde(default, deserialize_with = "account_code")]
    pub account: String,
    #[serde(default)]
    pub amount: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub journal_entry_id: i64,
    #[serde(default)]
    pub transaction_id: Option<i64>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub offset_transaction_id: Option<i64>,
    #[serde(default)]
    pub lines: Vec<Line>,
}

impl JournalEntry {
    pub fn touches(&self, account: &str) -> bool {
        self.lines.iter().any(|l| l.account.trim() == account)
    }

    pub fn bank_lines<'a>(&'a self, account: &'a str) -> impl Iterator<Item = &'a Line> + 'a {
        self.lines.iter().filter(move |l| l.account.trim() == account)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionEntry {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub lines: Vec<Line>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(alias = "transactionId")]
    pub id: i64,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub entries: Vec<TransactionEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    Inflow,
    Outflow,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inflow => f.write_str("Inflow"),
            Self::Outflow => f.write_str("Outflow"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Income,
    Personalkostnader,
    ProgramvareOgDatasystemer,
    #[serde(rename = "MVA")]
    Mva,
    #[serde(rename = "ADK")]
    Adk,
}

impl Category {
    /// Fixed reporting order.
    pub const ALL: [Category; 5] = [
        Category::Income,
        Category::Personalkostnader,
        Category::ProgramvareOgDatasystemer,
        Category::Mva,
        Category::Adk,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::Income => 0,
            Self::Personalkostnader => 1,
            Self::ProgramvareOgDatasystemer => 2,
            Self::Mva => 3,
            Self::Adk => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Personalkostnader => "Personalkostnader",
            Self::ProgramvareOgDatasystemer => "Programvare og datasystemer",
            Self::Mva => "MVA",
            Self::Adk => "ADK",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One classified bank line. `amount` is the absolute value in øre.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRow {
    pub date: String,
    pub description: String,
    pub transaction_id: Option<i64>,
    pub journal_entry_id: i64,
    pub transaction_type: String,
    pub amount: i64,
    pub direction: Direction,
    pub category: Category,
    pub expense_accounts: BTreeSet<String>,
    pub has_reversal_marker: bool,
}

impl ClassifiedRow {
    /// Year-month prefix of the entry date, e.g. `2025-10`. `None` for
    /// undated rows.
    pub fn month(&self) -> Option<&str> {
        self.date.get(..7)
    }
}

// Fiken sends account codes as strings ("1920:10001") but plain ledger
// accounts sometimes arrive as bare numbers.
fn account_code<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }
    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) => s.trim().to_string(),
        Some(Raw::Number(n)) => n.to_string(),
        None => String::new(),
    })
}
