use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::models::{Category, Direction};

/// Immutable classification configuration. Loaded from settings, passed
/// explicitly to every pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    pub personnel_accounts: BTreeSet<String>,
    pub software_accounts: BTreeSet<String>,
    pub vat_prefixes: Vec<String>,
    pub vat_keywords: Vec<String>,
    pub employer_tax_keywords: Vec<String>,
    /// `None` means the type has no direct category and falls through to
    /// the account rules.
    pub type_categories: BTreeMap<String, Option<Category>>,
    pub cancellation_type: String,
    pub reversal_marker: String,
    /// Smallest absolute amount, in øre, that is reported.
    pub min_amount: i64,
}

fn set(codes: &[&str]) -> BTreeSet<String> {
    codes.iter().map(|c| c.to_string()).collect()
}

fn list(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for RuleSet {
    fn default() -> Self {
        let type_categories = [
            ("Salg", Some(Category::Income)),
            ("Lønn", Some(Category::Personalkostnader)),
            ("Betaling av arbeidsgiveravgift", Some(Category::Personalkostnader)),
            ("Mva-oppgjør", Some(Category::Mva)),
            ("Bankomkostning", Some(Category::Adk)),
            ("Kjøp", None),
            ("Fri", None),
            ("Inngående balanse", Some(Category::Adk)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            personnel_accounts: set(&["5001", "5092", "5401", "5405", "5901", "5950", "2771"]),
            software_accounts: set(&["6420", "6553"]),
            vat_prefixes: list(&["274", "270"]),
            vat_keywords: list(&["merverdiavgift", "mva"]),
            employer_tax_keywords: list(&["aga", "arbeidsgiveravgift"]),
            type_categories,
            cancellation_type: "Annullering".to_string(),
            reversal_marker: "motlinje".to_string(),
            min_amount: 1,
        }
    }
}

/// What the classifier knows about the transaction owning a bank line.
pub struct LineContext<'a> {
    pub transaction_type: &'a str,
    /// Every account the transaction touches, bank account included.
    pub accounts: &'a BTreeSet<String>,
    /// `accounts` without the bank account.
    pub counter_accounts: &'a BTreeSet<String>,
    /// All descriptions of the transaction joined by spaces.
    pub description: &'a str,
}

impl RuleSet {
    pub fn is_cancellation(&self, transaction_type: &str) -> bool {
        transaction_type == self.cancellation_type
    }

    pub fn has_reversal_marker(&self, description: &str) -> bool {
        description
            .to_lowercase()
            .contains(&self.reversal_marker.to_lowercase())
    }

    /// Classify one bank line. Returns `None` for amounts below the noise
    /// threshold.
    pub fn classify(&self, amount: i64, ctx: &LineContext) -> Option<(Direction, Category)> {
        if amount == 0 || amount.unsigned_abs() < self.min_amount.unsigned_abs() {
            return None;
        }
        if amount > 0 {
            return Some((Direction::Inflow, Category::Income));
        }
        Some((Direction::Outflow, self.categorize_outflow(ctx)))
    }

    /// Ordered decision for outflows: type table, MVA, personnel, software, ADK.
    pub fn categorize_outflow(&self, ctx: &LineContext) -> Category {
        if let Some(Some(category)) = self.type_categories.get(ctx.transaction_type) {
            return *category;
        }

        let desc = ctx.description.to_lowercase();
        let mentions = |words: &[String]| words.iter().any(|w| desc.contains(&w.to_lowercase()));

        if mentions(&self.vat_keywords)
            && ctx
                .accounts
                .iter()
                .any(|a| self.vat_prefixes.iter().any(|p| a.starts_with(p.as_str())))
        {
            return Category::Mva;
        }

        if !ctx.counter_accounts.is_disjoint(&self.personnel_accounts)
            || mentions(&self.employer_tax_keywords)
        {
            return Category::Personalkostnader;
        }

        if !ctx.counter_accounts.is_disjoint(&self.software_accounts) {
            return Category::ProgramvareOgDatasystemer;
        }

        Category::Adk
    }
}
