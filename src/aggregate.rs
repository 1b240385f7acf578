use std::collections::BTreeMap;

use crate::models::{Category, ClassifiedRow, Direction};

/// Running totals for one (month, category) cell, in øre.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bucket {
    pub inflow: i64,
    pub outflow: i64,
    pub count: u64,
}

impl Bucket {
    pub fn net(&self) -> i64 {
        self.inflow - self.outflow
    }

    fn add(&mut self, row: &ClassifiedRow) {
        match row.direction {
            Direction::Inflow => self.inflow += row.amount,
            Direction::Outflow => self.outflow += row.amount,
        }
        self.count += 1;
    }

    fn merge(&mut self, other: &Bucket) {
        self.inflow += other.inflow;
        self.outflow += other.outflow;
        self.count += other.count;
    }
}

/// One bucket per category, indexed by `Category::index`.
pub type CategoryBuckets = [Bucket; 5];

/// Flat per-category totals over a set of rows, in the fixed category order.
pub fn category_totals<'a>(rows: impl IntoIterator<Item = &'a ClassifiedRow>) -> Vec<(Category, Bucket)> {
    let mut buckets = CategoryBuckets::default();
    for row in rows {
        buckets[row.category.index()].add(row);
    }
    Category::ALL.iter().map(|c| (*c, buckets[c.index()])).collect()
}

pub struct MonthlyRow {
    pub month: String,
    pub category: Category,
    pub bucket: Bucket,
}

/// Month × category totals. Every month that has a row carries all five
/// categories, zero-filled.
#[derive(Debug, Default, PartialEq)]
pub struct MonthlyReport {
    months: BTreeMap<String, CategoryBuckets>,
}

impl MonthlyReport {
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a ClassifiedRow>) -> Self {
        let mut months: BTreeMap<String, CategoryBuckets> = BTreeMap::new();
        for row in rows {
            // Undated rows stay in the line report only.
            let Some(month) = row.month() else {
                continue;
            };
            months.entry(month.to_string()).or_default()[row.category.index()].add(row);
        }
        Self { months }
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn months(&self) -> impl Iterator<Item = (&str, &CategoryBuckets)> + '_ {
        self.months.iter().map(|(m, b)| (m.as_str(), b))
    }

    #[cfg(test)]
    pub fn get(&self, month: &str, category: Category) -> Option<&Bucket> {
        self.months.get(month).map(|b| &b[category.index()])
    }

    /// Rows sorted by month, then the fixed category order.
    pub fn rows(&self) -> Vec<MonthlyRow> {
        self.months
            .iter()
            .flat_map(|(month, buckets)| {
                Category::ALL.iter().map(move |c| MonthlyRow {
                    month: month.clone(),
                    category: *c,
                    bucket: buckets[c.index()],
                })
            })
            .collect()
    }

    /// Totals per category across all months.
    pub fn category_totals(&self) -> CategoryBuckets {
        let mut totals = CategoryBuckets::default();
        for buckets in self.months.values() {
            for (total, b) in totals.iter_mut().zip(buckets.iter()) {
                total.merge(b);
            }
        }
        totals
    }
}
