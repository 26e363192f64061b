//! Derived aggregates and the per-row budget status.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ledger::LineItem, month::Month};

/// Name of the heading whose actual total counts as income.
pub const INCOME_CATEGORY: &str = "Inkomster";

/// Returns `true` for the income heading (case-insensitive, whitespace ignored).
pub fn is_income_category(name: &str) -> bool {
    name.trim().to_lowercase() == INCOME_CATEGORY.to_lowercase()
}

/// Sums over all items of one category.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct CategoryTotals {
    pub budget_sum: f64,
    pub actual_sum: f64,
}

impl CategoryTotals {
    pub fn from_items(items: &[LineItem]) -> Self {
        items.iter().fold(Self::default(), |acc, item| Self {
            budget_sum: acc.budget_sum + item.budget,
            actual_sum: acc.actual_sum + item.actual,
        })
    }
}

/// Household totals for one month.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct MonthTotals {
    pub income_budget: f64,
    pub income_actual: f64,
    pub expense_budget: f64,
    pub expense_actual: f64,
    pub remaining: f64,
}

impl MonthTotals {
    /// Rolls per-category sums into income and expense buckets.
    pub fn from_categories<'a, I>(categories: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, CategoryTotals)>,
    {
        let mut totals = Self::default();
        for (name, sums) in categories {
            if is_income_category(name) {
                totals.income_budget += sums.budget_sum;
                totals.income_actual += sums.actual_sum;
            } else {
                totals.expense_budget += sums.budget_sum;
                totals.expense_actual += sums.actual_sum;
            }
        }
        totals.remaining = totals.income_actual - totals.expense_actual;
        totals
    }
}

/// Whether a row is on the good side of its budget.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RowStatus {
    Ok,
    Over,
}

impl RowStatus {
    /// Income rows are fine at or above budget; expense rows at or below.
    pub fn evaluate(category: &str, budget: f64, actual: f64) -> Self {
        let ok = if is_income_category(category) {
            actual >= budget
        } else {
            actual <= budget
        };
        if ok {
            RowStatus::Ok
        } else {
            RowStatus::Over
        }
    }

    pub fn is_ok(self) -> bool {
        self == RowStatus::Ok
    }
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RowStatus::Ok => "OK",
            RowStatus::Over => "OVER",
        };
        f.write_str(label)
    }
}

/// Flat export row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerRow<'a> {
    pub month: Month,
    pub category: &'a str,
    pub item: &'a str,
    pub budget: f64,
    pub actual: f64,
}
