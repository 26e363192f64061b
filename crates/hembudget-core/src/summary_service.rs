//! Read-only aggregates over a ledger: totals, statuses, and export rows.

use hembudget_domain::{
    CategoryTotals, Ledger, LedgerRow, Month, MonthTotals, RowStatus,
};

/// Computes derived values; holds no state of its own.
pub struct SummaryService;

impl SummaryService {
    /// Budget and actual sums of one category. Missing month or category yields zeros.
    pub fn category_totals(ledger: &Ledger, month: Month, category: &str) -> CategoryTotals {
        ledger
            .category(month, category)
            .map(|record| record.totals())
            .unwrap_or_default()
    }

    /// Income and expense totals for the month; `remaining = income_actual - expense_actual`.
    pub fn month_totals(ledger: &Ledger, month: Month) -> MonthTotals {
        match ledger.month(month) {
            Some(record) => MonthTotals::from_categories(
                record
                    .categories
                    .iter()
                    .map(|category| (category.name.as_str(), category.totals())),
            ),
            None => MonthTotals::default(),
        }
    }

    /// Totals for all twelve months in calendar order.
    pub fn year_totals(ledger: &Ledger) -> Vec<(Month, MonthTotals)> {
        Month::ALL
            .iter()
            .map(|month| (*month, Self::month_totals(ledger, *month)))
            .collect()
    }

    pub fn row_status(category: &str, budget: f64, actual: f64) -> RowStatus {
        RowStatus::evaluate(category, budget, actual)
    }

    /// Status of a whole heading, evaluated over its sums.
    pub fn category_status(ledger: &Ledger, month: Month, category: &str) -> RowStatus {
        let totals = Self::category_totals(ledger, month, category);
        RowStatus::evaluate(category, totals.budget_sum, totals.actual_sum)
    }

    /// Every line item as a flat row, in month, category, and item order.
    pub fn rows(ledger: &Ledger) -> impl Iterator<Item = LedgerRow<'_>> + '_ {
        ledger.months.iter().flat_map(|(month, record)| {
            let month = *month;
            record.categories.iter().flat_map(move |category| {
                category.items.iter().map(move |item| LedgerRow {
                    month,
                    category: category.name.as_str(),
                    item: item.name.as_str(),
                    budget: item.budget,
                    actual: item.actual,
                })
            })
        })
    }
}
