//! Plain-text rendering of ledger views for the command line.

use std::fmt::Write;

use colored::{ColoredString, Colorize};
use hembudget_core::SummaryService;
use hembudget_domain::{Ledger, Month, MonthRecord, MonthTotals, RowStatus};
use hembudget_storage_json::LedgerMetadata;

pub fn amount(value: f64) -> String {
    format!("{value:.2}")
}

/// `OK` in green, `OVER` in red.
pub fn status(status: RowStatus) -> ColoredString {
    match status {
        RowStatus::Ok => status.to_string().green(),
        RowStatus::Over => status.to_string().red().bold(),
    }
}

/// One month: notes, then each heading with its sums and rows.
pub fn month_view(ledger: &Ledger, month: Month, record: &MonthRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", format!("== {month} ==").bold());
    if !record.notes.is_empty() {
        let _ = writeln!(out, "Notes: {}", record.notes);
    }
    for category in &record.categories {
        let totals = category.totals();
        let _ = writeln!(
            out,
            "{}  budget {}  actual {}  [{}]",
            category.name.bold(),
            amount(totals.budget_sum),
            amount(totals.actual_sum),
            status(SummaryService::category_status(ledger, month, &category.name)),
        );
        for item in &category.items {
            let _ = write!(
                out,
                "  {:<24} {:>10} {:>10}  [{}]",
                item.name,
                amount(item.budget),
                amount(item.actual),
                status(SummaryService::row_status(&category.name, item.budget, item.actual)),
            );
            if let Some(due) = item.due_date {
                let _ = write!(out, "  due {due}");
            }
            out.push('\n');
        }
    }
    out.push_str(&totals(month, &SummaryService::month_totals(ledger, month)));
    out
}

pub fn totals(month: Month, totals: &MonthTotals) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{month} totals");
    let _ = writeln!(
        out,
        "  income   budget {:>10}  actual {:>10}",
        amount(totals.income_budget),
        amount(totals.income_actual)
    );
    let _ = writeln!(
        out,
        "  expenses budget {:>10}  actual {:>10}",
        amount(totals.expense_budget),
        amount(totals.expense_actual)
    );
    let remaining = amount(totals.remaining);
    let remaining = if totals.remaining < 0.0 {
        remaining.red()
    } else {
        remaining.green()
    };
    let _ = writeln!(out, "  remaining {remaining}");
    out
}

/// Twelve lines, one per month, in calendar order.
pub fn year(entries: &[(Month, MonthTotals)]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10} {:>12} {:>12} {:>12}",
        "month", "income", "expenses", "remaining"
    );
    for (month, totals) in entries {
        let _ = writeln!(
            out,
            "{:<10} {:>12} {:>12} {:>12}",
            month.name(),
            amount(totals.income_actual),
            amount(totals.expense_actual),
            amount(totals.remaining)
        );
    }
    out
}

/// Tab-separated export rows with a header line.
pub fn rows(ledger: &Ledger) -> String {
    let mut out = String::from("month\tcategory\titem\tbudget\tactual\n");
    for row in SummaryService::rows(ledger) {
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}",
            row.month,
            row.category,
            row.item,
            amount(row.budget),
            amount(row.actual)
        );
    }
    out
}

pub fn users(entries: &[LedgerMetadata]) -> String {
    if entries.is_empty() {
        return "No ledgers stored.\n".to_string();
    }
    let mut out = String::new();
    for entry in entries {
        let months: Vec<&str> = entry.months.iter().map(|month| month.name()).collect();
        let _ = writeln!(
            out,
            "{}  months: {}  rows: {}  remaining: {}",
            entry.owner.bold(),
            if months.is_empty() {
                "-".to_string()
            } else {
                months.join(", ")
            },
            entry.row_count,
            amount(entry.remaining_total)
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use hembudget_core::LineItemService;
    use hembudget_domain::{CategoryTemplate, LineAmounts};

    #[test]
    fn rows_are_tab_separated_with_two_decimals() {
        colored::control::set_override(false);
        let mut ledger = Ledger::new("Anki", CategoryTemplate::empty());
        LineItemService::upsert(
            &mut ledger,
            Month::April,
            "Mat",
            "Livsmedel",
            LineAmounts::new(400.0, 350.5),
        )
        .unwrap();
        assert_eq!(
            rows(&ledger),
            "month\tcategory\titem\tbudget\tactual\nApril\tMat\tLivsmedel\t400.00\t350.50\n"
        );
    }

    #[test]
    fn year_lists_every_month() {
        let ledger = Ledger::new("Anki", CategoryTemplate::empty());
        let rendered = year(&SummaryService::year_totals(&ledger));
        assert_eq!(rendered.lines().count(), 13);
        assert!(rendered.contains("December"));
    }
}
