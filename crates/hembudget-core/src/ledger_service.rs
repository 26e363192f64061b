//! Helper functions for high-level ledger orchestration.

use std::borrow::Cow;

use hembudget_domain::{CategoryTemplate, Ledger, Month, MonthRecord};

/// Provides constructor and month lifecycle helpers for [`Ledger`] instances.
pub struct LedgerService;

impl LedgerService {
    /// Creates a new, empty ledger whose months will be seeded from `template`.
    pub fn create(owner: impl Into<String>, template: CategoryTemplate) -> Ledger {
        Ledger::new(owner, template)
    }

    /// Makes sure the month exists, seeding it from the template.
    /// Returns `true` when the month was created by this call.
    pub fn select_month(ledger: &mut Ledger, month: Month) -> bool {
        if ledger.has_month(month) {
            return false;
        }
        ledger.ensure_month(month);
        ledger.touch();
        true
    }

    /// The month as a caller would see it after selecting it, without creating it.
    pub fn month_view(ledger: &Ledger, month: Month) -> Cow<'_, MonthRecord> {
        match ledger.month(month) {
            Some(record) => Cow::Borrowed(record),
            None => Cow::Owned(MonthRecord::seeded(&ledger.template)),
        }
    }

    /// Replaces the template used for months that have not been selected yet.
    pub fn set_template(ledger: &mut Ledger, template: CategoryTemplate) {
        ledger.template = template;
        ledger.touch();
    }
}
