use hembudget_domain::{Ledger, Month};

/// Free-text notes attached to a month.
pub struct NotesService;

impl NotesService {
    /// Replaces the month's note, creating the month if needed.
    pub fn set(ledger: &mut Ledger, month: Month, text: impl Into<String>) {
        ledger.ensure_month(month).notes = text.into();
        ledger.touch();
    }

    pub fn get(ledger: &Ledger, month: Month) -> &str {
        ledger
            .month(month)
            .map(|record| record.notes.as_str())
            .unwrap_or("")
    }
}
