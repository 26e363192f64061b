use hembudget_domain::{common::normalize_name, CategoryRecord, Ledger, Month};

use crate::{ledger_service::LedgerService, CoreError};

/// Manages the headings of a month.
pub struct CategoryService;

impl CategoryService {
    /// Adds an empty heading at the end of the month.
    pub fn add(ledger: &mut Ledger, month: Month, name: &str) -> Result<(), CoreError> {
        let name = Self::validate_name(name)?;
        if LedgerService::month_view(ledger, month).has_category(&name) {
            return Err(CoreError::Conflict(format!(
                "category `{name}` already exists in {month}"
            )));
        }
        ledger
            .ensure_month(month)
            .categories
            .push(CategoryRecord::new(name));
        ledger.touch();
        Ok(())
    }

    /// Moves every item of `old` to `new` within the month.
    pub fn rename(ledger: &mut Ledger, month: Month, old: &str, new: &str) -> Result<(), CoreError> {
        let new = Self::validate_name(new)?;
        {
            let view = LedgerService::month_view(ledger, month);
            if !view.has_category(old) {
                return Err(CoreError::NotFound(format!(
                    "category `{}` does not exist in {month}",
                    old.trim()
                )));
            }
            if old.trim() == new {
                return Ok(());
            }
            if view.has_category(&new) {
                return Err(CoreError::Conflict(format!(
                    "category `{new}` already exists in {month}"
                )));
            }
        }
        if let Some(category) = ledger.ensure_month(month).category_mut(old) {
            category.name = new;
        }
        ledger.touch();
        Ok(())
    }

    /// Removes the heading and its items. Returns `false` when it was absent.
    pub fn remove(ledger: &mut Ledger, month: Month, name: &str) -> bool {
        let Some(record) = ledger.month_mut(month) else {
            return false;
        };
        let Some(index) = record.category_index(name) else {
            return false;
        };
        record.categories.remove(index);
        ledger.touch();
        true
    }

    /// Moves the heading to `index`; indices past the end place it last.
    pub fn move_to(
        ledger: &mut Ledger,
        month: Month,
        name: &str,
        index: usize,
    ) -> Result<(), CoreError> {
        if !LedgerService::month_view(ledger, month).has_category(name) {
            return Err(CoreError::NotFound(format!(
                "category `{}` does not exist in {month}",
                name.trim()
            )));
        }
        let record = ledger.ensure_month(month);
        if let Some(current) = record.category_index(name) {
            let category = record.categories.remove(current);
            let target = index.min(record.categories.len());
            record.categories.insert(target, category);
        }
        ledger.touch();
        Ok(())
    }

    /// Heading names in display order, as the month would show them.
    pub fn names(ledger: &Ledger, month: Month) -> Vec<String> {
        LedgerService::month_view(ledger, month)
            .categories
            .iter()
            .map(|category| category.name.clone())
            .collect()
    }

    fn validate_name(name: &str) -> Result<String, CoreError> {
        normalize_name(name)
            .ok_or_else(|| CoreError::Validation("category name must not be empty".into()))
    }
}
