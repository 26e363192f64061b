use hembudget_domain::{
    amount, common::normalize_name, LineAmounts, LineItem, Ledger, Month,
};

use crate::CoreError;

/// Creates, overwrites, and removes line items.
pub struct LineItemService;

impl LineItemService {
    /// Creates the category and item as needed and writes `amounts` into the item.
    /// Nothing changes when validation fails.
    pub fn upsert(
        ledger: &mut Ledger,
        month: Month,
        category: &str,
        item: &str,
        amounts: LineAmounts,
    ) -> Result<(), CoreError> {
        let category = normalize_name(category)
            .ok_or_else(|| CoreError::Validation("category name must not be empty".into()))?;
        let item = normalize_name(item)
            .ok_or_else(|| CoreError::Validation("item name must not be empty".into()))?;
        Self::validate_amount("budget", amounts.budget)?;
        Self::validate_amount("actual", amounts.actual)?;

        ledger
            .ensure_month(month)
            .ensure_category(&category)
            .upsert_item(LineItem::with_amounts(item, amounts));
        ledger.touch();
        Ok(())
    }

    /// Removes the item. Returns `false` when there was nothing to remove.
    pub fn delete(ledger: &mut Ledger, month: Month, category: &str, item: &str) -> bool {
        let removed = ledger
            .month_mut(month)
            .and_then(|record| record.category_mut(category))
            .and_then(|record| record.remove_item(item))
            .is_some();
        if removed {
            ledger.touch();
        }
        removed
    }

    pub fn get<'a>(
        ledger: &'a Ledger,
        month: Month,
        category: &str,
        item: &str,
    ) -> Option<&'a LineItem> {
        ledger.item(month, category, item)
    }

    fn validate_amount(field: &str, value: f64) -> Result<(), CoreError> {
        if amount::is_valid(value) {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "{field} must be a non-negative amount, got {value}"
            )))
        }
    }
}
