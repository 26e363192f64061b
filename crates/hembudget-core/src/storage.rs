use std::path::PathBuf;

use hembudget_domain::{
    common::NamedEntity, CategoryRecord, Ledger, LineItem, CURRENT_SCHEMA_VERSION,
};

use crate::CoreError;

/// Describes a persisted backup artifact for a ledger.
#[derive(Debug, Clone)]
pub struct LedgerBackupInfo {
    pub ledger: String,
    pub id: String,
    pub created_at: String,
    pub path: PathBuf,
}

/// Outcome of reading a ledger from storage.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub ledger: Ledger,
    /// Data that was repaired while loading (coerced amounts, collapsed duplicates).
    pub warnings: Vec<String>,
    /// Format conversions applied while loading.
    pub migrations: Vec<String>,
    pub path: PathBuf,
}

/// Abstraction over persistence backends capable of storing ledgers and backups.
pub trait LedgerStorage: Send + Sync {
    fn save_ledger(&self, name: &str, ledger: &Ledger) -> Result<(), CoreError>;
    /// Returns `Ok(None)` when nothing has been stored under `name` yet.
    fn load_ledger(&self, name: &str) -> Result<Option<LoadReport>, CoreError>;
    fn list_ledgers(&self) -> Result<Vec<String>, CoreError>;
    fn backup_ledger(
        &self,
        name: &str,
        ledger: &Ledger,
        note: Option<&str>,
    ) -> Result<LedgerBackupInfo, CoreError>;
    fn list_backups(&self, name: &str) -> Result<Vec<LedgerBackupInfo>, CoreError>;
    fn restore_backup(&self, backup: &LedgerBackupInfo) -> Result<LoadReport, CoreError>;
}

/// Rejects ledgers written by a newer version of the format.
pub fn ensure_schema_support(ledger: &Ledger) -> Result<(), CoreError> {
    if ledger.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(CoreError::Storage(format!(
            "ledger schema v{} is newer than supported v{}",
            ledger.schema_version, CURRENT_SCHEMA_VERSION
        )));
    }
    Ok(())
}

/// Collapses duplicate category and item names so that every name is unique
/// within its parent. Later entries win. Returns one warning per collapse.
pub fn normalize_ledger(ledger: &mut Ledger) -> Vec<String> {
    let mut warnings = Vec::new();
    for (month, record) in ledger.months.iter_mut() {
        let mut merged: Vec<CategoryRecord> = Vec::with_capacity(record.categories.len());
        for category in record.categories.drain(..) {
            let items = dedupe_items(category.items, |name| {
                warnings.push(format!(
                    "{month}: duplicate item `{name}` in `{}` collapsed",
                    category.name
                ))
            });
            match merged.iter_mut().find(|existing| existing.is_named(&category.name)) {
                Some(existing) => {
                    warnings.push(format!(
                        "{month}: duplicate category `{}` merged",
                        category.name
                    ));
                    for item in items {
                        existing.upsert_item(item);
                    }
                    if existing.id.is_none() {
                        existing.id = category.id;
                    }
                }
                None => merged.push(CategoryRecord {
                    name: category.name,
                    id: category.id,
                    items,
                }),
            }
        }
        record.categories = merged;
    }
    warnings
}

fn dedupe_items(items: Vec<LineItem>, mut on_duplicate: impl FnMut(&str)) -> Vec<LineItem> {
    let mut unique: Vec<LineItem> = Vec::with_capacity(items.len());
    for item in items {
        match unique.iter_mut().find(|existing| existing.is_named(&item.name)) {
            Some(existing) => {
                on_duplicate(&item.name);
                *existing = item;
            }
            None => unique.push(item),
        }
    }
    unique
}
