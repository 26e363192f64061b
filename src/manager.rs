use std::collections::HashMap;

use hembudget_config::Config;
use hembudget_core::{
    storage::{LedgerBackupInfo, LedgerStorage, LoadReport},
    CategoryService, CoreError, LedgerService, LineItemService, NotesService,
};
use hembudget_domain::{CategoryTemplate, Ledger, LineAmounts, Month, MonthRecord};
use tracing::{debug, info, warn};

use crate::{
    errors::{BudgetError, Result},
    session::Session,
    utils,
};

/// A ledger held in memory together with what its load reported.
#[derive(Debug, Clone)]
struct OpenLedger {
    ledger: Ledger,
    warnings: Vec<String>,
}

/// Facade that scopes ledgers to sessions and persists every change.
///
/// Mutations run against a copy of the cached ledger; the copy is saved and
/// only then replaces the cached one, so a failed validation or save leaves
/// both memory and disk as they were.
pub struct LedgerManager {
    storage: Box<dyn LedgerStorage>,
    template: CategoryTemplate,
    open: HashMap<String, OpenLedger>,
}

impl LedgerManager {
    pub fn new(storage: Box<dyn LedgerStorage>, template: CategoryTemplate) -> Self {
        Self {
            storage,
            template,
            open: HashMap::new(),
        }
    }

    /// Manager over the JSON store described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let storage = utils::json_storage(config)?;
        Ok(Self::new(Box::new(storage), config.resolved_template()))
    }

    /// The session's ledger, loading it on first use. A user with nothing
    /// stored gets a fresh ledger, which is saved immediately.
    pub fn load_ledger(&mut self, session: &Session) -> Result<&Ledger> {
        self.ensure_loaded(session)?;
        self.cached(session)
    }

    /// The cached ledger, if this session has loaded one.
    pub fn ledger(&self, session: &Session) -> Option<&Ledger> {
        self.open.get(&session.key()).map(|open| &open.ledger)
    }

    /// Warnings reported when the session's ledger was loaded.
    pub fn load_warnings(&self, session: &Session) -> &[String] {
        self.open
            .get(&session.key())
            .map(|open| open.warnings.as_slice())
            .unwrap_or(&[])
    }

    /// Creates the month from the template if needed and returns it.
    pub fn select_month(&mut self, session: &Session, month: Month) -> Result<&MonthRecord> {
        let created = self.commit(session, |ledger| {
            Ok(LedgerService::select_month(ledger, month))
        })?;
        if created {
            debug!(user = session.username(), %month, "seeded month from template");
        }
        self.cached(session)?
            .month(month)
            .ok_or_else(|| BudgetError::NotFound(format!("{month} is not available")))
    }

    pub fn upsert_line_item(
        &mut self,
        session: &Session,
        month: Month,
        category: &str,
        item: &str,
        amounts: LineAmounts,
    ) -> Result<()> {
        self.commit(session, |ledger| {
            LineItemService::upsert(ledger, month, category, item, amounts)
        })
    }

    /// Returns `false` when there was no such item.
    pub fn delete_line_item(
        &mut self,
        session: &Session,
        month: Month,
        category: &str,
        item: &str,
    ) -> Result<bool> {
        self.commit(session, |ledger| {
            Ok(LineItemService::delete(ledger, month, category, item))
        })
    }

    pub fn rename_category(
        &mut self,
        session: &Session,
        month: Month,
        old: &str,
        new: &str,
    ) -> Result<()> {
        self.commit(session, |ledger| {
            CategoryService::rename(ledger, month, old, new)
        })
    }

    pub fn add_category(&mut self, session: &Session, month: Month, name: &str) -> Result<()> {
        self.commit(session, |ledger| CategoryService::add(ledger, month, name))
    }

    pub fn remove_category(
        &mut self,
        session: &Session,
        month: Month,
        name: &str,
    ) -> Result<bool> {
        self.commit(session, |ledger| {
            Ok(CategoryService::remove(ledger, month, name))
        })
    }

    pub fn move_category(
        &mut self,
        session: &Session,
        month: Month,
        name: &str,
        index: usize,
    ) -> Result<()> {
        self.commit(session, |ledger| {
            CategoryService::move_to(ledger, month, name, index)
        })
    }

    pub fn set_notes(&mut self, session: &Session, month: Month, text: &str) -> Result<()> {
        self.commit(session, |ledger| {
            NotesService::set(ledger, month, text);
            Ok(())
        })
    }

    /// Writes a snapshot of the session's ledger to the backup area.
    pub fn backup(&mut self, session: &Session, note: Option<&str>) -> Result<LedgerBackupInfo> {
        self.ensure_loaded(session)?;
        let ledger = self.cached(session)?;
        let info = self.storage.backup_ledger(session.username(), ledger, note)?;
        info!(user = session.username(), backup = %info.id, "ledger backup created");
        Ok(info)
    }

    /// Newest first.
    pub fn list_backups(&self, session: &Session) -> Result<Vec<LedgerBackupInfo>> {
        Ok(self.storage.list_backups(session.username())?)
    }

    /// Replaces the session's ledger with the backup identified by `id`.
    pub fn restore_backup(&mut self, session: &Session, id: &str) -> Result<&Ledger> {
        let backup = self
            .list_backups(session)?
            .into_iter()
            .find(|info| info.id == id)
            .ok_or_else(|| {
                BudgetError::NotFound(format!(
                    "backup `{id}` does not exist for {}",
                    session.username()
                ))
            })?;
        let report = self.storage.restore_backup(&backup)?;
        info!(user = session.username(), backup = %backup.id, "ledger restored from backup");
        self.install(session, report);
        self.cached(session)
    }

    fn ensure_loaded(&mut self, session: &Session) -> Result<()> {
        if self.open.contains_key(&session.key()) {
            return Ok(());
        }
        match self.storage.load_ledger(session.username())? {
            Some(report) => {
                debug!(user = session.username(), path = %report.path.display(), "ledger loaded");
                self.install(session, report);
            }
            None => {
                let ledger = LedgerService::create(session.username(), self.template.clone());
                self.storage.save_ledger(session.username(), &ledger)?;
                info!(user = session.username(), "created new ledger");
                self.open.insert(
                    session.key(),
                    OpenLedger {
                        ledger,
                        warnings: Vec::new(),
                    },
                );
            }
        }
        Ok(())
    }

    fn install(&mut self, session: &Session, report: LoadReport) {
        for migration in &report.migrations {
            info!(user = session.username(), "{migration}");
        }
        for warning in &report.warnings {
            warn!(user = session.username(), "{warning}");
        }
        self.open.insert(
            session.key(),
            OpenLedger {
                ledger: report.ledger,
                warnings: report.warnings,
            },
        );
    }

    fn cached(&self, session: &Session) -> Result<&Ledger> {
        self.ledger(session).ok_or_else(|| {
            BudgetError::NotFound(format!("no ledger loaded for {}", session.username()))
        })
    }

    /// Applies `mutate` to a copy, saves the copy if it changed, then keeps it.
    fn commit<T>(
        &mut self,
        session: &Session,
        mutate: impl FnOnce(&mut Ledger) -> std::result::Result<T, CoreError>,
    ) -> Result<T> {
        self.ensure_loaded(session)?;
        let current = self.cached(session)?;
        let mut draft = current.clone();
        let outcome = mutate(&mut draft)?;
        if draft == *current {
            return Ok(outcome);
        }
        self.storage.save_ledger(session.username(), &draft)?;
        debug!(user = session.username(), "ledger saved");
        if let Some(open) = self.open.get_mut(&session.key()) {
            open.ledger = draft;
        }
        Ok(outcome)
    }
}
