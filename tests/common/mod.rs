#![allow(dead_code)]

use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};

use hembudget::{LedgerManager, Session};
use hembudget_core::{
    storage::{LedgerBackupInfo, LedgerStorage, LoadReport},
    CoreError,
};
use hembudget_domain::{CategoryTemplate, Ledger};
use hembudget_storage_json::{JsonLedgerStorage, StoragePaths};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn temp_root() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

pub fn json_storage(root: &std::path::Path) -> JsonLedgerStorage {
    JsonLedgerStorage::with_retention(StoragePaths::under(root), 3).expect("create json storage")
}

/// Manager over a fresh directory; the template only contributes zero rows.
pub fn setup_test_env(template: CategoryTemplate) -> (LedgerManager, JsonLedgerStorage) {
    let storage = json_storage(&temp_root());
    let manager = LedgerManager::new(Box::new(storage.clone()), template);
    (manager, storage)
}

pub fn session(name: &str) -> Session {
    Session::new(name).expect("valid session")
}

/// Storage whose saves can be switched to fail.
pub struct FlakyStorage {
    inner: JsonLedgerStorage,
    fail_saves: Arc<AtomicBool>,
}

impl FlakyStorage {
    pub fn new(inner: JsonLedgerStorage) -> (Self, Arc<AtomicBool>) {
        let flag = Arc::new(AtomicBool::new(false));
        (
            Self {
                inner,
                fail_saves: Arc::clone(&flag),
            },
            flag,
        )
    }
}

impl LedgerStorage for FlakyStorage {
    fn save_ledger(&self, name: &str, ledger: &Ledger) -> Result<(), CoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(CoreError::Storage("disk unavailable".into()));
        }
        self.inner.save_ledger(name, ledger)
    }

    fn load_ledger(&self, name: &str) -> Result<Option<LoadReport>, CoreError> {
        self.inner.load_ledger(name)
    }

    fn list_ledgers(&self) -> Result<Vec<String>, CoreError> {
        self.inner.list_ledgers()
    }

    fn backup_ledger(
        &self,
        name: &str,
        ledger: &Ledger,
        note: Option<&str>,
    ) -> Result<LedgerBackupInfo, CoreError> {
        self.inner.backup_ledger(name, ledger, note)
    }

    fn list_backups(&self, name: &str) -> Result<Vec<LedgerBackupInfo>, CoreError> {
        self.inner.list_backups(name)
    }

    fn restore_backup(&self, backup: &LedgerBackupInfo) -> Result<LoadReport, CoreError> {
        self.inner.restore_backup(backup)
    }
}
