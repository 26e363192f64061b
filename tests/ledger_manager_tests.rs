mod common;

use std::{fs, sync::atomic::Ordering};

use common::{json_storage, session, setup_test_env, temp_root, FlakyStorage};
use hembudget::{BudgetError, LedgerManager};
use hembudget_core::{storage::LedgerStorage, NotesService, SummaryService};
use hembudget_domain::{CategoryTemplate, LineAmounts, Month, MonthTotals, RowStatus};

#[test]
fn januari_scenario_totals() {
    let (mut manager, _) = setup_test_env(CategoryTemplate::empty());
    let anki = session("Anki");

    manager
        .upsert_line_item(&anki, Month::Januari, "Inkomster", "Lön", LineAmounts::new(0.0, 3000.0))
        .expect("income");
    manager
        .upsert_line_item(&anki, Month::Januari, "Mat", "Livsmedel", LineAmounts::new(400.0, 350.0))
        .expect("food");

    let ledger = manager.load_ledger(&anki).expect("ledger");
    assert_eq!(
        SummaryService::month_totals(ledger, Month::Januari),
        MonthTotals {
            income_budget: 0.0,
            income_actual: 3000.0,
            expense_budget: 400.0,
            expense_actual: 350.0,
            remaining: 2650.0,
        }
    );
    assert_eq!(
        SummaryService::category_status(ledger, Month::Januari, "Mat"),
        RowStatus::Ok
    );
}

#[test]
fn new_user_gets_seeded_ledger_on_disk() {
    let (mut manager, storage) = setup_test_env(CategoryTemplate::compact());
    let dani = session("Dani");

    let ledger = manager.load_ledger(&dani).expect("fresh ledger");
    assert_eq!(ledger.owner, "Dani");
    assert!(ledger.months.is_empty());
    assert!(storage.ledger_path("Dani").exists());

    let record = manager.select_month(&dani, Month::Maj).expect("select");
    assert_eq!(record.categories.len(), 3);
    let stored = storage.load_ledger("Dani").expect("load").expect("present");
    assert!(stored.ledger.has_month(Month::Maj));
}

#[test]
fn mutations_survive_reload() {
    let root = temp_root();
    let anki = session("Anki");
    let mut manager = LedgerManager::new(Box::new(json_storage(&root)), CategoryTemplate::household());
    manager
        .upsert_line_item(&anki, Month::Mars, "Boende", "Hyra", LineAmounts::new(8500.0, 8500.0))
        .expect("upsert");
    manager
        .set_notes(&anki, Month::Mars, "Hyran höjd från april")
        .expect("notes");
    let before = manager.load_ledger(&anki).expect("ledger").clone();

    let mut reopened =
        LedgerManager::new(Box::new(json_storage(&root)), CategoryTemplate::household());
    let after = reopened.load_ledger(&anki).expect("reload");
    assert_eq!(after, &before);
    assert_eq!(NotesService::get(after, Month::Mars), "Hyran höjd från april");
    assert!(reopened.load_warnings(&anki).is_empty());
}

#[test]
fn rejected_upsert_changes_nothing() {
    let (mut manager, storage) = setup_test_env(CategoryTemplate::compact());
    let anki = session("Anki");
    manager
        .upsert_line_item(&anki, Month::April, "Inkomster", "Lön", LineAmounts::new(100.0, 120.0))
        .expect("upsert");
    let on_disk = fs::read_to_string(storage.ledger_path("Anki")).expect("read");

    let err = manager
        .upsert_line_item(&anki, Month::April, "Inkomster", "Lön", LineAmounts::new(-1.0, 5.0))
        .expect_err("negative budget");
    assert!(matches!(err, BudgetError::Validation(_)));
    let err = manager
        .upsert_line_item(&anki, Month::Juni, "Mat", "Mat", LineAmounts::new(1.0, -5.0))
        .expect_err("negative actual");
    assert!(matches!(err, BudgetError::Validation(_)));

    let ledger = manager.load_ledger(&anki).expect("ledger");
    let item = ledger.item(Month::April, "Inkomster", "Lön").expect("item");
    assert_eq!((item.budget, item.actual), (100.0, 120.0));
    assert!(!ledger.has_month(Month::Juni));
    assert_eq!(fs::read_to_string(storage.ledger_path("Anki")).expect("read"), on_disk);
}

#[test]
fn failed_save_keeps_memory_and_disk_in_step() {
    let root = temp_root();
    let (storage, fail_saves) = FlakyStorage::new(json_storage(&root));
    let mut manager = LedgerManager::new(Box::new(storage), CategoryTemplate::empty());
    let anki = session("Anki");
    manager
        .upsert_line_item(&anki, Month::Maj, "Mat", "Livsmedel", LineAmounts::new(400.0, 100.0))
        .expect("upsert");

    fail_saves.store(true, Ordering::SeqCst);
    let err = manager
        .upsert_line_item(&anki, Month::Maj, "Mat", "Livsmedel", LineAmounts::new(400.0, 900.0))
        .expect_err("save fails");
    assert!(matches!(err, BudgetError::StorageError(_)));
    assert!(manager.set_notes(&anki, Month::Maj, "borta").is_err());

    let ledger = manager.load_ledger(&anki).expect("ledger");
    assert_eq!(
        ledger.item(Month::Maj, "Mat", "Livsmedel").map(|item| item.actual),
        Some(100.0)
    );
    assert_eq!(NotesService::get(ledger, Month::Maj), "");

    let on_disk = json_storage(&root).load_ledger("Anki").expect("load").expect("present");
    assert_eq!(&on_disk.ledger, ledger);
}

#[test]
fn rename_errors_and_success() {
    let (mut manager, _) = setup_test_env(CategoryTemplate::compact());
    let anki = session("Anki");

    let err = manager
        .rename_category(&anki, Month::Juli, "Resor", "Semester")
        .expect_err("missing");
    assert!(matches!(err, BudgetError::NotFound(_)));
    let err = manager
        .rename_category(&anki, Month::Juli, "Fasta kostnader", "Inkomster")
        .expect_err("taken");
    assert!(matches!(err, BudgetError::Conflict(_)));
    let err = manager
        .rename_category(&anki, Month::Juli, "Fasta kostnader", "  ")
        .expect_err("blank");
    assert!(matches!(err, BudgetError::Validation(_)));
    assert!(!manager.load_ledger(&anki).expect("ledger").has_month(Month::Juli));

    manager
        .rename_category(&anki, Month::Juli, "Fasta kostnader", "Boende")
        .expect("rename");
    let ledger = manager.load_ledger(&anki).expect("ledger");
    let boende = ledger.category(Month::Juli, "Boende").expect("renamed");
    assert_eq!(boende.items.len(), 2);
    assert!(ledger.category(Month::Juli, "Fasta kostnader").is_none());
}

#[test]
fn category_management_through_manager() {
    let (mut manager, _) = setup_test_env(CategoryTemplate::compact());
    let anki = session("Anki");

    manager.add_category(&anki, Month::Augusti, "Sparande").expect("add");
    assert!(matches!(
        manager.add_category(&anki, Month::Augusti, "Sparande"),
        Err(BudgetError::Conflict(_))
    ));
    manager
        .move_category(&anki, Month::Augusti, "Sparande", 0)
        .expect("move");
    assert!(manager
        .remove_category(&anki, Month::Augusti, "Rörliga utgifter")
        .expect("remove"));
    assert!(!manager
        .remove_category(&anki, Month::Augusti, "Rörliga utgifter")
        .expect("second remove"));

    let names: Vec<&str> = manager
        .load_ledger(&anki)
        .expect("ledger")
        .month(Month::Augusti)
        .expect("month")
        .categories
        .iter()
        .map(|category| category.name.as_str())
        .collect();
    assert_eq!(names, ["Sparande", "Inkomster", "Fasta kostnader"]);
}

#[test]
fn delete_missing_item_is_a_no_op() {
    let (mut manager, _) = setup_test_env(CategoryTemplate::compact());
    let anki = session("Anki");
    assert!(!manager
        .delete_line_item(&anki, Month::Oktober, "Mat", "Kaffe")
        .expect("no-op"));
    assert!(manager
        .delete_line_item(&anki, Month::Oktober, "Rörliga utgifter", "Utemat")
        .is_ok());
    // the month was never selected, so the template item was not there either
    assert!(!manager.load_ledger(&anki).expect("ledger").has_month(Month::Oktober));

    manager.select_month(&anki, Month::Oktober).expect("select");
    assert!(manager
        .delete_line_item(&anki, Month::Oktober, "Rörliga utgifter", "Utemat")
        .expect("delete"));
}

#[test]
fn users_do_not_see_each_other() {
    let (mut manager, storage) = setup_test_env(CategoryTemplate::empty());
    let anki = session("Anki");
    let dani = session("Dani");

    manager
        .upsert_line_item(&anki, Month::Januari, "Mat", "Livsmedel", LineAmounts::new(1.0, 1.0))
        .expect("anki");
    manager.set_notes(&dani, Month::Januari, "Danis månad").expect("dani");

    assert!(manager
        .load_ledger(&dani)
        .expect("dani")
        .item(Month::Januari, "Mat", "Livsmedel")
        .is_none());
    assert_eq!(
        NotesService::get(manager.load_ledger(&anki).expect("anki"), Month::Januari),
        ""
    );
    assert_eq!(storage.list_ledgers().expect("list"), vec!["anki", "dani"]);
}

#[test]
fn similar_usernames_keep_separate_ledgers() {
    let (mut manager, storage) = setup_test_env(CategoryTemplate::empty());
    let spaced = session("Anki Berg");
    let underscored = session("Anki_Berg");

    manager
        .upsert_line_item(&spaced, Month::Januari, "Mat", "Livsmedel", LineAmounts::new(400.0, 350.0))
        .expect("spaced");
    manager
        .upsert_line_item(&underscored, Month::Januari, "Bilen", "Bränsle", LineAmounts::new(100.0, 90.0))
        .expect("underscored");

    let mut reopened = LedgerManager::new(Box::new(storage.clone()), CategoryTemplate::empty());
    let ledger = reopened.load_ledger(&spaced).expect("reload spaced");
    assert_eq!(ledger.owner, "Anki Berg");
    assert!(ledger.item(Month::Januari, "Mat", "Livsmedel").is_some());
    assert!(ledger.category(Month::Januari, "Bilen").is_none());
    let ledger = reopened.load_ledger(&underscored).expect("reload underscored");
    assert_eq!(ledger.owner, "Anki_Berg");
    assert!(ledger.category(Month::Januari, "Mat").is_none());
    assert_eq!(storage.list_ledgers().expect("list").len(), 2);

    // case alone does not make a different user
    let shouted = session("ANKI BERG");
    assert!(reopened
        .load_ledger(&shouted)
        .expect("same ledger")
        .item(Month::Januari, "Mat", "Livsmedel")
        .is_some());
}

#[test]
fn restore_can_be_undone() {
    let (mut manager, _) = setup_test_env(CategoryTemplate::empty());
    let anki = session("Anki");
    manager.set_notes(&anki, Month::Mars, "sparad").expect("notes");
    let info = manager.backup(&anki, Some("fore")).expect("backup");
    manager.set_notes(&anki, Month::Mars, "senaste").expect("notes");

    manager.restore_backup(&anki, &info.id).expect("restore");
    let newest = manager.list_backups(&anki).expect("list").remove(0);
    assert_ne!(newest.id, info.id);
    let undone = manager.restore_backup(&anki, &newest.id).expect("undo");
    assert_eq!(NotesService::get(undone, Month::Mars), "senaste");
}

#[test]
fn backups_restore_an_earlier_state() {
    let (mut manager, _) = setup_test_env(CategoryTemplate::empty());
    let anki = session("Anki");
    manager.set_notes(&anki, Month::Februari, "före").expect("notes");
    let info = manager.backup(&anki, Some("innan")).expect("backup");

    manager.set_notes(&anki, Month::Februari, "efter").expect("notes");
    assert!(manager
        .list_backups(&anki)
        .expect("list")
        .iter()
        .any(|entry| entry.id == info.id));

    let restored = manager.restore_backup(&anki, &info.id).expect("restore");
    assert_eq!(NotesService::get(restored, Month::Februari), "före");
    assert!(matches!(
        manager.restore_backup(&anki, "anki_19990101_000000.json"),
        Err(BudgetError::NotFound(_))
    ));
}

#[test]
fn legacy_file_loads_with_warnings() {
    let (mut manager, storage) = setup_test_env(CategoryTemplate::empty());
    fs::write(
        storage.ledger_path("Bo"),
        r#"{ "Juni": { "notes": "", "Nöje": { "Bio_0": { "Budget": "N/A", "Faktiskt": "120" } } } }"#,
    )
    .expect("write legacy");

    let bo = session("Bo");
    let ledger = manager.load_ledger(&bo).expect("legacy load");
    let item = ledger.item(Month::Juni, "Nöje", "Bio").expect("item");
    assert_eq!((item.budget, item.actual), (0.0, 120.0));
    assert_eq!(manager.load_warnings(&bo).len(), 1);

    manager
        .upsert_line_item(&bo, Month::Juni, "Nöje", "Bio", LineAmounts::new(150.0, 120.0))
        .expect("upsert");
    let raw = fs::read_to_string(storage.ledger_path("Bo")).expect("read");
    assert!(raw.contains("\"schema_version\": 1"));
}
