use std::{fs, path::PathBuf};

use hembudget_config::{Config, ConfigError, ConfigManager, TemplateChoice};
use hembudget_domain::{CategoryTemplate, TemplateCategory};
use tempfile::tempdir;

#[test]
fn default_config_keeps_five_backups() {
    let cfg = Config::default();

    assert_eq!(cfg.backup_retention, 5);
    assert_eq!(cfg.template, TemplateChoice::Household);
    assert!(cfg.data_root.is_none());
}

#[test]
fn missing_config_file_loads_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path()).expect("manager");

    assert_eq!(manager.load().expect("load"), Config::default());
    assert_eq!(
        manager.config_path(),
        dir.path().join("config").join("config.json")
    );
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"));

    let cfg = Config {
        data_root: Some(PathBuf::from("/srv/hembudget")),
        backup_retention: 2,
        template: TemplateChoice::Compact,
        custom_template: Some(CategoryTemplate(vec![TemplateCategory::new(
            "Inkomster",
            ["Lön"],
        )])),
        log_filter: Some("hembudget=debug".into()),
    };

    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded, cfg);
    assert_eq!(loaded.resolve_data_root(), PathBuf::from("/srv/hembudget"));
    assert!(!dir.path().join("config.json.tmp").exists());
}

#[test]
fn partial_config_fills_defaults() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "template": "compact" }"#).expect("write");

    let loaded = ConfigManager::new(path).load().expect("load");
    assert_eq!(loaded.template, TemplateChoice::Compact);
    assert_eq!(loaded.backup_retention, 5);
    assert_eq!(loaded.resolved_template(), CategoryTemplate::compact());
}

#[test]
fn malformed_config_is_a_serde_error() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    fs::write(&path, "not json").expect("write");

    let err = ConfigManager::new(path).load().expect_err("must fail");
    assert!(matches!(err, ConfigError::Serde(_)));
}
