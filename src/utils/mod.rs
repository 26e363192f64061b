use std::sync::Once;

use hembudget_config::{home_dir, Config, ConfigManager};
use hembudget_storage_json::{JsonLedgerStorage, StoragePaths};

use crate::errors::Result;

static TRACING_INIT: Once = Once::new();

const DEFAULT_DIRECTIVE: &str = "hembudget=info";

/// Installs the global `tracing` subscriber once. `RUST_LOG` replaces the
/// default directive; `extra` directives (comma separated) are added on top.
pub fn init_tracing(extra: Option<&str>) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let mut filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
        for directive in extra.unwrap_or_default().split(',') {
            let directive = directive.trim();
            if directive.is_empty() {
                continue;
            }
            if let Ok(parsed) = directive.parse() {
                filter = filter.add_directive(parsed);
            }
        }

        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

/// Loads `config/config.json` below the hembudget home directory.
pub fn load_config() -> Result<Config> {
    let manager = ConfigManager::with_base_dir(&home_dir())?;
    Ok(manager.load()?)
}

/// JSON storage rooted where `config` says, with its retention and template.
pub fn json_storage(config: &Config) -> Result<JsonLedgerStorage> {
    let paths = StoragePaths::under(&config.resolve_data_root());
    let storage = JsonLedgerStorage::with_retention(paths, config.backup_retention)?
        .with_legacy_template(config.resolved_template());
    Ok(storage)
}
