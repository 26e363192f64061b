//! hembudget-config
//!
//! Persistent settings: where ledgers live, how many backups to keep, which
//! category template seeds new months, and extra log directives.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::{home_dir, Config, TemplateChoice, HOME_ENV};
