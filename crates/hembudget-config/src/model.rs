use std::{ffi::OsString, fmt, path::PathBuf, str::FromStr};

use hembudget_domain::CategoryTemplate;
use serde::{Deserialize, Serialize};

/// Environment variable that relocates the whole hembudget home directory.
pub const HOME_ENV: &str = "HEMBUDGET_HOME";
const HOME_DIR_NAME: &str = ".hembudget";

/// User settings persisted as `config/config.json` under the home directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Root for `ledgers/` and `backups/`. Defaults to the home directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_root: Option<PathBuf>,
    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,
    #[serde(default)]
    pub template: TemplateChoice,
    /// Replaces the built-in template when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_template: Option<CategoryTemplate>,
    /// Extra `tracing` directives, e.g. `hembudget=debug`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_root: None,
            backup_retention: Self::default_backup_retention(),
            template: TemplateChoice::default(),
            custom_template: None,
            log_filter: None,
        }
    }
}

impl Config {
    pub fn default_backup_retention() -> usize {
        5
    }

    pub fn resolve_data_root(&self) -> PathBuf {
        match &self.data_root {
            Some(path) => path.clone(),
            None => home_dir(),
        }
    }

    /// The template new months are seeded from.
    pub fn resolved_template(&self) -> CategoryTemplate {
        match &self.custom_template {
            Some(template) => template.clone(),
            None => self.template.template(),
        }
    }
}

/// Built-in category templates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateChoice {
    #[default]
    Household,
    Compact,
    Empty,
}

impl TemplateChoice {
    pub fn template(self) -> CategoryTemplate {
        match self {
            TemplateChoice::Household => CategoryTemplate::household(),
            TemplateChoice::Compact => CategoryTemplate::compact(),
            TemplateChoice::Empty => CategoryTemplate::empty(),
        }
    }
}

impl fmt::Display for TemplateChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TemplateChoice::Household => "household",
            TemplateChoice::Compact => "compact",
            TemplateChoice::Empty => "empty",
        };
        f.write_str(label)
    }
}

impl FromStr for TemplateChoice {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "household" => Ok(TemplateChoice::Household),
            "compact" => Ok(TemplateChoice::Compact),
            "empty" => Ok(TemplateChoice::Empty),
            other => Err(format!("unknown template `{other}`")),
        }
    }
}

/// `$HEMBUDGET_HOME`, else `~/.hembudget`.
pub fn home_dir() -> PathBuf {
    home_from(std::env::var_os(HOME_ENV))
}

fn home_from(env: Option<OsString>) -> PathBuf {
    match env {
        Some(value) if !value.is_empty() => PathBuf::from(value),
        _ => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(HOME_DIR_NAME),
    }
}
