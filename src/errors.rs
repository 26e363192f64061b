use std::result::Result as StdResult;

use hembudget_config::ConfigError;
use hembudget_core::CoreError;
use thiserror::Error;

/// Unified error type for the ledger facade and its callers.
#[derive(Error, Debug)]
pub enum BudgetError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Persistence error: {0}")]
    StorageError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = StdResult<T, BudgetError>;

/// User-facing CLI error wrapper.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] BudgetError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Usage: {0}")]
    Usage(String),
}

impl From<std::io::Error> for BudgetError {
    fn from(err: std::io::Error) -> Self {
        BudgetError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for BudgetError {
    fn from(err: serde_json::Error) -> Self {
        BudgetError::StorageError(err.to_string())
    }
}

impl From<CoreError> for BudgetError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(message) => BudgetError::Validation(message),
            CoreError::NotFound(message) => BudgetError::NotFound(message),
            CoreError::Conflict(message) => BudgetError::Conflict(message),
            CoreError::Storage(message) | CoreError::Serde(message) => {
                BudgetError::StorageError(message)
            }
            CoreError::Io(err) => BudgetError::StorageError(err.to_string()),
        }
    }
}

impl From<ConfigError> for BudgetError {
    fn from(err: ConfigError) -> Self {
        BudgetError::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_keep_their_kind() {
        assert!(matches!(
            BudgetError::from(CoreError::Conflict("Mat".into())),
            BudgetError::Conflict(_)
        ));
        assert!(matches!(
            BudgetError::from(CoreError::Serde("bad".into())),
            BudgetError::StorageError(_)
        ));
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        assert!(matches!(
            BudgetError::from(CoreError::Io(io)),
            BudgetError::StorageError(_)
        ));
    }
}
