//! hembudget: a per-user, twelve-month household budget ledger.
//!
//! The [`manager::LedgerManager`] facade ties the pure services of
//! `hembudget-core` to a persistent store and commits each change whole.

pub mod cli;
pub mod errors;
pub mod manager;
pub mod session;
pub mod utils;

pub use errors::{BudgetError, CliError};
pub use manager::LedgerManager;
pub use session::Session;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing with the default filter.
pub fn init() {
    init_with_filter(None);
}

/// Initializes global tracing, adding `extra` directives to the default filter.
pub fn init_with_filter(extra: Option<&str>) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(extra);
        tracing::debug!("hembudget tracing initialized");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
