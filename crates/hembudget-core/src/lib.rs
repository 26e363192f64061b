//! hembudget-core
//!
//! Business logic and services for the household ledger.
//! Depends on hembudget-domain. No CLI, no terminal I/O, no direct storage interactions.

pub mod category_service;
pub mod error;
pub mod ledger_service;
pub mod line_item_service;
pub mod notes_service;
pub mod storage;
pub mod summary_service;

pub use category_service::*;
pub use error::CoreError;
pub use ledger_service::*;
pub use line_item_service::*;
pub use notes_service::*;
pub use summary_service::*;
