//! hembudget-domain
//!
//! Pure domain models (Ledger, MonthRecord, CategoryRecord, LineItem, templates, totals).
//! No I/O, no CLI, no storage. Only data types and core enums.

pub mod amount;
pub mod common;
pub mod ledger;
pub mod month;
pub mod template;
pub mod totals;

pub use common::*;
pub use ledger::*;
pub use month::*;
pub use template::*;
pub use totals::*;
