use hembudget_storage_json::canonical_name;

use crate::errors::{BudgetError, Result};

/// Identifies whose ledger an operation targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Session {
    username: String,
}

impl Session {
    pub fn new(username: &str) -> Result<Self> {
        let trimmed = username.trim();
        if trimmed.is_empty() {
            return Err(BudgetError::Validation("username must not be empty".into()));
        }
        Ok(Self {
            username: trimmed.to_string(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Key of the session's ledger, both in the manager's cache and on disk.
    /// Usernames differing only in case share a ledger.
    pub fn key(&self) -> String {
        canonical_name(&self.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_usernames_are_rejected() {
        assert!(matches!(Session::new("  "), Err(BudgetError::Validation(_))));
        let session = Session::new(" Anki ").unwrap();
        assert_eq!(session.username(), "Anki");
        assert_eq!(session.key(), "anki");
    }

    #[test]
    fn keys_differ_for_names_that_differ_beyond_case() {
        let spaced = Session::new("Anki Berg").unwrap();
        let underscored = Session::new("Anki_Berg").unwrap();
        assert_ne!(spaced.key(), underscored.key());
        assert_eq!(spaced.key(), Session::new("anki berg").unwrap().key());
    }
}
