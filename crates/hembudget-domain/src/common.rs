//! Shared traits and name helpers for ledger entities.

/// Provides read-only access to an entity's display name.
pub trait NamedEntity {
    fn name(&self) -> &str;

    /// Returns `true` when the entity answers to `candidate` (surrounding whitespace ignored).
    fn is_named(&self, candidate: &str) -> bool {
        self.name() == candidate.trim()
    }
}

/// Trims a user-supplied name, returning `None` when nothing is left.
pub fn normalize_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Finds the position of the entity named `candidate` in `entries`.
pub fn position_of<T: NamedEntity>(entries: &[T], candidate: &str) -> Option<usize> {
    entries.iter().position(|entry| entry.is_named(candidate))
}
