use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;

use crate::domain::entity::errors::EntityError;
use crate::domain::values::strip_document_separators;

/// Store-generated numeric record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RecordId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(RecordId)
    }
}

/// Bookkeeping carried by every record: identity, status flag, timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMeta {
    pub id: RecordId,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecordMeta {
    /// Metadata of a freshly inserted record: active, both timestamps equal.
    pub fn created(id: RecordId, at: DateTime<Utc>) -> Self {
        Self {
            id,
            active: true,
            created_at: at,
            updated_at: at,
        }
    }
}

/// A uniqueness-constrained field value, e.g. `cnpj = 12.345.678/0001-99`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueKey {
    pub field: &'static str,
    pub value: String,
}

impl UniqueKey {
    pub fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

/// Validated search input.
///
/// Keeps the raw term for name matching and a copy with the `.`, `/`, `-`
/// separators removed for matching formatted natural keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    raw: String,
    normalized: String,
}

impl SearchTerm {
    pub const MIN_LENGTH: usize = 2;

    /// Maximum number of results a search returns.
    pub const LIMIT: usize = 10;

    /// The term is measured and matched as submitted, surrounding
    /// whitespace included.
    pub fn new(term: &str) -> Result<Self, EntityError> {
        let length = term.chars().count();
        if length < Self::MIN_LENGTH {
            return Err(EntityError::SearchTermTooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            });
        }

        Ok(Self {
            raw: term.to_string(),
            normalized: strip_document_separators(term),
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Case-insensitive match on a name, or on a natural key once both sides
    /// are stripped of separators.
    pub fn matches(&self, name: &str, natural_key: &str) -> bool {
        let needle = self.raw.to_lowercase();
        if name.to_lowercase().contains(&needle) {
            return true;
        }

        !self.normalized.is_empty()
            && strip_document_separators(natural_key)
                .to_lowercase()
                .contains(&self.normalized.to_lowercase())
    }
}

/// A record type managed by the generic lifecycle.
///
/// Implementors describe their creation payload (`Draft`), their partial
/// update payload (`Patch`) and which of their fields must be unique.
/// Patches are merged field by field in [`Entity::apply`]; there is no
/// other way to change a stored record.
pub trait Entity: Clone + fmt::Debug + Send + Sync + 'static {
    type Draft: fmt::Debug + Send + Sync + 'static;
    type Patch: fmt::Debug + Send + Sync + 'static;

    /// Singular human-readable name used in error messages ("issuer").
    const KIND: &'static str;

    /// Build the stored form of a draft. Used by stores that assign ids
    /// themselves.
    fn materialize(draft: Self::Draft, meta: RecordMeta) -> Self;

    fn meta(&self) -> &RecordMeta;
    fn meta_mut(&mut self) -> &mut RecordMeta;

    /// Overwrite every field supplied in `patch`, leaving the rest alone.
    fn apply(&mut self, patch: Self::Patch);

    fn patch_is_empty(patch: &Self::Patch) -> bool;

    fn draft_unique_keys(draft: &Self::Draft) -> Vec<UniqueKey>;
    fn patch_unique_keys(patch: &Self::Patch) -> Vec<UniqueKey>;
    fn unique_keys(&self) -> Vec<UniqueKey>;

    /// Field compared by substring search.
    fn search_name(&self) -> &str;

    /// Natural key compared by search after separator stripping.
    fn search_key(&self) -> &str;

    fn id(&self) -> RecordId {
        self.meta().id
    }

    fn is_active(&self) -> bool {
        self.meta().active
    }

    fn set_active(&mut self, active: bool) {
        self.meta_mut().active = active;
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.meta_mut().updated_at = at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_term_minimum_length() {
        assert!(matches!(
            SearchTerm::new("a"),
            Err(EntityError::SearchTermTooShort { min: 2, actual: 1 })
        ));
        assert!(SearchTerm::new("ab").is_ok());
    }

    #[test]
    fn test_search_term_length_counts_whitespace() {
        let term = SearchTerm::new("a ").unwrap();

        assert_eq!(term.raw(), "a ");
        assert!(term.matches("Casa Nova", "11.111.111/0001-11"));
        assert!(!term.matches("Abacus", "11.111.111/0001-11"));
        assert!(matches!(
            SearchTerm::new(" ").unwrap_err(),
            EntityError::SearchTermTooShort { actual: 1, .. }
        ));
    }

    #[test]
    fn test_search_term_matches_name_case_insensitively() {
        let term = SearchTerm::new("ab").unwrap();

        assert!(term.matches("Abacus Ltd", "11.111.111/0001-11"));
        assert!(!term.matches("Globex", "12.345.678/0001-99"));
    }

    #[test]
    fn test_search_term_matches_normalized_key() {
        let digits = SearchTerm::new("12345678").unwrap();
        let formatted = SearchTerm::new("345.678/0001").unwrap();

        assert!(digits.matches("Globex", "12.345.678/0001-99"));
        assert!(formatted.matches("Globex", "12345678000199"));
    }

    #[test]
    fn test_separator_only_term_does_not_match_every_key() {
        let term = SearchTerm::new("..").unwrap();

        assert_eq!(term.normalized(), "");
        assert!(!term.matches("Globex", "12.345.678/0001-99"));
    }

    #[test]
    fn test_record_id_parse() {
        assert_eq!("42".parse::<RecordId>().unwrap(), RecordId(42));
        assert!("abc".parse::<RecordId>().is_err());
    }
}
