//! Free-text search over listing records.

/// A normalized, case-insensitive search term.
///
/// An empty (or whitespace-only) term matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTerm(String);

impl SearchTerm {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the term is a substring of any of `fields`, ignoring case.
    pub fn matches_any(&self, fields: &[&str]) -> bool {
        self.is_empty()
            || fields
                .iter()
                .any(|field| field.to_lowercase().contains(&self.0))
    }
}

/// Anything that can be searched by title, description, and location.
pub trait Searchable {
    fn search_fields(&self) -> [&str; 3];
}

/// Whether `item` matches `term` on any of its searchable fields.
pub fn matches<T: Searchable>(term: &SearchTerm, item: &T) -> bool {
    term.matches_any(&item.search_fields())
}
