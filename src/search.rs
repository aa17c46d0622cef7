//! List search
//!
//! Dashboards narrow an already-fetched list by a free-text term. Filtering
//! is a pure function of the list and the term.

/// Records that can be narrowed by a search box
pub trait Searchable {
    /// Text columns the term is matched against
    fn search_fields(&self) -> Vec<&str>;

    fn matches_term(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        needle.is_empty()
            || self
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Keep the items where any searched field contains `term`, ignoring case.
///
/// A blank term keeps everything. Order is preserved.
pub fn filter_by_term<T: Searchable>(items: Vec<T>, term: &str) -> Vec<T> {
    if term.trim().is_empty() {
        return items;
    }
    items.into_iter().filter(|item| item.matches_term(term)).collect()
}

/// Borrowing variant for callers that keep the full list
pub fn filter_refs<'a, T: Searchable>(items: &'a [T], term: &str) -> Vec<&'a T> {
    items.iter().filter(|item| item.matches_term(term)).collect()
}
