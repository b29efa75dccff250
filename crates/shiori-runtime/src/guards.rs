//! Preconditions deciding whether a query may run at all.

/// Shortest trimmed search text that is sent to the catalog.
pub const MIN_SEARCH_LENGTH: usize = 2;

/// True when `query` is long enough to search for. Counts characters, not
/// bytes, so two Cyrillic letters qualify.
pub fn search_enabled(query: &str) -> bool {
    query.trim().chars().count() >= MIN_SEARCH_LENGTH
}

pub fn anime_enabled(id: &str) -> bool {
    !id.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_needs_two_characters_after_trimming() {
        assert!(!search_enabled(""));
        assert!(!search_enabled("a"));
        assert!(!search_enabled("  a  "));
        assert!(search_enabled("ab"));
        assert!(search_enabled(" ab "));
        assert!(search_enabled("ва"));
    }

    #[test]
    fn anime_needs_an_id() {
        assert!(!anime_enabled(""));
        assert!(!anime_enabled("   "));
        assert!(anime_enabled("52991"));
    }
}
