//! Recently submitted search queries.

use serde::{Deserialize, Serialize};

/// How many queries are remembered.
pub const MAX_RECENT_SEARCHES: usize = 5;

/// Most-recent-first list of distinct search queries.
///
/// Stored in the session under a fixed key; the search dropdown shows it when
/// the input is too short to fetch suggestions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecentSearches(Vec<String>);

impl RecentSearches {
    /// Record a submitted query.
    ///
    /// Whitespace is trimmed and blank queries are ignored. A query that is
    /// already present (case-insensitively) moves to the front with the new
    /// spelling. The oldest entries fall off past [`MAX_RECENT_SEARCHES`].
    pub fn record(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        let lowered = query.to_lowercase();
        self.0.retain(|existing| existing.to_lowercase() != lowered);
        self.0.insert(0, query.to_string());
        self.0.truncate(MAX_RECENT_SEARCHES);
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Entries, most recent first.
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
