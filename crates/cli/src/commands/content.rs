//! Content checks for the bundled markdown pages and blog posts.

use std::fmt;
use std::path::Path;

use kivu_storefront::content::{ContentError, ContentStore, LoadMode};

/// Where the storefront binary loads content from.
pub const DEFAULT_CONTENT_DIR: &str = "crates/storefront/content";

/// What a successful check found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentReport {
    pub pages: usize,
    pub posts: usize,
}

impl fmt::Display for ContentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Content OK: {} pages, {} posts", self.pages, self.posts)
    }
}

/// Load every file under `dir`, failing on the first one that does not parse.
///
/// # Errors
///
/// Returns an error if `dir` is not a directory or any file fails to load.
pub fn check(dir: &Path) -> Result<ContentReport, ContentError> {
    if !dir.is_dir() {
        return Err(ContentError::Io(format!(
            "{} is not a directory",
            dir.display()
        )));
    }

    let store = ContentStore::load_with(dir, LoadMode::Strict)?;
    let report = ContentReport {
        pages: store.page_count(),
        posts: store.post_count(),
    };
    tracing::info!(pages = report.pages, posts = report.posts, "Content loaded");
    Ok(report)
}
