//! Cache types for content endpoint responses.

use crate::backend::{CategoryProducts, Faq, PageContent, SiteConfig};

/// Cache key for GraphQL responses.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    SiteConfig,
    Page(String),
    Faqs,
    Category { slug: String, limit: i64 },
}

/// Cached value types.
///
/// A missing page is cached as `Page(None)` so unknown slugs fall back to
/// local markdown without a round trip each time.
#[derive(Debug, Clone)]
pub enum CacheValue {
    SiteConfig(Box<SiteConfig>),
    Page(Option<Box<PageContent>>),
    Faqs(Vec<Faq>),
    Category(Box<CategoryProducts>),
}
