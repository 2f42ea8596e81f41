//! Markdown pages and blog posts bundled with the storefront.
//!
//! Files under `content/pages` back the static pages (about, returns,
//! warranty, faq, offline, coming-soon) whenever the CMS has no entry for the
//! slug. Files under `content/blog` are the blog. Both are loaded once at
//! startup, front matter parsed with `gray_matter`, markdown rendered with
//! `comrak`.

use chrono::NaiveDate;
use comrak::{Options, markdown_to_html};
use gray_matter::{Matter, ParsedEntity, engine::YAML};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Metadata for static pages.
#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub updated_at: Option<NaiveDate>,
}

/// Metadata for blog posts
#[derive(Debug, Clone, Deserialize)]
pub struct PostMeta {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    pub published_at: NaiveDate,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub draft: bool,
}

/// A rendered page with metadata and HTML content
#[derive(Debug, Clone)]
pub struct Page {
    pub slug: String,
    pub meta: PageMeta,
    pub content_html: String,
}

/// A rendered blog post with metadata and HTML content
#[derive(Debug, Clone)]
pub struct Post {
    pub slug: String,
    pub meta: PostMeta,
    pub content_html: String,
    pub reading_time_minutes: u32,
}

/// How to treat a file that fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Log and skip it (server startup).
    Lenient,
    /// Fail on it (`kivu-cli content check`).
    Strict,
}

/// Content store that holds all loaded content in memory
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    pages: Arc<HashMap<String, Page>>,
    posts: Arc<Vec<Post>>,
}

impl ContentStore {
    /// Load all content, skipping files that fail to parse.
    ///
    /// # Errors
    ///
    /// Returns an error if a content directory exists but cannot be read.
    pub fn load(content_dir: &Path) -> Result<Self, ContentError> {
        Self::load_with(content_dir, LoadMode::Lenient)
    }

    /// Load all content with an explicit error policy.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be read, or in
    /// [`LoadMode::Strict`] for the first file that fails to parse.
    pub fn load_with(content_dir: &Path, mode: LoadMode) -> Result<Self, ContentError> {
        let pages = load_dir(&content_dir.join("pages"), mode, load_page)?
            .into_iter()
            .map(|page| (page.slug.clone(), page))
            .collect();

        let mut posts = load_dir(&content_dir.join("blog"), mode, load_post)?;
        // Newest first
        posts.sort_by(|a, b| b.meta.published_at.cmp(&a.meta.published_at));

        Ok(Self {
            pages: Arc::new(pages),
            posts: Arc::new(posts),
        })
    }

    /// Get a page by slug
    #[must_use]
    pub fn get_page(&self, slug: &str) -> Option<&Page> {
        self.pages.get(slug)
    }

    /// Number of loaded pages.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Get a published blog post by slug (drafts are not addressable)
    #[must_use]
    pub fn get_post(&self, slug: &str) -> Option<&Post> {
        self.get_published_posts().find(|p| p.slug == slug)
    }

    /// Get all published blog posts, newest first
    pub fn get_published_posts(&self) -> impl Iterator<Item = &Post> {
        self.posts.iter().filter(|p| !p.meta.draft)
    }

    /// Number of loaded posts, drafts included.
    #[must_use]
    pub fn post_count(&self) -> usize {
        self.posts.len()
    }

    /// Get recent published posts, optionally excluding a specific slug
    #[must_use]
    pub fn get_recent_posts(&self, limit: usize, exclude_slug: Option<&str>) -> Vec<&Post> {
        self.get_published_posts()
            .filter(|p| exclude_slug.is_none_or(|s| p.slug != s))
            .take(limit)
            .collect()
    }
}

/// Load every `.md` file in `dir` with `load`.
fn load_dir<T>(
    dir: &Path,
    mode: LoadMode,
    load: fn(&Path) -> Result<T, ContentError>,
) -> Result<Vec<T>, ContentError> {
    let mut items = Vec::new();

    if !dir.exists() {
        tracing::warn!("Content directory does not exist: {:?}", dir);
        return Ok(items);
    }

    let entries = std::fs::read_dir(dir).map_err(|e| ContentError::Io(e.to_string()))?;

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().is_none_or(|ext| ext != "md") {
            continue;
        }
        match load(&path) {
            Ok(item) => {
                tracing::debug!("Loaded content: {}", path.display());
                items.push(item);
            }
            Err(e) if mode == LoadMode::Strict => {
                return Err(ContentError::File(path.display().to_string(), Box::new(e)));
            }
            Err(e) => {
                tracing::error!("Failed to load content {:?}: {}", path, e);
            }
        }
    }

    Ok(items)
}

fn file_stem(path: &Path) -> Result<&str, ContentError> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ContentError::Parse("Invalid filename".to_string()))
}

fn parse_front_matter<M: serde::de::DeserializeOwned>(
    content: &str,
) -> Result<(M, String), ContentError> {
    let matter = Matter::<YAML>::new();
    let parsed: ParsedEntity<M> = matter
        .parse(content)
        .map_err(|e| ContentError::Parse(format!("Failed to parse frontmatter: {e}")))?;
    let meta = parsed
        .data
        .ok_or_else(|| ContentError::Parse("Missing frontmatter".to_string()))?;
    Ok((meta, parsed.content))
}

/// Load a single page from a markdown file
fn load_page(path: &Path) -> Result<Page, ContentError> {
    let content = std::fs::read_to_string(path).map_err(|e| ContentError::Io(e.to_string()))?;
    let slug = file_stem(path)?.to_string();
    let (meta, body) = parse_front_matter::<PageMeta>(&content)?;

    Ok(Page {
        slug,
        meta,
        content_html: render_markdown(&body),
    })
}

/// Load a single blog post from a markdown file
fn load_post(path: &Path) -> Result<Post, ContentError> {
    let content = std::fs::read_to_string(path).map_err(|e| ContentError::Io(e.to_string()))?;
    let slug = post_slug(file_stem(path)?);
    let (meta, body) = parse_front_matter::<PostMeta>(&content)?;

    // Estimate reading time (average 200 words per minute)
    let word_count = body.split_whitespace().count();
    let reading_time_minutes = u32::try_from(word_count.div_ceil(200)).unwrap_or(u32::MAX);

    Ok(Post {
        slug,
        meta,
        content_html: render_markdown(&body),
        reading_time_minutes: reading_time_minutes.max(1),
    })
}

/// Slug from a post filename: "2026-03-02-phone-imports" -> "phone-imports".
fn post_slug(filename: &str) -> String {
    let bytes = filename.as_bytes();
    let dated = bytes.len() > 11
        && bytes.get(4) == Some(&b'-')
        && bytes.get(7) == Some(&b'-')
        && bytes.get(10) == Some(&b'-')
        && filename.get(..4).is_some_and(|y| y.chars().all(|c| c.is_ascii_digit()));
    match filename.get(11..) {
        Some(rest) if dated => rest.to_string(),
        _ => filename.to_string(),
    }
}

/// Render markdown to HTML with GitHub Flavored Markdown support.
#[must_use]
pub fn render_markdown(content: &str) -> String {
    let mut options = Options::default();

    // Enable GFM extensions
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.header_ids = Some(String::new());

    // Content is ours; allow raw HTML in markdown
    options.render.r#unsafe = true;

    markdown_to_html(content, &options)
}

/// Content loading errors
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("{0}: {1}")]
    File(String, Box<ContentError>),
}
