//! Static content page route handlers.
//!
//! Pages come from the CMS (`pageContent(slug)`) first and fall back to the
//! markdown files bundled under `content/pages` when the CMS has no entry or
//! cannot be reached.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::backend::{FaqGroup, PageContent, group_faqs};
use crate::content::Page;
use crate::error::AppError;
use crate::filters;
use crate::state::AppState;
use crate::views::{Layout, PageContext};

/// A content page ready for display.
#[derive(Debug, Clone)]
pub struct PageView {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub updated_at: Option<String>,
    pub body_html: String,
}

impl From<PageContent> for PageView {
    fn from(page: PageContent) -> Self {
        Self {
            slug: page.slug,
            title: page.title,
            description: None,
            updated_at: page.updated_at,
            body_html: page.body,
        }
    }
}

impl From<&Page> for PageView {
    fn from(page: &Page) -> Self {
        Self {
            slug: page.slug.clone(),
            title: page.meta.title.clone(),
            description: page.meta.description.clone(),
            updated_at: page
                .meta
                .updated_at
                .map(|d| d.format("%d %B %Y").to_string()),
            body_html: page.content_html.clone(),
        }
    }
}

/// Fetch a page from the CMS, falling back to the bundled markdown.
pub(crate) async fn load_page(state: &AppState, slug: &str) -> Option<PageView> {
    match state.content_api().page_content(slug).await {
        Ok(Some(page)) => return Some(page.into()),
        Ok(None) => tracing::debug!(slug, "No CMS page, using bundled content"),
        Err(e) => tracing::warn!(error = %e, slug, "CMS page fetch failed, using bundled content"),
    }
    state.content().get_page(slug).map(PageView::from)
}

/// Generic content page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/content.html")]
pub struct ContentPageTemplate {
    pub layout: Layout,
    pub page: PageView,
}

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/about.html")]
pub struct AboutTemplate {
    pub layout: Layout,
    pub page: Option<PageView>,
}

/// FAQ page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/faq.html")]
pub struct FaqTemplate {
    pub layout: Layout,
    pub groups: Vec<FaqGroup>,
    /// Bundled FAQ page, used when the CMS has no FAQs.
    pub fallback: Option<PageView>,
}

/// Serve a content page by slug.
async fn serve_content_page(
    state: &AppState,
    page: &PageContext,
    slug: &str,
) -> Result<Response, AppError> {
    let view = load_page(state, slug)
        .await
        .ok_or_else(|| AppError::NotFound(format!("page {slug}")))?;

    Ok(ContentPageTemplate {
        layout: page.layout(view.title.clone()).await,
        page: view,
    }
    .into_response())
}

/// Display the About page with the company's headline numbers.
#[instrument(skip(state, page))]
pub async fn about(State(state): State<AppState>, page: PageContext) -> impl IntoResponse {
    AboutTemplate {
        layout: page.layout("About us").await,
        page: load_page(&state, "about").await,
    }
}

/// Display the FAQ, grouped by category.
#[instrument(skip(state, page))]
pub async fn faq(State(state): State<AppState>, page: PageContext) -> impl IntoResponse {
    let groups = match state.content_api().faqs().await {
        Ok(faqs) => group_faqs(faqs),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch FAQs");
            Vec::new()
        }
    };
    let fallback = if groups.is_empty() {
        state.content().get_page("faq").map(PageView::from)
    } else {
        None
    };

    FaqTemplate {
        layout: page.layout("Frequently asked questions").await,
        groups,
        fallback,
    }
}

/// Display the returns policy.
///
/// # Errors
///
/// Returns 404 if the page doesn't exist.
#[instrument(skip(state, page))]
pub async fn returns_policy(
    State(state): State<AppState>,
    page: PageContext,
) -> Result<Response, AppError> {
    serve_content_page(&state, &page, "returns").await
}

/// Display the warranty terms.
///
/// # Errors
///
/// Returns 404 if the page doesn't exist.
#[instrument(skip(state, page))]
pub async fn warranty(
    State(state): State<AppState>,
    page: PageContext,
) -> Result<Response, AppError> {
    serve_content_page(&state, &page, "warranty").await
}

/// Display the offline notice.
///
/// # Errors
///
/// Returns 404 if the page doesn't exist.
#[instrument(skip(state, page))]
pub async fn offline(
    State(state): State<AppState>,
    page: PageContext,
) -> Result<Response, AppError> {
    serve_content_page(&state, &page, "offline").await
}

/// Display the coming-soon page.
///
/// # Errors
///
/// Returns 404 if the page doesn't exist.
#[instrument(skip(state, page))]
pub async fn coming_soon(
    State(state): State<AppState>,
    page: PageContext,
) -> Result<Response, AppError> {
    serve_content_page(&state, &page, "coming-soon").await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use tower::ServiceExt;

    use super::*;
    use crate::routes::tests::{body_text, get, test_app};

    #[test]
    fn test_cms_page_view() {
        let view = PageView::from(PageContent {
            slug: "warranty".to_string(),
            title: "Warranty".to_string(),
            body: "<p>12 months</p>".to_string(),
            updated_at: Some("2026-01-05".to_string()),
        });
        assert_eq!(view.body_html, "<p>12 months</p>");
        assert_eq!(view.updated_at.as_deref(), Some("2026-01-05"));
    }

    #[tokio::test]
    async fn test_policy_pages_fall_back_to_bundled_content() {
        for (uri, heading) in [
            ("/returns", "Returns policy"),
            ("/warranty", "Warranty"),
            ("/offline", "You're offline"),
            ("/coming-soon", "Coming soon"),
        ] {
            let response = test_app().oneshot(get(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            let body = body_text(response).await;
            assert!(body.contains(&heading.replace('\'', "&#39;")), "{uri}");
        }
    }

    #[tokio::test]
    async fn test_faq_falls_back_to_bundled_page() {
        let response = test_app().oneshot(get("/faq")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("How long does delivery take?"));
    }

    #[tokio::test]
    async fn test_about_uses_default_site_config() {
        let response = test_app().oneshot(get("/about")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Kigali, Rwanda"));
    }
}
