//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::filters;
use crate::state::AppState;
use crate::views::{Layout, PageContext};

/// A slider slot the page fills in over HTMX.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliderSlot {
    /// `featured` or a category slug, passed to `/widgets/slider/{source}`.
    pub source: String,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    /// Featured slider first, then one per configured home category.
    pub sliders: Vec<SliderSlot>,
    /// Seconds before the flash-sale popup loads; `None` when disabled.
    pub flash_sale_delay_secs: Option<u64>,
}

/// Slider slots for the configured home categories.
fn slider_slots(categories: &[String]) -> Vec<SliderSlot> {
    std::iter::once("featured")
        .chain(categories.iter().map(String::as_str))
        .map(|source| SliderSlot {
            source: source.to_string(),
        })
        .collect()
}

/// Display the home page.
#[instrument(skip(state, page))]
pub async fn home(State(state): State<AppState>, page: PageContext) -> impl IntoResponse {
    let shop = &state.config().shop;

    HomeTemplate {
        layout: page.layout("Electronics and auto parts from Dubai").await,
        sliders: slider_slots(&shop.home_categories),
        flash_sale_delay_secs: shop
            .flash_sale
            .enabled
            .then(|| shop.flash_sale.show_after.as_secs()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use tower::ServiceExt;

    use super::*;
    use crate::routes::tests::{body_text, get, test_app};

    #[test]
    fn test_featured_slider_comes_first() {
        let slots = slider_slots(&["electronics".to_string(), "auto-parts".to_string()]);
        let sources: Vec<&str> = slots.iter().map(|s| s.source.as_str()).collect();
        assert_eq!(sources, vec!["featured", "electronics", "auto-parts"]);
    }

    #[tokio::test]
    async fn test_home_renders_slots() {
        let response = test_app().oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("content-security-policy"));
        let body = body_text(response).await;
        assert!(body.contains("/widgets/slider/featured"));
        assert!(body.contains("/widgets/slider/electronics"));
        assert!(body.contains("load delay:5s"));
    }
}
