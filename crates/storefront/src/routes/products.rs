//! Product detail and category listing handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::instrument;

use kivu_core::{Product, ProductId};

use crate::backend::BackendError;
use crate::error::{AppError, Result};
use crate::filters;
use crate::models::Toast;
use crate::state::AppState;
use crate::views::{Layout, PageContext};

/// Products shown on a category page.
const CATEGORY_PAGE_LIMIT: i64 = 48;

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub layout: Layout,
    pub product: Product,
}

/// Category listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/category.html")]
pub struct CategoryTemplate {
    pub layout: Layout,
    pub products: Vec<Product>,
}

/// "auto-parts" -> "Auto Parts", for when the CMS is unavailable.
fn title_from_slug(slug: &str) -> String {
    slug.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Display a product.
#[instrument(skip(state, page))]
pub async fn show(
    State(state): State<AppState>,
    page: PageContext,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let product = match state.api().product(id).await {
        Ok(product) => product,
        Err(BackendError::NotFound(_)) => {
            return Err(AppError::NotFound(format!("product {id}")));
        }
        Err(e) => return Err(e.into()),
    };

    Ok(ProductShowTemplate {
        layout: page.layout(product.name.clone()).await,
        product,
    })
}

/// Display every product in a category.
#[instrument(skip(state, page))]
pub async fn category(
    State(state): State<AppState>,
    page: PageContext,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let (title, products) = match state
        .content_api()
        .category_products(&slug, CATEGORY_PAGE_LIMIT)
        .await
    {
        Ok(category) => (category.name, category.products),
        Err(BackendError::NotFound(_)) => {
            return Err(AppError::NotFound(format!("category {slug}")));
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch category {slug}");
            Toast::error("We couldn't load this category. Please try again shortly.")
                .push(page.session())
                .await;
            (title_from_slug(&slug), Vec::new())
        }
    };

    Ok(CategoryTemplate {
        layout: page.layout(title).await,
        products,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use tower::ServiceExt;

    use super::*;
    use crate::routes::tests::{body_text, get, test_app};

    #[test]
    fn test_title_from_slug() {
        assert_eq!(title_from_slug("auto-parts"), "Auto Parts");
        assert_eq!(title_from_slug("electronics"), "Electronics");
        assert_eq!(title_from_slug("--"), "");
    }

    #[tokio::test]
    async fn test_category_degrades_when_cms_is_down() {
        let response = test_app().oneshot(get("/categories/auto-parts")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Auto Parts"));
        assert!(body.contains("load this category"));
    }

    #[tokio::test]
    async fn test_product_with_backend_down_is_bad_gateway() {
        let response = test_app().oneshot(get("/products/42")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_non_numeric_product_id_is_rejected() {
        let response = test_app().oneshot(get("/products/abc")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
