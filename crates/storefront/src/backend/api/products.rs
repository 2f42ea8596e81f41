//! Catalog endpoints. These are public; no customer token is sent.

use tracing::instrument;

use kivu_core::{Product, ProductId};

use super::ApiClient;
use crate::backend::BackendError;

impl ApiClient {
    /// Products for the featured slider.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn featured_products(&self) -> Result<Vec<Product>, BackendError> {
        self.get("products/featured", None).await
    }

    /// One product by id.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] for an unknown id.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<Product, BackendError> {
        self.get(&format!("products/{id}"), None).await
    }

    /// Full-text product search.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn search_products(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Product>, BackendError> {
        let limit = limit.to_string();
        self.get_with_query("products/search", &[("q", query), ("limit", limit.as_str())])
            .await
    }

    /// Type-ahead suggestions for the search bar.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn product_suggestions(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Product>, BackendError> {
        let limit = limit.to_string();
        self.get_with_query(
            "products/suggestions",
            &[("q", query), ("limit", limit.as_str())],
        )
        .await
    }
}
