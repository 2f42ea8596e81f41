//! GraphQL client for site configuration, page content, FAQs and category
//! product lists.
//!
//! Uses `graphql_client`'s request/response envelopes with `reqwest` 0.13 for
//! HTTP. Responses are cached using `moka` (5-minute TTL).

mod cache;
mod queries;

use std::sync::Arc;
use std::time::Duration;

use graphql_client::{QueryBody, Response};
use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::{BackendError, CategoryProducts, Faq, GraphQLError, PageContent, SiteConfig};
use crate::config::BackendConfig;

use cache::{CacheKey, CacheValue};
use queries::{
    CATEGORY_PRODUCTS, CategoryProductsData, CategoryVariables, FAQS, FaqsData, NoVariables,
    PAGE_CONTENT, PageContentData, SITE_CONFIG, SiteConfigData, SlugVariables,
};

/// Client for the GraphQL content endpoint.
#[derive(Clone)]
pub struct ContentClient {
    inner: Arc<ContentClientInner>,
}

struct ContentClientInner {
    client: reqwest::Client,
    endpoint: Url,
    token: Option<SecretString>,
    cache: Cache<CacheKey, CacheValue>,
}

impl ContentClient {
    /// Create a new content client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            inner: Arc::new(ContentClientInner {
                client,
                endpoint: config.graphql_url.clone(),
                token: config.graphql_token.clone(),
                cache,
            }),
        })
    }

    /// Execute a GraphQL query.
    async fn execute<V, D>(
        &self,
        operation_name: &'static str,
        query: &'static str,
        variables: V,
    ) -> Result<D, BackendError>
    where
        V: Serialize,
        D: DeserializeOwned,
    {
        let body = QueryBody {
            variables,
            query,
            operation_name,
        };

        let mut request = self
            .inner
            .client
            .post(self.inner.endpoint.clone())
            .json(&body);
        if let Some(token) = &self.inner.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                operation_name,
                body = %response_text.chars().take(500).collect::<String>(),
                "Content API returned non-success status"
            );
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: response_text.chars().take(200).collect(),
            });
        }

        let response: Response<D> = serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                operation_name,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse GraphQL response"
            );
            BackendError::Parse(e)
        })?;

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            debug!(errors = ?errors, "GraphQL errors in response");
            return Err(BackendError::GraphQL(
                errors
                    .into_iter()
                    .map(|e| GraphQLError {
                        message: e.message,
                        path: e.path.map_or_else(Vec::new, |p| {
                            p.into_iter()
                                .map(|fragment| match fragment {
                                    graphql_client::PathFragment::Key(s) => s,
                                    graphql_client::PathFragment::Index(i) => i.to_string(),
                                })
                                .collect()
                        }),
                    })
                    .collect(),
            ));
        }

        response.data.ok_or_else(|| {
            BackendError::GraphQL(vec![GraphQLError {
                message: "No data in response".to_string(),
                path: vec![],
            }])
        })
    }

    /// Company settings; missing config is an error so callers can fall back.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the endpoint has no config.
    #[instrument(skip(self))]
    pub async fn site_config(&self) -> Result<SiteConfig, BackendError> {
        if let Some(CacheValue::SiteConfig(config)) =
            self.inner.cache.get(&CacheKey::SiteConfig).await
        {
            debug!("Cache hit for site config");
            return Ok(*config);
        }

        let data: SiteConfigData = self
            .execute("SiteConfig", SITE_CONFIG, NoVariables {})
            .await?;
        let config = data
            .site_config
            .ok_or_else(|| BackendError::NotFound("siteConfig".to_string()))?;

        self.inner
            .cache
            .insert(
                CacheKey::SiteConfig,
                CacheValue::SiteConfig(Box::new(config.clone())),
            )
            .await;
        Ok(config)
    }

    /// A CMS page by slug; `Ok(None)` when the CMS has no such page.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    #[instrument(skip(self))]
    pub async fn page_content(&self, slug: &str) -> Result<Option<PageContent>, BackendError> {
        let key = CacheKey::Page(slug.to_string());
        if let Some(CacheValue::Page(page)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for page");
            return Ok(page.map(|p| *p));
        }

        let data: PageContentData = self
            .execute("PageContent", PAGE_CONTENT, SlugVariables { slug })
            .await?;

        self.inner
            .cache
            .insert(
                key,
                CacheValue::Page(data.page_content.clone().map(Box::new)),
            )
            .await;
        Ok(data.page_content)
    }

    /// All FAQs in display order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    #[instrument(skip(self))]
    pub async fn faqs(&self) -> Result<Vec<Faq>, BackendError> {
        if let Some(CacheValue::Faqs(faqs)) = self.inner.cache.get(&CacheKey::Faqs).await {
            debug!("Cache hit for faqs");
            return Ok(faqs);
        }

        let data: FaqsData = self.execute("Faqs", FAQS, NoVariables {}).await?;
        self.inner
            .cache
            .insert(CacheKey::Faqs, CacheValue::Faqs(data.faqs.clone()))
            .await;
        Ok(data.faqs)
    }

    /// Products for a category slider or listing.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] for an unknown category.
    #[instrument(skip(self))]
    pub async fn category_products(
        &self,
        slug: &str,
        limit: i64,
    ) -> Result<CategoryProducts, BackendError> {
        let key = CacheKey::Category {
            slug: slug.to_string(),
            limit,
        };
        if let Some(CacheValue::Category(category)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for category");
            return Ok(*category);
        }

        let data: CategoryProductsData = self
            .execute(
                "CategoryProducts",
                CATEGORY_PRODUCTS,
                CategoryVariables { slug, limit },
            )
            .await?;
        let category = data
            .category_products
            .ok_or_else(|| BackendError::NotFound(format!("category {slug}")))?;

        self.inner
            .cache
            .insert(key, CacheValue::Category(Box::new(category.clone())))
            .await;
        Ok(category)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::tests::test_config;

    #[test]
    fn test_response_with_errors_parses() {
        let body = r#"{"data":null,"errors":[{"message":"Unknown slug","path":["pageContent",0]}]}"#;
        let response: Response<PageContentData> = serde_json::from_str(body).unwrap();
        assert!(response.data.is_none());
        assert_eq!(response.errors.unwrap()[0].message, "Unknown slug");
    }

    #[test]
    fn test_category_products_parse_camel_case() {
        let body = r#"{"categoryProducts":{"slug":"electronics","name":"Electronics","products":[
            {"id":7,"name":"Galaxy A15","price":"189000","originalPrice":"210000","inStock":false,"rating":4.5,"reviews":12}
        ]}}"#;
        let data: CategoryProductsData = serde_json::from_str(body).unwrap();
        let category = data.category_products.unwrap();
        assert_eq!(category.products.len(), 1);
        assert!(!category.products[0].in_stock);
        assert_eq!(category.products[0].discount_percent(), Some(10));
    }

    #[tokio::test]
    async fn test_cached_page_skips_network() {
        // Endpoint is unreachable, so a hit proves the cache answered.
        let client = ContentClient::new(&test_config().backend).unwrap();
        client
            .inner
            .cache
            .insert(CacheKey::Page("about".to_string()), CacheValue::Page(None))
            .await;
        assert_eq!(client.page_content("about").await.unwrap(), None);
        assert!(client.page_content("warranty").await.is_err());
    }
}
