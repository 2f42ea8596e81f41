//! GraphQL documents and response shapes for the content endpoint.
//!
//! The schema is owned by the backend; only the fields the storefront renders
//! are selected.

use serde::{Deserialize, Serialize};

use crate::backend::{CategoryProducts, Faq, PageContent, SiteConfig};

pub const SITE_CONFIG: &str = r"
query SiteConfig {
  siteConfig {
    siteName
    tagline
    supportEmail
    supportPhone
    whatsapp
    address
    stats { label value }
  }
}
";

pub const PAGE_CONTENT: &str = r"
query PageContent($slug: String!) {
  pageContent(slug: $slug) {
    slug
    title
    body
    updatedAt
  }
}
";

pub const FAQS: &str = r"
query Faqs {
  faqs {
    question
    answer
    category
  }
}
";

pub const CATEGORY_PRODUCTS: &str = r"
query CategoryProducts($slug: String!, $limit: Int!) {
  categoryProducts(slug: $slug, limit: $limit) {
    slug
    name
    products {
      id
      name
      brand
      price
      originalPrice
      currency
      rating
      reviews
      image
      inStock
      features
      category
    }
  }
}
";

/// Variables for queries without arguments.
#[derive(Debug, Serialize)]
pub struct NoVariables {}

#[derive(Debug, Serialize)]
pub struct SlugVariables<'a> {
    pub slug: &'a str,
}

#[derive(Debug, Serialize)]
pub struct CategoryVariables<'a> {
    pub slug: &'a str,
    pub limit: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfigData {
    pub site_config: Option<SiteConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContentData {
    pub page_content: Option<PageContent>,
}

#[derive(Debug, Deserialize)]
pub struct FaqsData {
    #[serde(default)]
    pub faqs: Vec<Faq>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryProductsData {
    pub category_products: Option<CategoryProducts>,
}
