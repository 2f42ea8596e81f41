//! Request and response payloads exchanged with the backend services.
//!
//! Domain entities (products, orders, notifications, returns, users) live in
//! `kivu_core`; this module holds the service-specific wrappers around them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kivu_core::{CartItem, CartTotals, CurrencyCode, Order, Price, Product, ProductId, User};

// =============================================================================
// REST payloads
// =============================================================================

/// Account dashboard summary (`GET /dashboard/summary`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    #[serde(default)]
    pub total_orders: u32,
    #[serde(default)]
    pub pending_orders: u32,
    #[serde(default)]
    pub total_spent: Decimal,
    #[serde(default)]
    pub currency: CurrencyCode,
    #[serde(default)]
    pub wishlist_count: u32,
    #[serde(default)]
    pub open_returns: u32,
    #[serde(default)]
    pub recent_orders: Vec<Order>,
}

impl DashboardSummary {
    /// Lifetime spend as a price.
    #[must_use]
    pub const fn total_spent_price(&self) -> Price {
        Price::new(self.total_spent, self.currency)
    }
}

/// A backend cart identified by its token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub token: String,
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub currency: CurrencyCode,
}

impl Cart {
    /// Totals computed locally from the line totals.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        CartTotals::compute(&self.items, self.currency)
    }
}

/// Body of `POST /cart/{token}/items`.
#[derive(Debug, Clone, Serialize)]
pub struct AddCartItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Body of `PUT /cart/{token}/items/{item_id}`.
#[derive(Debug, Clone, Serialize)]
pub struct CartQuantity {
    pub quantity: u32,
}

/// Body of `POST /auth/login`.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Body of `POST /auth/register`.
#[derive(Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub password: String,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// Result of a successful login or registration.
#[derive(Clone, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

/// Body of `PUT /user/profile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Body of `POST /contact`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
}

/// Body of `POST /payments/confirm`, sent once Flutterwave verified a charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentConfirmation {
    pub tx_ref: String,
    pub transaction_id: u64,
    pub cart_token: String,
    pub amount: Decimal,
    pub currency: CurrencyCode,
}

// =============================================================================
// GraphQL payloads
// =============================================================================

/// Company-wide settings shown in the footer, About and Contact pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    pub site_name: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub support_email: Option<String>,
    #[serde(default)]
    pub support_phone: Option<String>,
    #[serde(default)]
    pub whatsapp: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub stats: Vec<SiteStat>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_name: "Kivu Imports".to_string(),
            tagline: "Electronics and auto parts from Dubai, delivered in Rwanda".to_string(),
            support_email: None,
            support_phone: None,
            whatsapp: None,
            address: Some("Kigali, Rwanda".to_string()),
            stats: Vec::new(),
        }
    }
}

/// A headline number on the About page ("10k+ customers").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteStat {
    pub label: String,
    pub value: String,
}

/// A CMS-managed page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContent {
    pub slug: String,
    pub title: String,
    /// Rendered HTML body.
    pub body: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// A frequently asked question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
    #[serde(default = "default_faq_category")]
    pub category: String,
}

fn default_faq_category() -> String {
    "General".to_string()
}

/// FAQs sharing a category, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaqGroup {
    pub category: String,
    pub items: Vec<Faq>,
}

/// Group FAQs by category, keeping the order categories first appear in.
#[must_use]
pub fn group_faqs(faqs: Vec<Faq>) -> Vec<FaqGroup> {
    let mut groups: Vec<FaqGroup> = Vec::new();
    for faq in faqs {
        match groups.iter_mut().find(|g| g.category == faq.category) {
            Some(group) => group.items.push(faq),
            None => groups.push(FaqGroup {
                category: faq.category.clone(),
                items: vec![faq],
            }),
        }
    }
    groups
}

/// Product list for a category slider.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CategoryProducts {
    pub slug: String,
    pub name: String,
    pub products: Vec<Product>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn faq(question: &str, category: &str) -> Faq {
        Faq {
            question: question.to_string(),
            answer: "Yes.".to_string(),
            category: category.to_string(),
        }
    }

    #[test]
    fn test_group_faqs_keeps_first_seen_order() {
        let groups = group_faqs(vec![
            faq("How long is shipping?", "Shipping"),
            faq("Can I pay with MoMo?", "Payments"),
            faq("Do you ship to Musanze?", "Shipping"),
        ]);
        let categories: Vec<&str> = groups.iter().map(|g| g.category.as_str()).collect();
        assert_eq!(categories, vec!["Shipping", "Payments"]);
        assert_eq!(groups[0].items.len(), 2);
    }

    #[test]
    fn test_faq_category_defaults() {
        let faq: Faq = serde_json::from_str(r#"{"question":"Q","answer":"A"}"#).unwrap();
        assert_eq!(faq.category, "General");
    }

    #[test]
    fn test_dashboard_summary_tolerates_missing_fields() {
        let summary: DashboardSummary = serde_json::from_str(r#"{"total_orders":4}"#).unwrap();
        assert_eq!(summary.total_orders, 4);
        assert!(summary.recent_orders.is_empty());
        assert_eq!(summary.currency, CurrencyCode::RWF);
    }

    #[test]
    fn test_secrets_redacted_in_debug() {
        let creds = Credentials {
            email: "amina@example.rw".to_string(),
            password: "hunter2-hunter2".to_string(),
        };
        assert!(!format!("{creds:?}").contains("hunter2"));
    }
}
