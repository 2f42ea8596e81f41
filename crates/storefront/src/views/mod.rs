//! Page chrome shared by every full-page template.
//!
//! Handlers take a [`PageContext`] and call [`PageContext::layout`] to get
//! the header/footer data: site settings, CSP nonce, signed-in customer,
//! queued toasts and a fresh search token for the search bar's debounce.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::backend::SiteConfig;
use crate::error::AppError;
use crate::middleware::CspNonce;
use crate::models::{CurrentCustomer, Toast, session_keys};
use crate::state::AppState;

/// Data every page layout needs.
#[derive(Debug, Clone)]
pub struct Layout {
    /// Page title, without the site name suffix.
    pub title: String,
    pub site: SiteConfig,
    pub nonce: String,
    pub customer_name: Option<String>,
    pub toasts: Vec<Toast>,
    /// Identifies this page's search bar for suggestion debouncing.
    pub search_token: String,
}

impl Layout {
    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        self.customer_name.is_some()
    }
}

/// Request-scoped handles for rendering a full page.
pub struct PageContext {
    state: AppState,
    session: Session,
    nonce: CspNonce,
    customer: Option<CurrentCustomer>,
}

impl FromRequestParts<AppState> for PageContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;
        let nonce = parts
            .extensions
            .get::<CspNonce>()
            .cloned()
            .unwrap_or_else(CspNonce::generate);
        let customer = session
            .get::<CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
            .await
            .ok()
            .flatten();

        Ok(Self {
            state: state.clone(),
            session,
            nonce,
            customer,
        })
    }
}

impl PageContext {
    /// Build the layout, draining queued toasts.
    pub async fn layout(&self, title: impl Into<String>) -> Layout {
        Layout {
            title: title.into(),
            site: self.state.site_config().await,
            nonce: self.nonce.value().to_string(),
            customer_name: self.customer.as_ref().map(|c| c.first_name().to_string()),
            toasts: Toast::take_all(&self.session).await,
            search_token: uuid::Uuid::new_v4().simple().to_string(),
        }
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub const fn customer(&self) -> Option<&CurrentCustomer> {
        self.customer.as_ref()
    }
}
