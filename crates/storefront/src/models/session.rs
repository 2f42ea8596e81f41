//! Session-related types.
//!
//! The session holds per-visitor state that the browser would otherwise keep
//! in local storage: signed-in customer, cart token, recent searches, toasts,
//! optimistic notification reads and the payment in flight.

use serde::{Deserialize, Serialize};

use kivu_core::{Email, User, UserId};

/// Session-stored customer identity and backend token.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentCustomer {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    #[serde(default)]
    pub phone: Option<String>,
    /// Bearer token for the REST service.
    pub access_token: String,
}

impl CurrentCustomer {
    /// Build from a login/registration response.
    #[must_use]
    pub fn from_user(user: User, access_token: String) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            access_token,
        }
    }

    /// Token to send as `Authorization: Bearer`.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.access_token
    }

    /// First name for greetings.
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

impl std::fmt::Debug for CurrentCustomer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentCustomer")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("access_token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in customer.
    pub const CURRENT_CUSTOMER: &str = "current_customer";

    /// Key for storing the backend cart token.
    pub const CART_TOKEN: &str = "cart_token";

    /// Key for the recent search list.
    pub const RECENT_SEARCHES: &str = "recent_searches";

    /// Key for queued toast notifications.
    pub const TOASTS: &str = "toasts";

    /// Key for notification ids marked read before the service confirmed.
    pub const READ_NOTIFICATIONS: &str = "read_notifications";

    /// Key for the Flutterwave payment awaiting its callback.
    pub const PENDING_PAYMENT: &str = "pending_payment";

    /// Set once the customer closes the flash-sale popup.
    pub const FLASH_SALE_DISMISSED: &str = "flash_sale_dismissed";
}
