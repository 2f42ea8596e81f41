//! Account route handlers.
//!
//! Every route here requires a signed-in customer ([`RequireAuth`]). Pages
//! that refresh themselves (dashboard, order history) open an SSE stream
//! backed by a [`Poller`](crate::live::Poller); closing the tab drops the
//! stream and stops the poll.
//!
//! [`RequireAuth`]: crate::middleware::auth::RequireAuth

pub mod dashboard;
pub mod orders;
pub mod profile;
pub mod returns;

use axum::response::{IntoResponse, Redirect, Response};
use tower_sessions::Session;

use crate::middleware::auth::clear_current_customer;
use crate::models::Toast;

/// Tabs of the account navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountTab {
    Dashboard,
    Orders,
    Profile,
    Returns,
}

impl AccountTab {
    pub const ALL: [Self; 4] = [Self::Dashboard, Self::Orders, Self::Profile, Self::Returns];

    /// Every tab, for rendering the navigation from any one of them.
    #[must_use]
    pub const fn siblings(self) -> [Self; 4] {
        Self::ALL
    }

    #[must_use]
    pub const fn href(self) -> &'static str {
        match self {
            Self::Dashboard => "/account",
            Self::Orders => "/account/orders",
            Self::Profile => "/account/profile",
            Self::Returns => "/account/returns",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Orders => "Orders",
            Self::Profile => "Profile",
            Self::Returns => "Returns",
        }
    }
}

/// The backend no longer accepts the stored token: sign out and send the
/// customer to the login page, returning to `next` afterwards.
pub(crate) async fn session_expired(session: &Session, next: &str) -> Response {
    tracing::info!("Customer token rejected, signing out");
    if let Err(e) = clear_current_customer(session).await {
        tracing::warn!(error = %e, "Failed to clear expired customer");
    }
    crate::error::clear_sentry_user();
    Toast::info("Your session has expired. Please sign in again.")
        .push(session)
        .await;
    let location = format!("/auth/login?next={}", urlencoding::encode(next));
    Redirect::to(&location).into_response()
}

/// Tracks the last fragment sent over a live stream so unchanged polls are
/// skipped.
#[derive(Debug, Default)]
pub(crate) struct FragmentDiff {
    last: Option<String>,
}

impl FragmentDiff {
    /// `Some(html)` if it differs from the previous fragment.
    pub(crate) fn changed(&mut self, html: String) -> Option<String> {
        if self.last.as_deref() == Some(html.as_str()) {
            return None;
        }
        self.last = Some(html.clone());
        Some(html)
    }
}
