//! Clients for the external services the storefront reads from and writes to.
//!
//! # Architecture
//!
//! - The REST service (dashboard, orders, user, returns, products, cart,
//!   auth, contact, payment confirmation) answers with
//!   `{success, data, message, errors}` envelopes, see [`Envelope`]
//! - The GraphQL endpoint serves site configuration, page content, FAQs and
//!   category product lists; responses are cached with `moka` (5 minute TTL)
//! - The backend is the source of truth: nothing is synced locally
//! - No retries; callers degrade to empty state and toast the failure
//!
//! # Example
//!
//! ```rust,ignore
//! use kivu_storefront::backend::{ApiClient, ContentClient};
//!
//! let api = ApiClient::new(&config.backend)?;
//! let featured = api.featured_products().await?;
//!
//! let content = ContentClient::new(&config.backend)?;
//! let site = content.site_config().await?;
//! ```

mod api;
mod envelope;
mod graphql;
pub mod types;

pub use api::ApiClient;
pub use envelope::{Envelope, FieldErrors};
pub use graphql::ContentClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the backend services.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (connection refused, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status without a usable envelope.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Envelope came back with `success: false`.
    #[error("Request rejected: {0}")]
    Envelope(String),

    /// Envelope carried per-field validation errors.
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Missing or expired customer token.
    #[error("Not signed in")]
    Unauthorized,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),
}

impl BackendError {
    /// Whether the request gave up waiting for the service.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }

    /// Message that is safe to show a customer in a toast.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Envelope(message) => message.clone(),
            Self::Validation(errors) => errors
                .first_message()
                .unwrap_or("Please check the highlighted fields")
                .to_string(),
            Self::Unauthorized => "Please sign in to continue".to_string(),
            Self::NotFound(_) => "We couldn't find that".to_string(),
            Self::Http(e) if e.is_timeout() => {
                "The service is taking too long to respond. Please try again.".to_string()
            }
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}

/// A GraphQL error returned by the content endpoint.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Path to the error in the response.
    pub path: Vec<String>,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .enumerate()
        .map(|(i, e)| match (e.message.is_empty(), e.path.is_empty()) {
            (false, true) => e.message.clone(),
            (false, false) => format!("{} path: {}", e.message, e.path.join(".")),
            (true, false) => format!("path: {}", e.path.join(".")),
            (true, true) => format!("[error {}]: (no details)", i + 1),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::NotFound("/orders/42".to_string());
        assert_eq!(err.to_string(), "Not found: /orders/42");

        let err = BackendError::Api {
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 502 - bad gateway");
    }

    #[test]
    fn test_graphql_error_formatting() {
        let err = BackendError::GraphQL(vec![
            GraphQLError {
                message: "Unknown slug".to_string(),
                path: vec![],
            },
            GraphQLError {
                message: "Forbidden".to_string(),
                path: vec!["pageContent".to_string(), "body".to_string()],
            },
        ]);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: Unknown slug; Forbidden path: pageContent.body"
        );
    }

    #[test]
    fn test_graphql_error_no_details() {
        let err = BackendError::GraphQL(vec![GraphQLError {
            message: String::new(),
            path: vec![],
        }]);
        assert_eq!(err.to_string(), "GraphQL errors: [error 1]: (no details)");
        assert_eq!(
            BackendError::GraphQL(vec![]).to_string(),
            "GraphQL errors: (no error details provided)"
        );
    }

    #[test]
    fn test_user_message_hides_internals() {
        let err = BackendError::Api {
            status: 500,
            message: "stack trace".to_string(),
        };
        assert!(!err.user_message().contains("stack trace"));

        let err = BackendError::Envelope("Cart is locked".to_string());
        assert_eq!(err.user_message(), "Cart is locked");

        let mut errors = FieldErrors::default();
        errors.insert("email", "Email is already taken");
        assert_eq!(
            BackendError::Validation(errors).user_message(),
            "Email is already taken"
        );
    }
}
