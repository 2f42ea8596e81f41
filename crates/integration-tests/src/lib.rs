//! Integration tests for the Kivu Imports storefront.
//!
//! The tests in `tests/` are `#[ignore]`d: they drive a running storefront
//! over HTTP.
//!
//! ```bash
//! cargo run -p kivu-storefront &
//! STOREFRONT_BASE_URL=http://localhost:3000 \
//!     cargo test -p kivu-integration-tests -- --ignored
//! ```
//!
//! Tests that need the REST service to accept a sign-in also read
//! `TEST_CUSTOMER_EMAIL` and `TEST_CUSTOMER_PASSWORD`, and skip when unset.

use reqwest::Client;
use reqwest::redirect::Policy;

/// Base URL of the storefront under test.
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL")
        .unwrap_or_else(|_| "http://localhost:3000".to_string())
        .trim_end_matches('/')
        .to_string()
}

/// A client that keeps the session cookie and does not follow redirects, so
/// tests can assert on `Location`.
///
/// # Panics
///
/// Panics if the HTTP client cannot be built.
#[must_use]
pub fn session_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// Credentials for a real customer account, if configured.
#[must_use]
pub fn test_customer() -> Option<(String, String)> {
    let email = std::env::var("TEST_CUSTOMER_EMAIL").ok()?;
    let password = std::env::var("TEST_CUSTOMER_PASSWORD").ok()?;
    Some((email, password))
}

/// Sign `client` in with the configured test customer.
///
/// Returns `false` when no test customer is configured.
///
/// # Panics
///
/// Panics if the login request fails or is rejected.
pub async fn sign_in(client: &Client) -> bool {
    let Some((email, password)) = test_customer() else {
        return false;
    };
    let resp = client
        .post(format!("{}/auth/login", storefront_base_url()))
        .form(&[("email", email.as_str()), ("password", password.as_str())])
        .send()
        .await
        .expect("Failed to post login");
    assert!(
        resp.status().is_redirection(),
        "login rejected: {}",
        resp.status()
    );
    true
}
