//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                              - Home page (hero, sliders, flash-sale slot)
//!
//! # Catalog
//! GET  /products/{id}                 - Product detail
//! GET  /categories/{slug}             - Category listing
//!
//! # Search
//! GET  /search?q=                     - Results page (records the query)
//! GET  /search/suggest?q=&sid=        - Debounced suggestions (HTMX fragment)
//! POST /search/recent/clear           - Forget recent searches (fragment)
//!
//! # Cart (HTMX fragments)
//! GET  /cart                          - Cart page
//! POST /cart/add                      - Add to cart (triggers cartUpdated)
//! POST /cart/update                   - Update quantity (cart_items fragment)
//! POST /cart/remove                   - Remove item (cart_items fragment)
//! GET  /cart/count                    - Cart count badge (fragment)
//!
//! # Checkout
//! GET  /checkout                      - Summary + customer form
//! POST /checkout/pay                  - Start a Flutterwave hosted payment
//! GET  /checkout/callback             - Flutterwave redirect target
//!
//! # Account (requires auth)
//! GET  /account                       - Dashboard
//! GET  /account/events                - Dashboard SSE (30 s poll)
//! POST /account/notifications/{id}/read
//! POST /account/notifications/read-all
//! GET  /account/orders?status=        - Order history
//! GET  /account/orders/events         - Order history SSE (60 s poll)
//! GET  /account/orders/{id}           - Order detail
//! GET  /account/profile               - Profile settings
//! POST /account/profile               - Update profile
//! GET  /account/returns               - Return requests
//! POST /account/returns               - Open a return
//!
//! # Auth
//! GET  /auth/login, POST /auth/login
//! GET  /auth/register, POST /auth/register
//! POST /auth/logout
//!
//! # Pages
//! GET  /about, /faq, /returns, /warranty, /offline, /coming-soon
//! GET  /blog, /blog/{slug}
//! GET  /contact, POST /contact
//!
//! # Widgets (HTMX fragments)
//! GET  /widgets/flash-sale            - Flash-sale popup
//! GET  /widgets/flash-sale/countdown  - Countdown SSE
//! POST /widgets/flash-sale/dismiss    - Close the popup
//! GET  /widgets/slider/{source}       - Product slider window
//! ```

pub mod account;
pub mod auth;
pub mod blog;
pub mod cart;
pub mod checkout;
pub mod contact;
pub mod home;
pub mod pages;
pub mod products;
pub mod search;
pub mod widgets;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{form_rate_limiter, suggest_rate_limiter};
use crate::state::AppState;

/// Create the product and category routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products/{id}", get(products::show))
        .route("/categories/{slug}", get(products::category))
}

/// Create the search routes router.
pub fn search_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(search::results))
        .route(
            "/suggest",
            get(search::suggest).layer(suggest_rate_limiter()),
        )
        .route("/recent/clear", post(search::clear_recent))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/pay", post(checkout::pay).layer(form_rate_limiter()))
        .route("/callback", get(checkout::callback))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::dashboard::show))
        .route("/events", get(account::dashboard::events))
        .route(
            "/notifications/{id}/read",
            post(account::dashboard::mark_read),
        )
        .route(
            "/notifications/read-all",
            post(account::dashboard::mark_all_read),
        )
        .route("/orders", get(account::orders::index))
        .route("/orders/events", get(account::orders::events))
        .route("/orders/{id}", get(account::orders::show))
        .route(
            "/profile",
            get(account::profile::show).post(account::profile::update),
        )
        .route(
            "/returns",
            get(account::returns::index).post(account::returns::create),
        )
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            get(auth::login_page).merge(post(auth::login).layer(form_rate_limiter())),
        )
        .route(
            "/register",
            get(auth::register_page).merge(post(auth::register).layer(form_rate_limiter())),
        )
        .route("/logout", post(auth::logout))
}

/// Create the static page, blog and contact routes router.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/about", get(pages::about))
        .route("/faq", get(pages::faq))
        .route("/returns", get(pages::returns_policy))
        .route("/warranty", get(pages::warranty))
        .route("/offline", get(pages::offline))
        .route("/coming-soon", get(pages::coming_soon))
        .route("/blog", get(blog::index))
        .route("/blog/{slug}", get(blog::show))
        .route(
            "/contact",
            get(contact::show).merge(post(contact::submit).layer(form_rate_limiter())),
        )
}

/// Create the widget fragment routes router.
pub fn widget_routes() -> Router<AppState> {
    Router::new()
        .route("/flash-sale", get(widgets::flash_sale))
        .route("/flash-sale/countdown", get(widgets::countdown))
        .route("/flash-sale/dismiss", post(widgets::dismiss))
        .route("/slider/{source}", get(widgets::slider))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .merge(catalog_routes())
        .merge(page_routes())
        .nest("/search", search_routes())
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .nest("/account", account_routes())
        .nest("/auth", auth_routes())
        .nest("/widgets", widget_routes())
}

#[cfg(test)]
pub(crate) mod tests {
    use axum::{Router, body::Body, http::Request};
    use tower_sessions::{MemoryStore, SessionManagerLayer};

    use super::routes;
    use crate::middleware::csp_middleware;
    use crate::state::tests::test_state;

    /// The full router over an in-memory session store and unreachable
    /// backends.
    pub(crate) fn test_app() -> Router {
        test_app_with_store(MemoryStore::default())
    }

    pub(crate) fn test_app_with_store(store: MemoryStore) -> Router {
        routes()
            .layer(SessionManagerLayer::new(store).with_secure(false))
            .layer(axum::middleware::from_fn(csp_middleware))
            .with_state(test_state())
    }

    /// A GET with the client IP header the rate limiters key on.
    #[allow(clippy::unwrap_used)]
    pub(crate) fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("x-forwarded-for", "41.186.0.7")
            .body(Body::empty())
            .unwrap()
    }

    /// A form POST with the client IP header.
    #[allow(clippy::unwrap_used)]
    pub(crate) fn post_form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("x-forwarded-for", "41.186.0.7")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    /// A `Cookie` header value for a session already holding a signed-in
    /// customer. Pair with [`test_app_with_store`] over the same store.
    #[allow(clippy::unwrap_used)]
    pub(crate) async fn signed_in_cookie(store: &MemoryStore) -> String {
        use std::sync::Arc;

        use kivu_core::{Email, UserId};
        use tower_sessions::Session;

        use crate::models::{CurrentCustomer, session_keys};

        let session = Session::new(None, Arc::new(store.clone()), None);
        let customer = CurrentCustomer {
            id: UserId::new(42),
            name: "Amina Uwase".to_string(),
            email: Email::parse("amina@example.rw").unwrap(),
            phone: Some("+250788000111".to_string()),
            access_token: "test-token".to_string(),
        };
        session
            .insert(session_keys::CURRENT_CUSTOMER, &customer)
            .await
            .unwrap();
        session.save().await.unwrap();
        format!("id={}", session.id().unwrap())
    }

    /// The session cookie set by a response, ready to send back.
    pub(crate) fn session_cookie(response: &axum::response::Response) -> Option<String> {
        response
            .headers()
            .get(axum::http::header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string)
    }

    /// Read a response body as text.
    #[allow(clippy::unwrap_used)]
    pub(crate) async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }
}
