//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart itself lives in the backend; the session only holds its token.
//! Totals are always recomputed locally from the line totals.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderValue,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use kivu_core::{CartItem, CartItemId, CartTotals, CurrencyCode, ProductId};

use crate::backend::{BackendError, Cart};
use crate::filters;
use crate::models::{Toast, session_keys};
use crate::state::AppState;
use crate::views::{Layout, PageContext};

/// Largest quantity accepted for one line.
const MAX_LINE_QUANTITY: u32 = 99;

/// Cart display data for templates.
#[derive(Debug, Clone)]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub totals: CartTotals,
}

impl CartView {
    /// An empty cart; totals still include shipping.
    #[must_use]
    pub fn empty(currency: CurrencyCode) -> Self {
        Self {
            items: Vec::new(),
            totals: CartTotals::compute(&[], currency),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<Cart> for CartView {
    fn from(cart: Cart) -> Self {
        let totals = cart.totals();
        Self {
            items: cart.items,
            totals,
        }
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Get the cart token from the session.
pub(crate) async fn cart_token(session: &Session) -> Option<String> {
    session
        .get::<String>(session_keys::CART_TOKEN)
        .await
        .ok()
        .flatten()
}

/// Forget the cart token (after checkout or when the backend lost the cart).
pub(crate) async fn clear_cart_token(session: &Session) {
    if let Err(e) = session.remove::<String>(session_keys::CART_TOKEN).await {
        tracing::warn!(error = %e, "Failed to clear cart token");
    }
}

/// Fetch the session's cart, dropping a token the backend no longer knows.
///
/// # Errors
///
/// Returns the backend error for anything other than an unknown cart.
pub(crate) async fn load_cart(
    state: &AppState,
    session: &Session,
) -> Result<Option<Cart>, BackendError> {
    let Some(token) = cart_token(session).await else {
        return Ok(None);
    };
    match state.api().cart(&token).await {
        Ok(cart) => Ok(Some(cart)),
        Err(BackendError::NotFound(_)) => {
            tracing::info!("Cart token expired, starting over");
            clear_cart_token(session).await;
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Token of the session's cart, creating a cart on first use.
async fn ensure_cart_token(state: &AppState, session: &Session) -> Result<String, BackendError> {
    if let Some(token) = cart_token(session).await {
        return Ok(token);
    }
    let cart = state.api().create_cart().await?;
    if let Err(e) = session.insert(session_keys::CART_TOKEN, &cart.token).await {
        tracing::error!(error = %e, "Failed to store cart token");
    }
    Ok(cart.token)
}

/// `HX-Trigger` value announcing a cart change and/or a toast.
fn hx_trigger(cart_updated: bool, toast: &Toast) -> Option<HeaderValue> {
    let mut events = serde_json::Map::new();
    if cart_updated {
        events.insert("cartUpdated".to_string(), serde_json::Value::Null);
    }
    events.insert("showToast".to_string(), serde_json::json!(toast));
    HeaderValue::from_str(&serde_json::Value::Object(events).to_string()).ok()
}

fn with_trigger(response: impl IntoResponse, cart_updated: bool, toast: &Toast) -> Response {
    let mut response = response.into_response();
    if let Some(value) = hx_trigger(cart_updated, toast) {
        response.headers_mut().insert("hx-trigger", value);
    }
    response
}

// =============================================================================
// Forms and Templates
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub item_id: CartItemId,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub item_id: CartItemId,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: Layout,
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state, page))]
pub async fn show(State(state): State<AppState>, page: PageContext) -> impl IntoResponse {
    let currency = state.config().shop.currency;
    let cart = match load_cart(&state, page.session()).await {
        Ok(Some(cart)) => CartView::from(cart),
        Ok(None) => CartView::empty(currency),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch cart");
            Toast::error("We couldn't load your cart. Please refresh in a moment.")
                .push(page.session())
                .await;
            CartView::empty(currency)
        }
    };

    CartShowTemplate {
        layout: page.layout("Your cart").await,
        cart,
    }
}

/// Add item to cart (HTMX).
///
/// Returns an empty body with `HX-Trigger: cartUpdated` so the badge reloads.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Response {
    let quantity = form.quantity.unwrap_or(1).clamp(1, MAX_LINE_QUANTITY);

    let result = match ensure_cart_token(&state, &session).await {
        Ok(token) => {
            state
                .api()
                .add_cart_item(&token, form.product_id, quantity)
                .await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(_) => {
            crate::error::add_breadcrumb("cart", "Added to cart", None);
            with_trigger((), true, &Toast::success("Added to cart"))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to add to cart");
            if matches!(e, BackendError::NotFound(_)) {
                clear_cart_token(&session).await;
            }
            with_trigger((), false, &Toast::error(e.user_message()))
        }
    }
}

/// Update a line's quantity (HTMX); zero removes the line.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Response {
    let Some(token) = cart_token(&session).await else {
        return CartItemsTemplate {
            cart: CartView::empty(state.config().shop.currency),
        }
        .into_response();
    };

    let result = if form.quantity == 0 {
        state.api().remove_cart_item(&token, form.item_id).await
    } else {
        state
            .api()
            .update_cart_item(&token, form.item_id, form.quantity.min(MAX_LINE_QUANTITY))
            .await
    };
    cart_fragment(&state, &session, result).await
}

/// Remove a line (HTMX).
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    let Some(token) = cart_token(&session).await else {
        return CartItemsTemplate {
            cart: CartView::empty(state.config().shop.currency),
        }
        .into_response();
    };

    let result = state.api().remove_cart_item(&token, form.item_id).await;
    cart_fragment(&state, &session, result).await
}

/// Render the cart items fragment after a mutation.
async fn cart_fragment(
    state: &AppState,
    session: &Session,
    result: Result<Cart, BackendError>,
) -> Response {
    match result {
        Ok(cart) => with_trigger(
            CartItemsTemplate {
                cart: CartView::from(cart),
            },
            true,
            &Toast::success("Cart updated"),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Cart update failed");
            // Re-render what the backend currently has.
            let cart = load_cart(state, session)
                .await
                .ok()
                .flatten()
                .map_or_else(|| CartView::empty(state.config().shop.currency), CartView::from);
            with_trigger(CartItemsTemplate { cart }, false, &Toast::error(e.user_message()))
        }
    }
}

/// Get cart item count (HTMX fragment).
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let count = match load_cart(&state, &session).await {
        Ok(Some(cart)) => cart.totals().item_count,
        Ok(None) => 0,
        Err(e) => {
            tracing::debug!(error = %e, "Cart count unavailable");
            0
        }
    };
    CartCountTemplate { count }
}
