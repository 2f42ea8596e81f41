//! Cart and payment confirmation endpoints.
//!
//! Carts are anonymous and addressed by token; the storefront keeps the token
//! in the session.

use reqwest::Method;
use tracing::instrument;

use kivu_core::{CartItemId, ProductId};

use super::ApiClient;
use crate::backend::{AddCartItem, BackendError, Cart, CartQuantity, PaymentConfirmation};

impl ApiClient {
    /// Fetch a cart by token.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] once the cart has expired.
    #[instrument(skip(self, token))]
    pub async fn cart(&self, token: &str) -> Result<Cart, BackendError> {
        self.get(&format!("cart/{token}"), None).await
    }

    /// Create an empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn create_cart(&self) -> Result<Cart, BackendError> {
        self.send_json(Method::POST, "cart", &serde_json::json!({}), None)
            .await
    }

    /// Add a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the product is unavailable.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn add_cart_item(
        &self,
        token: &str,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Cart, BackendError> {
        let body = AddCartItem {
            product_id,
            quantity,
        };
        self.send_json(Method::POST, &format!("cart/{token}/items"), &body, None)
            .await
    }

    /// Change a line's quantity.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(item_id = %item_id))]
    pub async fn update_cart_item(
        &self,
        token: &str,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<Cart, BackendError> {
        self.send_json(
            Method::PUT,
            &format!("cart/{token}/items/{item_id}"),
            &CartQuantity { quantity },
            None,
        )
        .await
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(item_id = %item_id))]
    pub async fn remove_cart_item(
        &self,
        token: &str,
        item_id: CartItemId,
    ) -> Result<Cart, BackendError> {
        self.delete(&format!("cart/{token}/items/{item_id}"), None)
            .await
    }

    /// Report a verified payment so the backend can turn the cart into an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, customer_token, confirmation), fields(tx_ref = %confirmation.tx_ref))]
    pub async fn confirm_payment(
        &self,
        customer_token: Option<&str>,
        confirmation: &PaymentConfirmation,
    ) -> Result<(), BackendError> {
        self.acknowledge_json(
            Method::POST,
            "payments/confirm",
            confirmation,
            customer_token,
        )
        .await
    }
}
