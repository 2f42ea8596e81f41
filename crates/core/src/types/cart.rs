//! Cart lines and cart totals.
//!
//! The cart itself is persisted by the backend; the storefront recomputes the
//! totals on every render so the summary never depends on backend arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::CartItemId;
use super::price::{CurrencyCode, Price};
use super::product::Product;

/// Flat shipping fee added to every cart.
pub const SHIPPING_FLAT: Decimal = Decimal::from_parts(35, 0, 0, false, 0);

/// Tax rate applied to the subtotal (5%).
pub const TAX_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// One line of a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    /// Snapshot of the product at the time it was added.
    pub product: Product,
    pub quantity: u32,
    /// Unit price.
    pub price: Decimal,
    /// Line total as computed by the backend (`price * quantity` less any line discount).
    pub total_price: Decimal,
}

impl CartItem {
    /// Unit price in the product's currency.
    #[must_use]
    pub const fn unit_price(&self) -> Price {
        Price::new(self.price, self.product.currency)
    }

    /// Line total in the product's currency.
    #[must_use]
    pub const fn line_total(&self) -> Price {
        Price::new(self.total_price, self.product.currency)
    }
}

/// Summary shown in the cart and checkout sidebars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    pub subtotal: Price,
    pub shipping: Price,
    pub tax: Price,
    pub total: Price,
    pub item_count: u32,
}

impl CartTotals {
    /// Compute totals: `sum(total_price) + SHIPPING_FLAT + TAX_RATE * subtotal`.
    ///
    /// Shipping applies to every cart, including an empty one. Tax is rounded
    /// to the currency's minor units before it is added.
    #[must_use]
    pub fn compute(items: &[CartItem], currency: CurrencyCode) -> Self {
        let subtotal: Decimal = items.iter().map(|item| item.total_price).sum();
        let tax = Price::new(subtotal * TAX_RATE, currency).rounded();
        let shipping = Price::new(SHIPPING_FLAT, currency);
        let total = Price::new(subtotal + shipping.amount + tax.amount, currency);

        Self {
            subtotal: Price::new(subtotal, currency),
            shipping,
            tax,
            total,
            item_count: items.iter().map(|item| item.quantity).sum(),
        }
    }

    /// Whether there is anything to check out.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.item_count == 0
    }
}
