//! Catalog product as served by the product service.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::{CurrencyCode, Price};

/// A sellable product (phone, laptop, brake pad, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    pub price: Decimal,
    /// Pre-discount price; only meaningful when higher than `price`.
    #[serde(default, alias = "originalPrice")]
    pub original_price: Option<Decimal>,
    #[serde(default)]
    pub currency: CurrencyCode,
    /// Average rating, 0 to 5.
    #[serde(default)]
    pub rating: f32,
    /// Number of reviews behind `rating`.
    #[serde(default)]
    pub reviews: u32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_in_stock", alias = "inStock")]
    pub in_stock: bool,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
}

const fn default_in_stock() -> bool {
    true
}

/// Image shown for products the service has no picture for.
pub const PLACEHOLDER_IMAGE: &str = "/static/images/placeholder.svg";

impl Product {
    /// Current selling price.
    #[must_use]
    pub const fn selling_price(&self) -> Price {
        Price::new(self.price, self.currency)
    }

    /// Original price, only when it is actually higher than the selling price.
    #[must_use]
    pub fn compare_at_price(&self) -> Option<Price> {
        self.original_price
            .filter(|original| *original > self.price)
            .map(|original| Price::new(original, self.currency))
    }

    /// Whole-percent discount, e.g. `Some(25)` for 100 -> 75.
    #[must_use]
    pub fn discount_percent(&self) -> Option<u32> {
        let original = self.compare_at_price()?.amount;
        if original.is_zero() {
            return None;
        }
        let percent = ((original - self.price) / original * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        percent.to_u32().filter(|p| *p > 0)
    }

    /// Product image, or the placeholder.
    #[must_use]
    pub fn image_url(&self) -> &str {
        self.image.as_deref().unwrap_or(PLACEHOLDER_IMAGE)
    }

    /// Rating rounded to the nearest whole star, clamped to 0..=5.
    #[must_use]
    pub fn full_stars(&self) -> u8 {
        // Clamped to 0..=5 before the cast.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let stars = self.rating.clamp(0.0, 5.0).round() as u8;
        stars
    }
}
