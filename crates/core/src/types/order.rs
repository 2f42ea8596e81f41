//! Customer orders and the order-history status filter.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::OrderId;
use super::price::{CurrencyCode, Price};
use super::status::OrderStatus;

/// An order as listed in the customer's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    #[serde(default)]
    pub currency: CurrencyCode,
    pub items_count: u32,
    #[serde(default)]
    pub tracking_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Order total as a price.
    #[must_use]
    pub const fn total(&self) -> Price {
        Price::new(self.total_amount, self.currency)
    }
}

/// Error for an unrecognised `status` filter value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status filter: {0}")]
pub struct OrderFilterError(pub String);

/// Status filter for the order history page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderFilter {
    /// Show every order.
    #[default]
    All,
    /// Show only orders whose status equals this one.
    Status(OrderStatus),
}

impl OrderFilter {
    /// Parse the `?status=` query value. Missing or empty means `All`.
    ///
    /// # Errors
    ///
    /// Returns [`OrderFilterError`] if the value is neither `all` nor a known status.
    pub fn parse(value: Option<&str>) -> Result<Self, OrderFilterError> {
        match value.map(str::trim) {
            None | Some("" | "all") => Ok(Self::All),
            Some(other) => other
                .parse::<OrderStatus>()
                .map(Self::Status)
                .map_err(|_| OrderFilterError(other.to_string())),
        }
    }

    /// Whether an order passes the filter.
    #[must_use]
    pub fn matches(self, order: &Order) -> bool {
        match self {
            Self::All => true,
            Self::Status(status) => order.status == status,
        }
    }

    /// Apply the filter, preserving order.
    #[must_use]
    pub fn apply(self, orders: &[Order]) -> Vec<Order> {
        orders
            .iter()
            .filter(|order| self.matches(order))
            .cloned()
            .collect()
    }

    /// Query-string value for this filter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Status(status) => status.as_str(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order(id: i64, status: OrderStatus) -> Order {
        Order {
            id: OrderId::new(id),
            order_number: format!("KV-{id:05}"),
            status,
            total_amount: Decimal::from(10_000 * id),
            currency: CurrencyCode::RWF,
            items_count: 1,
            tracking_number: None,
            created_at: Utc::now(),
        }
    }

    fn history() -> Vec<Order> {
        vec![
            order(1, OrderStatus::Delivered),
            order(2, OrderStatus::Pending),
            order(3, OrderStatus::Shipped),
            order(4, OrderStatus::Delivered),
            order(5, OrderStatus::Cancelled),
        ]
    }

    #[test]
    fn test_all_returns_full_list() {
        let orders = history();
        assert_eq!(OrderFilter::All.apply(&orders), orders);
        assert_eq!(OrderFilter::parse(None).unwrap(), OrderFilter::All);
        assert_eq!(OrderFilter::parse(Some("all")).unwrap(), OrderFilter::All);
        assert_eq!(OrderFilter::parse(Some("")).unwrap(), OrderFilter::All);
    }

    #[test]
    fn test_status_filter_returns_exact_matches() {
        let orders = history();
        for status in OrderStatus::ALL {
            let filtered = OrderFilter::Status(status).apply(&orders);
            assert!(filtered.iter().all(|o| o.status == status));
            let expected = orders.iter().filter(|o| o.status == status).count();
            assert_eq!(filtered.len(), expected);
        }
        let delivered = OrderFilter::parse(Some("delivered")).unwrap().apply(&orders);
        let ids: Vec<i64> = delivered.iter().map(|o| o.id.as_i64()).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn test_unknown_filter_is_rejected() {
        assert_eq!(
            OrderFilter::parse(Some("lost")),
            Err(OrderFilterError("lost".to_string()))
        );
    }
}
