//! Domain types for Kivu Imports.
//!
//! Every entity here is owned by the backend services; the storefront only
//! reads them and computes derived values (totals, discounts, filters).

pub mod cart;
pub mod email;
pub mod id;
pub mod notification;
pub mod order;
pub mod price;
pub mod product;
pub mod returns;
pub mod status;
pub mod user;

pub use cart::{CartItem, CartTotals, SHIPPING_FLAT, TAX_RATE};
pub use email::{Email, EmailError};
pub use id::*;
pub use notification::{Notification, NotificationFeed};
pub use order::{Order, OrderFilter, OrderFilterError};
pub use price::{CurrencyCode, Price};
pub use product::Product;
pub use returns::{ProductReturn, ReturnRequest, ReturnRequestError};
pub use status::*;
pub use user::User;
