//! Types the storefront keeps in the session.

pub mod session;
pub mod toast;

pub use session::{CurrentCustomer, keys as session_keys};
pub use toast::{Toast, ToastLevel};
