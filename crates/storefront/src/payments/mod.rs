//! Hosted payments through Flutterwave.
//!
//! Checkout flow:
//!
//! 1. `POST /checkout/pay` builds a [`PaymentRequest`] and stores a
//!    [`PendingPayment`] in the session
//! 2. Flutterwave returns a hosted checkout link; the customer is redirected
//! 3. Flutterwave redirects back to `/checkout/callback` with
//!    `status`, `tx_ref` and `transaction_id`
//! 4. The callback maps the status onto a [`PaymentOutcome`]; a success is
//!    only trusted after [`FlutterwaveClient::verify`] agrees on reference,
//!    amount and currency

mod flutterwave;

pub use flutterwave::{
    FlutterwaveClient, PaymentCallback, PaymentCustomer, PaymentCustomizations, PaymentOutcome,
    PaymentRequest, PendingPayment, VerifiedTransaction, new_tx_ref,
};

use thiserror::Error;

/// Errors that can occur when talking to Flutterwave.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Flutterwave answered with `status: "error"` or a non-success code.
    #[error("Flutterwave error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The verified transaction does not match what we asked the customer to pay.
    #[error("Verification mismatch: {0}")]
    Mismatch(String),

    /// Callback arrived without a pending payment in the session.
    #[error("No payment in progress")]
    NoPendingPayment,
}
