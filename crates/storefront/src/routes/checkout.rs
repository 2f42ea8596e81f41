//! Checkout through Flutterwave's hosted payment page.
//!
//! `POST /checkout/pay` remembers a [`PendingPayment`] in the session and
//! redirects to Flutterwave. Flutterwave redirects back to
//! `/checkout/callback`, which verifies a successful charge before telling
//! the backend and clearing the cart.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use kivu_core::Email;

use super::cart::{CartView, clear_cart_token, load_cart};
use crate::backend::PaymentConfirmation;
use crate::error::add_breadcrumb;
use crate::filters;
use crate::models::{Toast, session_keys};
use crate::payments::{
    PaymentCallback, PaymentCustomer, PaymentCustomizations, PaymentError, PaymentOutcome,
    PaymentRequest, PendingPayment, new_tx_ref,
};
use crate::state::AppState;
use crate::views::{Layout, PageContext};

/// Payment methods offered on the hosted page.
const PAYMENT_OPTIONS: &str = "card,mobilemoneyrwanda";

/// Checkout form data.
#[derive(Debug, Default, Deserialize)]
pub struct CheckoutForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl CheckoutForm {
    /// Phone for re-filling the form.
    #[must_use]
    pub fn phone_value(&self) -> &str {
        self.phone.as_deref().unwrap_or_default()
    }

    /// Validate into the customer shown on the hosted page.
    fn customer(&self) -> Result<PaymentCustomer, &'static str> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Please enter your name.");
        }
        let email = Email::parse(&self.email).map_err(|_| "Please enter a valid email address.")?;
        Ok(PaymentCustomer {
            email: email.into_inner(),
            phone_number: self
                .phone
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
            name: name.to_string(),
        })
    }
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub layout: Layout,
    pub cart: CartView,
    pub form: CheckoutForm,
}

/// Display the checkout summary and customer form.
#[instrument(skip(state, page))]
pub async fn show(State(state): State<AppState>, page: PageContext) -> Response {
    let cart = match load_cart(&state, page.session()).await {
        Ok(Some(cart)) if !cart.items.is_empty() => CartView::from(cart),
        Ok(_) => return Redirect::to("/cart").into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch cart for checkout");
            Toast::error("We couldn't load your cart. Please try again.")
                .push(page.session())
                .await;
            return Redirect::to("/cart").into_response();
        }
    };

    let form = page.customer().map_or_else(CheckoutForm::default, |customer| CheckoutForm {
        name: customer.name.clone(),
        email: customer.email.as_str().to_string(),
        phone: customer.phone.clone(),
    });

    CheckoutTemplate {
        layout: page.layout("Checkout").await,
        cart,
        form,
    }
    .into_response()
}

/// Start a hosted payment for the current cart.
#[instrument(skip(state, session, form))]
pub async fn pay(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CheckoutForm>,
) -> Response {
    let customer = match form.customer() {
        Ok(customer) => customer,
        Err(message) => {
            Toast::error(message).push(&session).await;
            return Redirect::to("/checkout").into_response();
        }
    };

    let cart = match load_cart(&state, &session).await {
        Ok(Some(cart)) if !cart.items.is_empty() => cart,
        Ok(_) => return Redirect::to("/cart").into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch cart for payment");
            Toast::error(e.user_message()).push(&session).await;
            return Redirect::to("/checkout").into_response();
        }
    };

    let total = cart.totals().total;
    let pending = PendingPayment {
        tx_ref: new_tx_ref(),
        amount: total.amount,
        currency: total.currency_code,
        cart_token: cart.token,
    };

    let site = state.site_config().await;
    let request = PaymentRequest {
        tx_ref: pending.tx_ref.clone(),
        amount: pending.amount,
        currency: pending.currency,
        redirect_url: state.config().absolute_url("/checkout/callback"),
        payment_options: PAYMENT_OPTIONS.to_string(),
        customer,
        customizations: PaymentCustomizations {
            title: site.site_name,
            description: format!("Order payment {}", pending.tx_ref),
            logo: Some(state.config().absolute_url("/static/images/logo.svg")),
        },
    };

    if let Err(e) = session.insert(session_keys::PENDING_PAYMENT, &pending).await {
        tracing::error!(error = %e, "Failed to store pending payment");
        Toast::error("We couldn't start your payment. Please try again.")
            .push(&session)
            .await;
        return Redirect::to("/checkout").into_response();
    }

    match state.payments().initiate(&request).await {
        Ok(link) => {
            add_breadcrumb(
                "checkout",
                "Redirected to Flutterwave",
                Some(&[("tx_ref", pending.tx_ref.as_str())]),
            );
            Redirect::to(link.as_str()).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, tx_ref = %pending.tx_ref, "Failed to initiate payment");
            Toast::error("The payment service is unavailable. Please try again shortly.")
                .push(&session)
                .await;
            Redirect::to("/checkout").into_response()
        }
    }
}

/// Verify a successful charge against the pending payment and report it.
async fn complete_payment(
    state: &AppState,
    session: &Session,
    tx_ref: &str,
    transaction_id: u64,
) -> Result<(), CompletionError> {
    let pending = session
        .get::<PendingPayment>(session_keys::PENDING_PAYMENT)
        .await
        .ok()
        .flatten()
        .ok_or(PaymentError::NoPendingPayment)?;
    if pending.tx_ref != tx_ref {
        return Err(PaymentError::Mismatch("tx_ref".to_string()).into());
    }

    let transaction = state.payments().verify(transaction_id).await?;
    transaction.check(&pending)?;

    let customer_token = session
        .get::<crate::models::CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
        .await
        .ok()
        .flatten()
        .map(|c| c.access_token);
    let confirmation = PaymentConfirmation {
        tx_ref: pending.tx_ref,
        transaction_id,
        cart_token: pending.cart_token,
        amount: transaction.amount,
        currency: pending.currency,
    };
    state
        .api()
        .confirm_payment(customer_token.as_deref(), &confirmation)
        .await?;

    forget_pending_payment(session).await;
    clear_cart_token(session).await;
    Ok(())
}

async fn forget_pending_payment(session: &Session) {
    if let Err(e) = session
        .remove::<PendingPayment>(session_keys::PENDING_PAYMENT)
        .await
    {
        tracing::warn!(error = %e, "Failed to clear pending payment");
    }
}

/// Why a successful redirect could not be completed.
#[derive(Debug, thiserror::Error)]
enum CompletionError {
    #[error(transparent)]
    Payment(#[from] PaymentError),
    #[error(transparent)]
    Backend(#[from] crate::backend::BackendError),
}

/// Flutterwave redirect target.
#[instrument(skip(state, session))]
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(callback): Query<PaymentCallback>,
) -> Response {
    match callback.outcome() {
        PaymentOutcome::Success {
            tx_ref,
            transaction_id,
        } => match complete_payment(&state, &session, &tx_ref, transaction_id).await {
            Ok(()) => {
                tracing::info!(%tx_ref, transaction_id, "Payment completed");
                Toast::success("Payment received. Thank you for your order!")
                    .push(&session)
                    .await;
                let next = if session
                    .get::<crate::models::CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
                    .await
                    .ok()
                    .flatten()
                    .is_some()
                {
                    "/account/orders"
                } else {
                    "/"
                };
                Redirect::to(next).into_response()
            }
            Err(e) => {
                let event_id = sentry::capture_error(&e);
                tracing::error!(
                    error = %e,
                    %tx_ref,
                    sentry_event_id = %event_id,
                    "Payment verification failed"
                );
                Toast::error(format!(
                    "We couldn't confirm your payment. If you were charged, contact us with reference {tx_ref}."
                ))
                .push(&session)
                .await;
                Redirect::to("/checkout").into_response()
            }
        },
        PaymentOutcome::Closed => {
            tracing::info!("Checkout closed by customer");
            forget_pending_payment(&session).await;
            Toast::info("Payment cancelled. Your cart is still here.")
                .push(&session)
                .await;
            Redirect::to("/cart").into_response()
        }
        PaymentOutcome::Failed(reason) => {
            tracing::warn!(%reason, "Payment failed");
            forget_pending_payment(&session).await;
            Toast::error("Payment failed. Please try again or use another method.")
                .push(&session)
                .await;
            Redirect::to("/checkout").into_response()
        }
    }
}
