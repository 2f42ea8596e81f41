//! Content Security Policy with a per-request nonce.
//!
//! Each request gets a cryptographically random nonce. Templates put it on
//! inline `<script nonce="...">` tags and the policy header allows exactly
//! that nonce. Checkout posts redirect to Flutterwave's hosted page, so the
//! policy lists it as a form action.

use axum::{
    extract::{FromRequestParts, Request},
    http::{HeaderValue, header::CONTENT_SECURITY_POLICY, request::Parts},
    middleware::Next,
    response::Response,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use rand::RngCore;

/// Flutterwave hosted checkout origin.
const FLUTTERWAVE_CHECKOUT: &str = "https://checkout.flutterwave.com";

/// A CSP nonce value for inline scripts (128-bit, base64-encoded).
#[derive(Clone, Debug)]
pub struct CspNonce(pub String);

impl CspNonce {
    /// Generate a new random nonce.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        rand::rng().fill_bytes(&mut bytes);
        Self(STANDARD.encode(bytes))
    }

    /// Get the nonce value for use in templates.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

/// Build the policy for one response.
///
/// Product images come from the backend's CDN, so `img-src` allows any
/// HTTPS origin; everything else is same-origin.
#[must_use]
pub fn content_security_policy(nonce: &CspNonce) -> String {
    format!(
        "default-src 'none'; \
         script-src 'self' 'nonce-{nonce}'; \
         style-src 'self'; \
         font-src 'self'; \
         img-src 'self' https: data:; \
         connect-src 'self'; \
         manifest-src 'self'; \
         frame-src 'none'; \
         object-src 'none'; \
         base-uri 'self'; \
         form-action 'self' {FLUTTERWAVE_CHECKOUT}; \
         frame-ancestors 'none'; \
         upgrade-insecure-requests",
        nonce = nonce.value()
    )
}

/// Middleware that generates the nonce, stores it in request extensions and
/// sets the matching `Content-Security-Policy` header on the response.
pub async fn csp_middleware(mut request: Request, next: Next) -> Response {
    let nonce = CspNonce::generate();
    let policy = content_security_policy(&nonce);
    request.extensions_mut().insert(nonce);

    let mut response = next.run(request).await;
    match HeaderValue::from_str(&policy) {
        Ok(value) => {
            response.headers_mut().insert(CONTENT_SECURITY_POLICY, value);
        }
        Err(e) => tracing::error!(error = %e, "Invalid CSP header value"),
    }
    response
}

/// Extractor to get the CSP nonce from request extensions.
impl<S> FromRequestParts<S> for CspNonce
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Self>().cloned().unwrap_or_else(|| {
            tracing::warn!(
                "CSP nonce not found in request extensions - middleware may be misconfigured"
            );
            Self(String::new())
        }))
    }
}
