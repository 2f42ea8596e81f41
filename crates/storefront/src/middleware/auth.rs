//! Authentication extractors over the session.
//!
//! The backend issues the customer token; the storefront only remembers it.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentCustomer, session_keys};

/// Extractor that requires a signed-in customer.
///
/// Page requests are redirected to the login page (with a `next` parameter);
/// HTMX and SSE requests get a bare 401.
///
/// ```rust,ignore
/// async fn dashboard(RequireAuth(customer): RequireAuth) -> impl IntoResponse {
///     format!("Welcome back, {}", customer.first_name())
/// }
/// ```
pub struct RequireAuth(pub CurrentCustomer);

/// Rejection for [`RequireAuth`].
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to the login page, returning to `next` afterwards.
    RedirectToLogin { next: String },
    /// Unauthorized response (fragments, event streams).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin { next } => {
                let location = format!("/auth/login?next={}", urlencoding::encode(&next));
                Redirect::to(&location).into_response()
            }
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

fn wants_page(parts: &Parts) -> bool {
    let is_htmx = parts.headers.contains_key("hx-request");
    let is_stream = parts
        .headers
        .get(axum::http::header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/event-stream"));
    parts.method == axum::http::Method::GET && !is_htmx && !is_stream
}

async fn current_customer(parts: &Parts) -> Option<CurrentCustomer> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
        .await
        .ok()
        .flatten()
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match current_customer(parts).await {
            Some(customer) => Ok(Self(customer)),
            None if wants_page(parts) => Err(AuthRejection::RedirectToLogin {
                next: parts
                    .uri
                    .path_and_query()
                    .map_or_else(|| "/account".to_string(), ToString::to_string),
            }),
            None => Err(AuthRejection::Unauthorized),
        }
    }
}

/// Extractor that optionally gets the current customer.
pub struct OptionalAuth(pub Option<CurrentCustomer>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_customer(parts).await))
    }
}

/// Store the signed-in customer, rotating the session id first.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_customer(
    session: &Session,
    customer: &CurrentCustomer,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session
        .insert(session_keys::CURRENT_CUSTOMER, customer)
        .await
}

/// Forget the signed-in customer (logout). The cart token survives.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_customer(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
        .await?;
    session
        .remove::<Vec<kivu_core::NotificationId>>(session_keys::READ_NOTIFICATIONS)
        .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts(method: &str, headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().method(method).uri("/account/orders?status=shipped");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_page_request_redirects_with_next() {
        let mut parts = parts("GET", &[]);
        let rejection = RequireAuth::from_request_parts(&mut parts, &()).await.err().unwrap();
        match rejection {
            AuthRejection::RedirectToLogin { next } => {
                assert_eq!(next, "/account/orders?status=shipped");
            }
            AuthRejection::Unauthorized => panic!("expected redirect"),
        }
    }

    #[tokio::test]
    async fn test_htmx_and_stream_requests_get_401() {
        for headers in [
            vec![("hx-request", "true")],
            vec![("accept", "text/event-stream")],
        ] {
            let mut parts = parts("GET", &headers);
            let rejection = RequireAuth::from_request_parts(&mut parts, &()).await.err().unwrap();
            assert!(matches!(rejection, AuthRejection::Unauthorized));
        }
        let mut parts = parts("POST", &[]);
        assert!(matches!(
            RequireAuth::from_request_parts(&mut parts, &()).await.err().unwrap(),
            AuthRejection::Unauthorized
        ));
    }

    #[test]
    fn test_redirect_location_is_encoded() {
        let response = AuthRejection::RedirectToLogin {
            next: "/account/orders?status=shipped".to_string(),
        }
        .into_response();
        assert_eq!(
            response.headers().get("location").unwrap(),
            "/auth/login?next=%2Faccount%2Forders%3Fstatus%3Dshipped"
        );
    }
}
