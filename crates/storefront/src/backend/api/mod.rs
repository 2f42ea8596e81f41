//! REST client for the dashboard, user, returns, product and cart service.
//!
//! Methods are grouped by service area in the submodules; this module holds
//! the shared request plumbing and envelope handling.

mod auth;
mod cart;
mod dashboard;
mod products;
mod profile;
mod returns;

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::{BackendError, Envelope};
use crate::config::BackendConfig;

/// Longest slice of an error body kept for logs and error messages.
const ERROR_BODY_PREVIEW: usize = 200;

/// Client for the storefront REST service.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new REST client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("kivu-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // `Url::join` drops the last segment unless the base ends in a slash.
        let mut base_url = config.api_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            inner: Arc::new(ApiClientInner { client, base_url }),
        })
    }

    fn url(&self, path: &str) -> Result<Url, BackendError> {
        self.inner
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| BackendError::Api {
                status: 0,
                message: format!("invalid path {path}: {e}"),
            })
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
    ) -> Result<RequestBuilder, BackendError> {
        let builder = self.inner.client.request(method, self.url(path)?);
        Ok(match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<T, BackendError> {
        let request = self.request(Method::GET, path, token)?;
        Self::send::<T>(path, request).await?.into_data()
    }

    async fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T, BackendError> {
        let request = self.request(Method::GET, path, None)?.query(query);
        Self::send::<T>(path, request).await?.into_data()
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<T, BackendError> {
        let request = self.request(method, path, token)?.json(body);
        Self::send::<T>(path, request).await?.into_data()
    }

    /// Send a request whose response payload is irrelevant.
    async fn acknowledge(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
    ) -> Result<(), BackendError> {
        let request = self.request(method, path, token)?;
        Self::send::<serde_json::Value>(path, request)
            .await?
            .into_result()
            .map(|_| ())
    }

    /// Send a JSON body whose response payload is irrelevant.
    async fn acknowledge_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<(), BackendError> {
        let request = self.request(method, path, token)?.json(body);
        Self::send::<serde_json::Value>(path, request)
            .await?
            .into_result()
            .map(|_| ())
    }

    async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<T, BackendError> {
        let request = self.request(Method::DELETE, path, token)?;
        Self::send::<T>(path, request).await?.into_data()
    }

    /// Execute a request and decode the envelope.
    async fn send<T: DeserializeOwned>(
        path: &str,
        request: RequestBuilder,
    ) -> Result<Envelope<T>, BackendError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(BackendError::Unauthorized);
        }

        let body = response.text().await?;
        decode_envelope(path, status, &body)
    }
}

/// Map a status code and body onto an envelope or an error.
fn decode_envelope<T: DeserializeOwned>(
    path: &str,
    status: StatusCode,
    body: &str,
) -> Result<Envelope<T>, BackendError> {
    if status == StatusCode::NOT_FOUND {
        return Err(BackendError::NotFound(path.to_string()));
    }

    match serde_json::from_str::<Envelope<T>>(body) {
        Ok(envelope) if status.is_success() || !envelope.success => Ok(envelope),
        Ok(envelope) => Err(BackendError::Api {
            status: status.as_u16(),
            message: envelope
                .message
                .unwrap_or_else(|| preview(body)),
        }),
        Err(e) if status.is_success() => {
            tracing::error!(
                error = %e,
                path,
                body = %preview(body),
                "Failed to parse backend response"
            );
            Err(BackendError::Parse(e))
        }
        Err(_) => {
            tracing::error!(
                status = %status,
                path,
                body = %preview(body),
                "Backend returned non-success status"
            );
            Err(BackendError::Api {
                status: status.as_u16(),
                message: preview(body),
            })
        }
    }
}

fn preview(body: &str) -> String {
    body.chars().take(ERROR_BODY_PREVIEW).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::tests::test_config;

    #[test]
    fn test_url_join_keeps_base_path() {
        let client = ApiClient::new(&test_config().backend).unwrap();
        assert_eq!(
            client.url("/dashboard/summary").unwrap().as_str(),
            "http://127.0.0.1:9/api/dashboard/summary"
        );

        let mut config = test_config().backend;
        config.api_url = Url::parse("https://api.kivu.rw/v1").unwrap();
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(
            client.url("orders/7").unwrap().as_str(),
            "https://api.kivu.rw/v1/orders/7"
        );
    }

    #[test]
    fn test_decode_not_found() {
        let result = decode_envelope::<u32>("/orders/9", StatusCode::NOT_FOUND, "");
        assert!(matches!(result, Err(BackendError::NotFound(path)) if path == "/orders/9"));
    }

    #[test]
    fn test_decode_validation_on_unprocessable() {
        let body = r#"{"success":false,"message":"Invalid","errors":{"email":["Enter a valid email"]}}"#;
        let envelope =
            decode_envelope::<serde_json::Value>("/user/profile", StatusCode::UNPROCESSABLE_ENTITY, body)
                .unwrap();
        assert!(matches!(
            envelope.into_result(),
            Err(BackendError::Validation(_))
        ));
    }

    #[test]
    fn test_decode_plain_text_error() {
        let result = decode_envelope::<u32>("/cart", StatusCode::BAD_GATEWAY, "upstream down");
        assert!(matches!(
            result,
            Err(BackendError::Api { status: 502, message }) if message == "upstream down"
        ));
    }

    #[test]
    fn test_decode_garbage_on_success() {
        let result = decode_envelope::<u32>("/products/featured", StatusCode::OK, "<html>");
        assert!(matches!(result, Err(BackendError::Parse(_))));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_http_error() {
        let client = ApiClient::new(&test_config().backend).unwrap();
        let result = client.featured_products().await;
        assert!(matches!(result, Err(BackendError::Http(_))));
    }
}
