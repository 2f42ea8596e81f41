use reqwest::Method;
use tracing::instrument;

use kivu_core::{ProductReturn, ReturnRequest};

use super::ApiClient;
use crate::backend::BackendError;

impl ApiClient {
    /// List the customer's return requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the customer is not signed in.
    #[instrument(skip(self, token))]
    pub async fn returns(&self, token: &str) -> Result<Vec<ProductReturn>, BackendError> {
        self.get("returns", Some(token)).await
    }

    /// Open a return request; the service assigns the RMA number.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects it.
    #[instrument(skip(self, token), fields(product_id = %request.product_id))]
    pub async fn create_return(
        &self,
        token: &str,
        request: &ReturnRequest,
    ) -> Result<ProductReturn, BackendError> {
        self.send_json(Method::POST, "returns", request, Some(token))
            .await
    }
}
