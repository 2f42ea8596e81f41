use reqwest::Method;
use tracing::instrument;

use kivu_core::User;

use super::ApiClient;
use crate::backend::{BackendError, ProfileUpdate};

impl ApiClient {
    /// Fetch the signed-in customer's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the customer is not signed in.
    #[instrument(skip(self, token))]
    pub async fn profile(&self, token: &str) -> Result<User, BackendError> {
        self.get("user/profile", Some(token)).await
    }

    /// Update the profile.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Validation`] with per-field messages when the
    /// service rejects the input.
    #[instrument(skip(self, token, update))]
    pub async fn update_profile(
        &self,
        token: &str,
        update: &ProfileUpdate,
    ) -> Result<User, BackendError> {
        self.send_json(Method::PUT, "user/profile", update, Some(token))
            .await
    }
}
