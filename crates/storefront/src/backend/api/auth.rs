//! Customer authentication and the contact form.

use reqwest::Method;
use tracing::instrument;

use super::ApiClient;
use crate::backend::{AuthSession, BackendError, ContactMessage, Credentials, Registration};

impl ApiClient {
    /// Exchange email and password for a customer token.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Unauthorized`] or [`BackendError::Envelope`]
    /// for bad credentials.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthSession, BackendError> {
        self.send_json(Method::POST, "auth/login", credentials, None)
            .await
    }

    /// Create an account and sign it in.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Validation`] for rejected fields.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> Result<AuthSession, BackendError> {
        self.send_json(Method::POST, "auth/register", registration, None)
            .await
    }

    /// Submit the contact form.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects it.
    #[instrument(skip(self, message), fields(email = %message.email))]
    pub async fn send_contact(&self, message: &ContactMessage) -> Result<(), BackendError> {
        self.acknowledge_json(Method::POST, "contact", message, None)
            .await
    }
}
