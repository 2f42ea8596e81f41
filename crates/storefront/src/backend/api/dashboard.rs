//! Account dashboard endpoints.

use reqwest::Method;
use tracing::instrument;

use kivu_core::{Notification, NotificationId, Order, OrderId};

use super::ApiClient;
use crate::backend::{BackendError, DashboardSummary};

impl ApiClient {
    /// Fetch the dashboard summary counters and recent orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the customer is not signed in.
    #[instrument(skip(self, token))]
    pub async fn dashboard_summary(&self, token: &str) -> Result<DashboardSummary, BackendError> {
        self.get("dashboard/summary", Some(token)).await
    }

    /// Fetch the customer's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the customer is not signed in.
    #[instrument(skip(self, token))]
    pub async fn notifications(&self, token: &str) -> Result<Vec<Notification>, BackendError> {
        self.get("dashboard/notifications", Some(token)).await
    }

    /// Mark one notification read.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects it.
    #[instrument(skip(self, token), fields(notification_id = %id))]
    pub async fn mark_notification_read(
        &self,
        token: &str,
        id: NotificationId,
    ) -> Result<(), BackendError> {
        self.acknowledge(
            Method::POST,
            &format!("dashboard/notifications/{id}/read"),
            Some(token),
        )
        .await
    }

    /// Mark every notification read.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects it.
    #[instrument(skip(self, token))]
    pub async fn mark_all_notifications_read(&self, token: &str) -> Result<(), BackendError> {
        self.acknowledge(
            Method::POST,
            "dashboard/notifications/read-all",
            Some(token),
        )
        .await
    }

    /// Fetch the customer's order history.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the customer is not signed in.
    #[instrument(skip(self, token))]
    pub async fn orders(&self, token: &str) -> Result<Vec<Order>, BackendError> {
        self.get("orders", Some(token)).await
    }

    /// Fetch one order.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] for someone else's or unknown order.
    #[instrument(skip(self, token), fields(order_id = %id))]
    pub async fn order(&self, token: &str, id: OrderId) -> Result<Order, BackendError> {
        self.get(&format!("orders/{id}"), Some(token)).await
    }
}
