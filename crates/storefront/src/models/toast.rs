//! Transient notifications queued in the session and shown by the next page.

use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::session_keys;

/// Oldest toasts are dropped beyond this.
const MAX_QUEUED: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl ToastLevel {
    /// CSS modifier class.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "toast--success",
            Self::Info => "toast--info",
            Self::Warning => "toast--warning",
            Self::Error => "toast--error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    #[must_use]
    pub fn new(level: ToastLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(ToastLevel::Success, message)
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ToastLevel::Error, message)
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(ToastLevel::Info, message)
    }

    /// Queue this toast. A session failure is logged, not propagated.
    pub async fn push(self, session: &Session) {
        let mut queue: Vec<Self> = session
            .get(session_keys::TOASTS)
            .await
            .ok()
            .flatten()
            .unwrap_or_default();
        queue.push(self);
        if queue.len() > MAX_QUEUED {
            queue.drain(..queue.len() - MAX_QUEUED);
        }
        if let Err(e) = session.insert(session_keys::TOASTS, queue).await {
            tracing::warn!(error = %e, "Failed to queue toast");
        }
    }

    /// Attach this toast to an HTMX response as an `HX-Trigger` event.
    ///
    /// Fragments never render the page layout, so the toast rides along as a
    /// `showToast` event instead of waiting in the session.
    pub fn attach(&self, response: impl IntoResponse) -> Response {
        let mut response = response.into_response();
        let payload = serde_json::json!({ "showToast": self }).to_string();
        if let Ok(value) = HeaderValue::from_str(&payload) {
            response.headers_mut().insert("hx-trigger", value);
        }
        response
    }

    /// Drain the queue.
    pub async fn take_all(session: &Session) -> Vec<Self> {
        session
            .remove::<Vec<Self>>(session_keys::TOASTS)
            .await
            .ok()
            .flatten()
            .unwrap_or_default()
    }
}
