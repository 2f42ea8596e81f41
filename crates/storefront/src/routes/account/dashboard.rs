//! Account dashboard: summary counters, recent orders and notifications.
//!
//! Notification reads are optimistic. The id goes into the session's
//! locally-read set before the service is told, and stays there even if the
//! service call fails.

use std::convert::Infallible;
use std::time::Duration;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures_util::Stream;
use tower_sessions::Session;
use tracing::instrument;

use kivu_core::{Notification, NotificationFeed, NotificationId};

use super::{AccountTab, FragmentDiff, session_expired};
use crate::backend::{ApiClient, BackendError, DashboardSummary};
use crate::filters;
use crate::live::{PollSource, Poller, poll_events};
use crate::middleware::auth::RequireAuth;
use crate::models::{Toast, session_keys};
use crate::state::AppState;
use crate::views::{Layout, PageContext};

/// Dashboard refresh period.
pub const DASHBOARD_POLL: Duration = Duration::from_secs(30);

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/dashboard.html")]
pub struct DashboardTemplate {
    pub layout: Layout,
    pub tab: AccountTab,
    pub summary: DashboardSummary,
    pub feed: NotificationFeed,
}

/// The live part of the dashboard, pushed over SSE.
#[derive(Template)]
#[template(path = "account/partials/dashboard_live.html")]
pub struct DashboardLiveTemplate<'a> {
    pub summary: &'a DashboardSummary,
    pub feed: &'a NotificationFeed,
}

/// Notification list fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "account/partials/notifications.html")]
pub struct NotificationsTemplate {
    pub feed: NotificationFeed,
}

async fn locally_read(session: &Session) -> Vec<NotificationId> {
    session
        .get::<Vec<NotificationId>>(session_keys::READ_NOTIFICATIONS)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

async fn store_locally_read(session: &Session, feed: &NotificationFeed) {
    let ids: Vec<NotificationId> = feed.locally_read().collect();
    if let Err(e) = session.insert(session_keys::READ_NOTIFICATIONS, ids).await {
        tracing::warn!(error = %e, "Failed to store read notifications");
    }
}

/// Display the dashboard.
#[instrument(skip(state, customer, page))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    page: PageContext,
) -> Response {
    let token = customer.token();
    let (summary, notifications) = tokio::join!(
        state.api().dashboard_summary(token),
        state.api().notifications(token),
    );

    if matches!(summary, Err(BackendError::Unauthorized))
        || matches!(notifications, Err(BackendError::Unauthorized))
    {
        return session_expired(page.session(), "/account").await;
    }

    let summary = summary.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to fetch dashboard summary");
        DashboardSummary::default()
    });
    let notifications = match notifications {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch notifications");
            Toast::error("Some of your account details couldn't be loaded.")
                .push(page.session())
                .await;
            Vec::new()
        }
    };
    let feed = NotificationFeed::new(notifications, locally_read(page.session()).await);

    DashboardTemplate {
        layout: page.layout("My account").await,
        tab: AccountTab::Dashboard,
        summary,
        feed,
    }
    .into_response()
}

/// Polls the summary and notifications for one open dashboard.
pub struct DashboardSource {
    api: ApiClient,
    token: String,
    feed: NotificationFeed,
    diff: FragmentDiff,
}

impl DashboardSource {
    #[must_use]
    pub fn new(api: ApiClient, token: String, locally_read: Vec<NotificationId>) -> Self {
        Self {
            api,
            token,
            feed: NotificationFeed::new(Vec::new(), locally_read),
            diff: FragmentDiff::default(),
        }
    }

    /// Fold freshly fetched data into the snapshot and render it.
    fn render(&mut self, summary: &DashboardSummary, notifications: Vec<Notification>) -> Option<String> {
        self.feed.merge(notifications);
        match (DashboardLiveTemplate {
            summary,
            feed: &self.feed,
        })
        .render()
        {
            Ok(html) => self.diff.changed(html),
            Err(e) => {
                tracing::error!(error = %e, "Failed to render dashboard fragment");
                None
            }
        }
    }
}

impl PollSource for DashboardSource {
    type Item = String;

    async fn poll(&mut self) -> Option<String> {
        let (summary, notifications) = tokio::join!(
            self.api.dashboard_summary(&self.token),
            self.api.notifications(&self.token),
        );
        match (summary, notifications) {
            (Ok(summary), Ok(notifications)) => self.render(&summary, notifications),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "Dashboard poll failed");
                None
            }
        }
    }
}

/// Dashboard refresh stream.
#[instrument(skip(state, customer, session))]
pub async fn events(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    session: Session,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut source = DashboardSource::new(
        state.api().clone(),
        customer.access_token,
        locally_read(&session).await,
    );
    // Prime the snapshot with what the page was just rendered from.
    source.poll().await;

    let (handle, rx) = Poller::every(DASHBOARD_POLL).spawn(source);
    Sse::new(poll_events("dashboard", handle, rx)).keep_alive(KeepAlive::default())
}

/// Re-render the notification list after a read.
async fn notifications_fragment(
    state: &AppState,
    customer_token: &str,
    session: &Session,
    failure: Option<Toast>,
) -> Response {
    let response = match state.api().notifications(customer_token).await {
        Ok(items) => NotificationsTemplate {
            feed: NotificationFeed::new(items, locally_read(session).await),
        }
        .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to refresh notifications");
            (StatusCode::NO_CONTENT, [("hx-reswap", "none")]).into_response()
        }
    };
    match failure {
        Some(toast) => toast.attach(response),
        None => response,
    }
}

/// Mark one notification read (HTMX).
#[instrument(skip(state, customer, session))]
pub async fn mark_read(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    session: Session,
    Path(id): Path<NotificationId>,
) -> Response {
    let mut feed = NotificationFeed::new(Vec::new(), locally_read(&session).await);
    if feed.mark_read(id) {
        store_locally_read(&session, &feed).await;
    }

    let failure = match state.api().mark_notification_read(customer.token(), id).await {
        Ok(()) => None,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to sync notification read");
            Some(Toast::error(
                "We couldn't sync that with your account. It stays read here.",
            ))
        }
    };
    notifications_fragment(&state, customer.token(), &session, failure).await
}

/// Mark every notification read (HTMX).
#[instrument(skip(state, customer, session))]
pub async fn mark_all_read(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    session: Session,
) -> Response {
    let items = match state.api().notifications(customer.token()).await {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch notifications");
            return Toast::error(e.user_message())
                .attach((StatusCode::NO_CONTENT, [("hx-reswap", "none")]));
        }
    };

    let mut feed = NotificationFeed::new(items, locally_read(&session).await);
    let flipped = feed.mark_all_read();
    store_locally_read(&session, &feed).await;
    tracing::debug!(count = flipped.len(), "Marked notifications read");

    let response = NotificationsTemplate { feed };
    match state.api().mark_all_notifications_read(customer.token()).await {
        Ok(()) => response.into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to sync read-all");
            Toast::error("We couldn't sync that with your account. They stay read here.")
                .attach(response)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::header::COOKIE;
    use chrono::{DateTime, Utc};
    use tower::ServiceExt;
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::routes::tests::{body_text, get, post_form, signed_in_cookie, test_app_with_store};
    use crate::state::tests::test_state;

    fn note(id: i64, is_read: bool) -> Notification {
        Notification {
            id: NotificationId::new(id),
            title: format!("Order KV-{id:05} shipped"),
            message: "Your parcel left Dubai".to_string(),
            is_read,
            created_at: DateTime::<Utc>::default(),
        }
    }

    #[tokio::test]
    async fn test_source_emits_only_on_change() {
        let mut source = DashboardSource::new(
            test_state().api().clone(),
            "token".to_string(),
            vec![NotificationId::new(2)],
        );
        let summary = DashboardSummary::default();

        let first = source.render(&summary, vec![note(1, false), note(2, false)]);
        assert!(first.is_some());
        assert!(source.render(&summary, vec![note(1, false), note(2, false)]).is_none());

        // A read made on this page survives the poll reporting it unread.
        assert_eq!(source.feed.unread_count(), 1);

        let third = source.render(&summary, vec![note(3, false), note(1, false), note(2, false)]);
        assert!(third.unwrap().contains("Order KV-00003 shipped"));
    }

    #[tokio::test]
    async fn test_dashboard_degrades_when_services_are_down() {
        let store = MemoryStore::default();
        let cookie = signed_in_cookie(&store).await;
        let mut request = get("/account");
        request.headers_mut().insert(COOKIE, cookie.parse().unwrap());

        let response = test_app_with_store(store).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("sse-connect=\"/account/events\""));
        assert!(body.contains("couldn"));
    }

    #[tokio::test]
    async fn test_mark_read_is_kept_locally_when_sync_fails() {
        let store = MemoryStore::default();
        let cookie = signed_in_cookie(&store).await;
        let app = test_app_with_store(store);

        for _ in 0..2 {
            let mut request = post_form("/account/notifications/5/read", "");
            request.headers_mut().insert(COOKIE, cookie.parse().unwrap());
            let response = app.clone().oneshot(request).await.unwrap();
            let trigger = response.headers()["hx-trigger"].to_str().unwrap().to_string();
            assert!(trigger.contains("stays read"));
        }
    }
}
