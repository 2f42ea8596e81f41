//! Order history with a status filter, live refresh and order detail.

use std::convert::Infallible;
use std::time::Duration;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures_util::Stream;
use serde::Deserialize;
use tracing::instrument;

use kivu_core::{Order, OrderFilter, OrderId, OrderStatus};

use super::{AccountTab, FragmentDiff, session_expired};
use crate::backend::{ApiClient, BackendError};
use crate::error::AppError;
use crate::filters;
use crate::live::{PollSource, Poller, poll_events};
use crate::middleware::auth::RequireAuth;
use crate::models::Toast;
use crate::state::AppState;
use crate::views::{Layout, PageContext};

/// Order history refresh period.
pub const ORDERS_POLL: Duration = Duration::from_secs(60);

/// `?status=` query.
#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    pub status: Option<String>,
}

impl OrdersQuery {
    fn filter(&self) -> Result<OrderFilter, AppError> {
        OrderFilter::parse(self.status.as_deref()).map_err(|e| AppError::BadRequest(e.to_string()))
    }
}

/// A filter tab on the history page.
#[derive(Debug, Clone, Copy)]
pub struct FilterTab {
    pub filter: OrderFilter,
    pub label: &'static str,
}

fn filter_tabs() -> Vec<FilterTab> {
    std::iter::once(FilterTab {
        filter: OrderFilter::All,
        label: "All",
    })
    .chain(OrderStatus::ALL.into_iter().map(|status| FilterTab {
        filter: OrderFilter::Status(status),
        label: status.label(),
    }))
    .collect()
}

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub layout: Layout,
    pub tab: AccountTab,
    pub tabs: Vec<FilterTab>,
    pub filter: OrderFilter,
    pub orders: Vec<Order>,
}

/// Order rows, pushed over SSE.
#[derive(Template)]
#[template(path = "account/partials/order_list.html")]
pub struct OrderListTemplate<'a> {
    pub orders: &'a [Order],
}

/// Order detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/order.html")]
pub struct OrderTemplate {
    pub layout: Layout,
    pub tab: AccountTab,
    pub order: Order,
}

/// Display the order history. An unknown status is a 400.
#[instrument(skip(state, customer, page))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    page: PageContext,
    Query(query): Query<OrdersQuery>,
) -> Result<Response, AppError> {
    let filter = query.filter()?;

    let orders = match state.api().orders(customer.token()).await {
        Ok(orders) => filter.apply(&orders),
        Err(BackendError::Unauthorized) => {
            return Ok(session_expired(page.session(), "/account/orders").await);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch orders");
            Toast::error("We couldn't load your orders. Please refresh in a moment.")
                .push(page.session())
                .await;
            Vec::new()
        }
    };

    Ok(OrdersTemplate {
        layout: page.layout("My orders").await,
        tab: AccountTab::Orders,
        tabs: filter_tabs(),
        filter,
        orders,
    }
    .into_response())
}

/// Polls the order history for one open page.
pub struct OrdersSource {
    api: ApiClient,
    token: String,
    filter: OrderFilter,
    diff: FragmentDiff,
}

impl OrdersSource {
    #[must_use]
    pub fn new(api: ApiClient, token: String, filter: OrderFilter) -> Self {
        Self {
            api,
            token,
            filter,
            diff: FragmentDiff::default(),
        }
    }

    fn render(&mut self, orders: &[Order]) -> Option<String> {
        let visible = self.filter.apply(orders);
        match (OrderListTemplate { orders: &visible }).render() {
            Ok(html) => self.diff.changed(html),
            Err(e) => {
                tracing::error!(error = %e, "Failed to render order list");
                None
            }
        }
    }
}

impl PollSource for OrdersSource {
    type Item = String;

    async fn poll(&mut self) -> Option<String> {
        match self.api.orders(&self.token).await {
            Ok(orders) => self.render(&orders),
            Err(e) => {
                tracing::warn!(error = %e, "Order poll failed");
                None
            }
        }
    }
}

/// Order history refresh stream, honouring the page's filter.
#[instrument(skip(state, customer))]
pub async fn events(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    Query(query): Query<OrdersQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let filter = query.filter()?;
    let mut source = OrdersSource::new(state.api().clone(), customer.access_token, filter);
    // Prime the snapshot with what the page was just rendered from.
    source.poll().await;

    let (handle, rx) = Poller::every(ORDERS_POLL).spawn(source);
    Ok(Sse::new(poll_events("orders", handle, rx)).keep_alive(KeepAlive::default()))
}

/// Display one order.
#[instrument(skip(state, customer, page))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    page: PageContext,
    Path(id): Path<OrderId>,
) -> Result<Response, AppError> {
    match state.api().order(customer.token(), id).await {
        Ok(order) => Ok(OrderTemplate {
            layout: page.layout(format!("Order {}", order.order_number)).await,
            tab: AccountTab::Orders,
            order,
        }
        .into_response()),
        Err(BackendError::NotFound(_)) => Err(AppError::NotFound(format!("order {id}"))),
        Err(BackendError::Unauthorized) => {
            Ok(session_expired(page.session(), &format!("/account/orders/{id}")).await)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{StatusCode, header::COOKIE};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use tower::ServiceExt;
    use tower_sessions::MemoryStore;

    use kivu_core::CurrencyCode;

    use super::*;
    use crate::routes::tests::{body_text, get, signed_in_cookie, test_app_with_store};
    use crate::state::tests::test_state;

    fn order(id: i64, status: OrderStatus) -> Order {
        Order {
            id: OrderId::new(id),
            order_number: format!("KV-{id:05}"),
            status,
            total_amount: Decimal::from(125_000),
            currency: CurrencyCode::RWF,
            items_count: 2,
            tracking_number: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_filter_tabs_start_with_all() {
        let tabs = filter_tabs();
        assert_eq!(tabs.len(), OrderStatus::ALL.len() + 1);
        assert_eq!(tabs[0].filter.as_str(), "all");
        assert_eq!(tabs[3].label, "Shipped");
    }

    #[tokio::test]
    async fn test_source_renders_filtered_rows_once() {
        let mut source = OrdersSource::new(
            test_state().api().clone(),
            "token".to_string(),
            OrderFilter::Status(OrderStatus::Shipped),
        );
        let orders = vec![order(1, OrderStatus::Shipped), order(2, OrderStatus::Pending)];

        let html = source.render(&orders).unwrap();
        assert!(html.contains("KV-00001"));
        assert!(!html.contains("KV-00002"));
        assert!(source.render(&orders).is_none());
    }

    async fn signed_in_get(uri: &str) -> axum::response::Response {
        let store = MemoryStore::default();
        let cookie = signed_in_cookie(&store).await;
        let mut request = get(uri);
        request.headers_mut().insert(COOKIE, cookie.parse().unwrap());
        test_app_with_store(store).oneshot(request).await.unwrap()
    }

    #[tokio::test]
    async fn test_unknown_status_is_bad_request() {
        let response = signed_in_get("/account/orders?status=lost").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_history_degrades_to_empty_list() {
        let response = signed_in_get("/account/orders?status=shipped").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("No orders"));
        assert!(body.contains("sse-connect=\"/account/orders/events?status=shipped\""));
    }
}
