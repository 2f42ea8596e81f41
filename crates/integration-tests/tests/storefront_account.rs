//! Account pages, live streams and auth redirects.
//!
//! Requires a running storefront. Signed-in tests also need
//! `TEST_CUSTOMER_EMAIL` / `TEST_CUSTOMER_PASSWORD` for a real account.

use futures_util::StreamExt;
use kivu_integration_tests::{session_client, sign_in, storefront_base_url};
use reqwest::StatusCode;

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_account_redirects_anonymous_to_login() {
    let resp = session_client()
        .get(format!("{}/account/orders", storefront_base_url()))
        .send()
        .await
        .expect("Failed to get account page");

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get("location").expect("location"),
        "/auth/login?next=%2Faccount%2Forders"
    );
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_event_stream_rejects_anonymous() {
    let resp = session_client()
        .get(format!("{}/account/events", storefront_base_url()))
        .header("accept", "text/event-stream")
        .send()
        .await
        .expect("Failed to open event stream");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running storefront, user service and test customer"]
async fn test_dashboard_and_orders_for_signed_in_customer() {
    let client = session_client();
    if !sign_in(&client).await {
        return;
    }
    let base_url = storefront_base_url();

    for path in ["/account", "/account/orders", "/account/orders?status=shipped"] {
        let resp = client
            .get(format!("{base_url}{path}"))
            .send()
            .await
            .expect("Failed to get account page");
        assert_eq!(resp.status(), StatusCode::OK, "{path}");
    }

    let resp = client
        .get(format!("{base_url}/account/orders?status=lost"))
        .send()
        .await
        .expect("Failed to get filtered orders");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running storefront, user service and test customer"]
async fn test_dashboard_stream_opens() {
    let client = session_client();
    if !sign_in(&client).await {
        return;
    }

    let resp = client
        .get(format!("{}/account/events", storefront_base_url()))
        .header("accept", "text/event-stream")
        .send()
        .await
        .expect("Failed to open event stream");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").expect("content type"),
        "text/event-stream"
    );

    // The stream stays open; dropping it must release the poll server-side.
    let mut body = resp.bytes_stream();
    let first = tokio::time::timeout(std::time::Duration::from_secs(1), body.next()).await;
    drop(first);
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_flash_sale_countdown_streams_ticks() {
    let resp = session_client()
        .get(format!("{}/widgets/flash-sale/countdown", storefront_base_url()))
        .header("accept", "text/event-stream")
        .send()
        .await
        .expect("Failed to open countdown");
    assert_eq!(resp.status(), StatusCode::OK);

    let mut body = resp.bytes_stream();
    let chunk = tokio::time::timeout(std::time::Duration::from_secs(3), body.next())
        .await
        .expect("tick within 3s")
        .expect("stream item")
        .expect("chunk");
    let text = String::from_utf8_lossy(&chunk);
    assert!(text.contains("event: tick") || text.contains("event: end"));
}
