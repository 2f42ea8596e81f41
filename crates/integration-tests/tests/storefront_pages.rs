//! Public pages, health checks and security headers.
//!
//! Requires a running storefront (`STOREFRONT_BASE_URL`).

use kivu_integration_tests::{session_client, storefront_base_url};
use reqwest::StatusCode;

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_health_endpoints() {
    let client = session_client();
    let base_url = storefront_base_url();

    let resp = client
        .get(format!("{base_url}/health"))
        .send()
        .await
        .expect("Failed to get /health");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.expect("body"), "ok");

    let resp = client
        .get(format!("{base_url}/health/ready"))
        .send()
        .await
        .expect("Failed to get /health/ready");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_home_page_has_csp_nonce() {
    let client = session_client();
    let resp = client
        .get(format!("{}/", storefront_base_url()))
        .send()
        .await
        .expect("Failed to get home page");

    assert_eq!(resp.status(), StatusCode::OK);
    let csp = resp
        .headers()
        .get("content-security-policy")
        .expect("CSP header")
        .to_str()
        .expect("ascii CSP")
        .to_string();
    assert!(csp.contains("'nonce-"));
    assert!(resp.headers().contains_key("x-request-id"));

    let body = resp.text().await.expect("body");
    assert!(body.contains("/widgets/slider/"));
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_static_pages_render() {
    let client = session_client();
    let base_url = storefront_base_url();

    for path in [
        "/about",
        "/faq",
        "/returns",
        "/warranty",
        "/offline",
        "/coming-soon",
        "/blog",
        "/contact",
    ] {
        let resp = client
            .get(format!("{base_url}{path}"))
            .send()
            .await
            .expect("Failed to get page");
        assert_eq!(resp.status(), StatusCode::OK, "{path}");
    }
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_unknown_blog_post_is_404() {
    let resp = session_client()
        .get(format!("{}/blog/no-such-post", storefront_base_url()))
        .send()
        .await
        .expect("Failed to get blog post");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_contact_validation_redirects_back() {
    let resp = session_client()
        .post(format!("{}/contact", storefront_base_url()))
        .form(&[("name", "Integration"), ("email", "nope"), ("message", "Hi")])
        .send()
        .await
        .expect("Failed to post contact form");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get("location").expect("location"),
        "/contact"
    );
}
