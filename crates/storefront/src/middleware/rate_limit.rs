//! Rate limiting using governor and `tower_governor`.
//!
//! - `suggest_rate_limiter`: search suggestions fire on every keystroke, so
//!   the burst is generous
//! - `form_rate_limiter`: strict limits for login, registration, contact and
//!   payment initiation

use std::net::IpAddr;
use std::sync::Arc;

use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Proxy headers carrying the client IP, most trusted first.
const CLIENT_IP_HEADERS: [&str; 4] = [
    "cf-connecting-ip",
    "x-forwarded-for",
    "x-real-ip",
    "fly-client-ip",
];

/// Key extractor that reads the client IP from proxy headers.
///
/// `X-Forwarded-For` may hold a chain; the first entry is the client.
#[derive(Clone, Copy)]
pub struct ProxyIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ProxyIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let headers = req.headers();
        CLIENT_IP_HEADERS
            .iter()
            .filter_map(|name| headers.get(*name))
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| value.split(',').next())
            .find_map(|ip| ip.trim().parse::<IpAddr>().ok())
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ProxyIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

fn limiter(replenish_every_secs: u64, burst: u32) -> Option<RateLimiterLayer> {
    GovernorConfigBuilder::default()
        .key_extractor(ProxyIpKeyExtractor)
        .per_second(replenish_every_secs)
        .burst_size(burst)
        .finish()
        .map(|config| GovernorLayer::new(Arc::new(config)))
}

/// Rate limiter for form posts: ~10 requests per minute per IP, burst of 5.
///
/// # Panics
///
/// Never in practice: `per_second(6)` and `burst_size(5)` are valid.
#[must_use]
pub fn form_rate_limiter() -> RateLimiterLayer {
    limiter(6, 5).expect("rate limiter config with per_second(6) and burst_size(5) is valid")
}

/// Rate limiter for search suggestions and fragments: 1 per second
/// replenish, burst of 60.
///
/// # Panics
///
/// Never in practice: `per_second(1)` and `burst_size(60)` are valid.
#[must_use]
pub fn suggest_rate_limiter() -> RateLimiterLayer {
    limiter(1, 60).expect("rate limiter config with per_second(1) and burst_size(60) is valid")
}
