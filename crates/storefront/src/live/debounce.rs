//! Per-token debouncing for search suggestions.
//!
//! Each keystroke in the search bar sends a request carrying the page's search
//! token. A request takes a ticket, sleeps for the window, and proceeds only if
//! its ticket is still the newest for that token.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;

/// Window the search bar waits for typing to stop.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(800);

/// Idle tokens are forgotten after this long.
const SLOT_IDLE: Duration = Duration::from_secs(120);

/// Keeps the newest ticket per token.
#[derive(Clone)]
pub struct Debouncer {
    window: Duration,
    slots: Cache<String, Arc<AtomicU64>>,
}

impl Debouncer {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            slots: Cache::builder()
                .max_capacity(10_000)
                .time_to_idle(SLOT_IDLE)
                .build(),
        }
    }

    /// Debounce window.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    async fn slot(&self, token: &str) -> Arc<AtomicU64> {
        self.slots
            .get_with(token.to_string(), async { Arc::new(AtomicU64::new(0)) })
            .await
    }

    /// Wait out the window. Returns `true` if no newer call for `token`
    /// arrived in the meantime.
    pub async fn settle(&self, token: &str) -> bool {
        let slot = self.slot(token).await;
        let ticket = slot.fetch_add(1, Ordering::AcqRel) + 1;

        tokio::time::sleep(self.window).await;

        slot.load(Ordering::Acquire) == ticket
    }

    /// Cancel any pending call for `token` without waiting.
    pub async fn supersede(&self, token: &str) {
        self.slot(token).await.fetch_add(1, Ordering::AcqRel);
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}
