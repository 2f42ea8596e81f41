//! Periodic polling owned by an SSE connection.
//!
//! A [`Poller`] runs a [`PollSource`] on a fixed interval in its own task and
//! forwards whatever the source yields. The returned [`PollHandle`] aborts the
//! task when dropped, so the poll lives exactly as long as the stream that
//! owns it.

use std::convert::Infallible;
use std::future::Future;
use std::time::Duration;

use axum::response::sse::Event;
use futures_util::Stream;
use futures_util::stream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Something fetched on every tick.
///
/// Returning `None` skips the tick (nothing changed, or the fetch failed and
/// was logged).
pub trait PollSource: Send + 'static {
    type Item: Send + 'static;

    fn poll(&mut self) -> impl Future<Output = Option<Self::Item>> + Send;
}

/// Aborts the polling task on drop.
#[derive(Debug)]
pub struct PollHandle {
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Whether the task has stopped.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Interval-driven poll.
#[derive(Debug, Clone, Copy)]
pub struct Poller {
    period: Duration,
}

impl Poller {
    #[must_use]
    pub const fn every(period: Duration) -> Self {
        Self { period }
    }

    /// Start polling. The first poll happens one period from now; the page
    /// that opened the stream was rendered with fresh data.
    pub fn spawn<S: PollSource>(self, mut source: S) -> (PollHandle, mpsc::Receiver<S::Item>) {
        let (tx, rx) = mpsc::channel(4);
        let period = self.period;

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    () = tx.closed() => break,
                    _ = interval.tick() => {}
                }
                if let Some(item) = source.poll().await
                    && tx.send(item).await.is_err()
                {
                    break;
                }
            }
            tracing::debug!("poller stopped");
        });

        (PollHandle { task }, rx)
    }
}

/// Turn a poll into an SSE stream of `event` frames carrying HTML fragments.
///
/// The stream owns the handle: when the client disconnects axum drops the
/// stream and the poll task is aborted.
pub fn poll_events(
    event: &'static str,
    handle: PollHandle,
    rx: mpsc::Receiver<String>,
) -> impl Stream<Item = Result<Event, Infallible>> + Send + 'static {
    stream::unfold((handle, rx), move |(handle, mut rx)| async move {
        let html = rx.recv().await?;
        Some((Ok(Event::default().event(event).data(html)), (handle, rx)))
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures_util::StreamExt;

    use super::*;

    struct Counter {
        calls: Arc<AtomicUsize>,
    }

    impl PollSource for Counter {
        type Item = String;

        async fn poll(&mut self) -> Option<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            // Only every second poll reports a change.
            (n % 2 == 0).then(|| format!("<p>{n}</p>"))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_on_interval_and_skips_unchanged() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (handle, mut rx) = Poller::every(Duration::from_secs(30)).spawn(Counter {
            calls: Arc::clone(&calls),
        });

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let first = rx.recv().await;
        assert_eq!(first.as_deref(), Some("<p>2</p>"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        drop(handle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_polling() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (handle, _rx) = Poller::every(Duration::from_secs(60)).spawn(Counter {
            calls: Arc::clone(&calls),
        });

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        drop(handle);
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_receiver_ends_task() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (handle, rx) = Poller::every(Duration::from_secs(30)).spawn(Counter {
            calls: Arc::clone(&calls),
        });
        drop(rx);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(handle.is_finished());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_event_stream_forwards_fragments() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (handle, rx) = Poller::every(Duration::from_secs(30)).spawn(Counter {
            calls: Arc::clone(&calls),
        });
        let mut events = Box::pin(poll_events("update", handle, rx));
        assert!(events.next().await.is_some());
    }
}
