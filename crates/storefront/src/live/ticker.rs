//! Once-a-second countdown frames for the flash-sale popup.

use std::time::Duration;

use futures_util::Stream;
use futures_util::stream;
use tokio::time::{Interval, MissedTickBehavior};

use kivu_core::Countdown;

/// Yield the countdown now and then once per `period` until it reaches zero.
///
/// The last frame is always `00:00:00`; the stream ends after it.
pub fn countdown_frames(
    countdown: Countdown,
    period: Duration,
) -> impl Stream<Item = Countdown> + Send + 'static {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    stream::unfold(
        (countdown, interval, false),
        |(mut countdown, mut interval, done): (Countdown, Interval, bool)| async move {
            if done {
                return None;
            }
            // The first tick completes immediately and yields the start value.
            interval.tick().await;
            let frame = countdown;
            let finished = frame.is_finished();
            countdown.tick();
            Some((frame, (countdown, interval, finished)))
        },
    )
}
