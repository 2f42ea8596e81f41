//! Time-driven behaviour: debounced search, periodic polling and the
//! flash-sale countdown.
//!
//! Everything here is owned by a request or an SSE response stream; dropping
//! the owner cancels the work.

mod debounce;
mod poll;
mod ticker;

pub use debounce::{Debouncer, SEARCH_DEBOUNCE};
pub use poll::{PollHandle, PollSource, Poller, poll_events};
pub use ticker::countdown_frames;
