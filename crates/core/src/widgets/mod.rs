//! Rules behind the storefront's interactive widgets.
//!
//! The widgets themselves are HTMX fragments rendered by the storefront; these
//! types hold the arithmetic so it can be tested without a browser.

pub mod carousel;
pub mod countdown;
pub mod recent_searches;

pub use carousel::Carousel;
pub use countdown::Countdown;
pub use recent_searches::{MAX_RECENT_SEARCHES, RecentSearches};
