//! Caching layer for upstream API responses

pub mod clock;
pub mod fetch_cache;

pub use clock::{Clock, ManualClock, SystemClock};
pub use fetch_cache::{FetchCache, FetchOptions};
