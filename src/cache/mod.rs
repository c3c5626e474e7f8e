//! In-process caches with injected clocks.

pub mod clock;
pub mod price_cache;

pub use clock::{Clock, ManualClock, SystemClock};
pub use price_cache::{CacheEntry, CacheLookup, PriceCache, SnapshotSource};
