//! Cache module for short-lived weather responses
//!
//! `CacheStore` keeps each successful lookup for a fixed TTL on top of a
//! pluggable key-value substrate (`MemoryStore` for tests, `FileStore` on disk
//! for the binary). Stale or corrupt entries are deleted when they are found.

pub mod clock;
mod manager;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use manager::{normalize_query, CacheStore};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
