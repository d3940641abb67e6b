//! A sharded, thread-safe LRU cache.
//!
//! This crate provides a size-bounded Least-Recently-Used cache built for
//! embedding in high-throughput services as a shared in-process lookup
//! table, e.g. a soft-block IP decision cache.
//!
//! # Features
//!
//! - Thread-safe by default - no need for explicit synchronization
//! - Sharded design: keys are dispatched by hash to independent LRU
//!   shards, so operations on different shards never contend
//! - Lookups never block on the recency bookkeeping: a contended `find`
//!   skips its LRU promotion instead of stalling (approximate LRU)
//! - No unsafe code
//!
//! # Safety
//!
//! This crate is designed to be safe and easy to use:
//!
//! - No unsafe code is used
//! - Thread-safe by default when wrapped in `Arc`
//! - Eviction keeps the total entry count bounded by the configured
//!   capacity, up to a small transient window during concurrent inserts
//!
//! # Examples
//!
//! Basic usage with string keys and values:
//!
//! ```rust
//! use scalable_lru::ScalableLruCache;
//!
//! // Create a new cache with a total capacity of 1000 items
//! let cache = ScalableLruCache::with_capacity(1000);
//!
//! // Insert and retrieve a value
//! cache.insert("key1", "value1");
//! assert_eq!(cache.find("key1").as_deref(), Some(&"value1"));
//! assert!(cache.find("missing").is_none());
//! ```
//!
//! Inserting never overwrites - the first value for a key wins until the
//! key is erased or evicted:
//!
//! ```rust
//! use scalable_lru::ScalableLruCache;
//!
//! let cache = ScalableLruCache::with_capacity_and_shards(100, 4);
//!
//! assert!(cache.insert(5, 50));
//! assert!(!cache.insert(5, 99));
//! assert_eq!(cache.find(&5).as_deref(), Some(&50));
//!
//! assert_eq!(cache.erase(&5), 1);
//! assert_eq!(cache.erase(&5), 0);
//! ```
//!
//! Thread-safe usage across multiple threads:
//!
//! ```rust
//! use scalable_lru::ScalableLruCache;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let cache = Arc::new(ScalableLruCache::with_capacity(100));
//! cache.insert(1, "one");
//!
//! // Spawn a thread that inserts a value
//! let cache_in_arc = Arc::clone(&cache);
//! let handle = thread::spawn(move || {
//!     cache_in_arc.insert(2, "two");
//! });
//!
//! handle.join().unwrap();
//!
//! assert!(cache.find(&1).is_some());
//! assert!(cache.find(&2).is_some());
//! ```

#![forbid(unsafe_code)]
pub mod cache;
pub mod shared;

pub use cache::ConstAccessor;
pub use cache::ScalableLruCache;
pub use cache::shard::LruShard;
pub use cache::stats::Stats;
pub use shared::SharedCacheCell;
