//! Process-wide cache sharing.
//!
//! When several modules of one process - including dynamically loaded ones -
//! consult the same lookup table, exactly one dispatcher instance must win:
//! a key's shard assignment is only stable within a single instance. The
//! strategy used here is an explicit-init cell: one crate exports a
//! `static` [`SharedCacheCell`] and every consumer links against that
//! single definition. Whoever calls [`SharedCacheCell::get_or_init`] first
//! fixes the capacity and shard count; later callers get the same instance
//! regardless of the parameters they pass.
//!
//! ```rust
//! use scalable_lru::SharedCacheCell;
//!
//! static DECISION_CACHE: SharedCacheCell<u64, i64> = SharedCacheCell::new();
//!
//! let cache = DECISION_CACHE.get_or_init(7, 4);
//! cache.insert(1, 11);
//!
//! // later callers observe the same instance, whatever they pass
//! let same = DECISION_CACHE.get_or_init(512, 8);
//! assert_eq!(same.capacity(), 7);
//! assert!(same.find(&1).is_some());
//! ```

use crate::cache::ScalableLruCache;
use once_cell::sync::OnceCell;
use std::hash::Hash;

pub struct SharedCacheCell<K, V> {
    cell: OnceCell<ScalableLruCache<K, V>>,
}

impl<K, V> SharedCacheCell<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub const fn new() -> SharedCacheCell<K, V> {
        SharedCacheCell {
            cell: OnceCell::new(),
        }
    }

    /// Returns the process-wide cache, constructing it on first use. A
    /// `shard_count` of zero picks the available parallelism of the
    /// machine.
    pub fn get_or_init(
        &self,
        total_capacity: usize,
        shard_count: usize,
    ) -> &ScalableLruCache<K, V> {
        self.cell
            .get_or_init(|| ScalableLruCache::with_capacity_and_shards(total_capacity, shard_count))
    }

    /// The cache, if some caller has initialized it already.
    pub fn get(&self) -> Option<&ScalableLruCache<K, V>> {
        self.cell.get()
    }
}

impl<K, V> Default for SharedCacheCell<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        SharedCacheCell::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::shared::SharedCacheCell;
    use std::thread;

    #[test]
    fn it_hands_every_module_the_same_instance() {
        // given a cell as two dynamically loaded modules would see it
        static CACHE: SharedCacheCell<u64, i64> = SharedCacheCell::new();

        // when each "module" initializes with its own parameters and
        // inserts its own key
        let first = thread::spawn(|| {
            CACHE.get_or_init(7, 4).insert(1, 11);
        });
        let second = thread::spawn(|| {
            CACHE.get_or_init(7, 4).insert(2, 22);
        });
        first.join().unwrap();
        second.join().unwrap();

        // then each sees the other's entry
        let cache = CACHE.get_or_init(7, 4);
        assert_eq!(cache.find(&1).as_deref(), Some(&11));
        assert_eq!(cache.find(&2).as_deref(), Some(&22));
    }

    #[test]
    fn it_keeps_the_parameters_of_the_first_initializer() {
        // given
        static CACHE: SharedCacheCell<u64, i64> = SharedCacheCell::new();
        assert!(CACHE.get().is_none());

        // when
        CACHE.get_or_init(7, 4);
        let reinitialized = CACHE.get_or_init(512, 8);

        // then
        assert_eq!(reinitialized.capacity(), 7);
        assert_eq!(reinitialized.shard_count(), 4);
        assert!(CACHE.get().is_some());
    }
}
