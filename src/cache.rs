use crate::cache::shard::LruShard;
use crate::cache::stats::Stats;
use std::borrow::Borrow;
use std::hash::{BuildHasher, Hash};
use std::num::NonZero;
use std::{cmp, thread};

mod accessor;
mod entry;
mod recency_list;
pub mod shard;
pub mod stats;

pub use accessor::ConstAccessor;

pub(crate) type RandomState = ahash::RandomState;

// High bits of the hash pick the shard; most hashers concentrate their
// entropy there.
const SHARD_SELECTION_SHIFT: u32 = u64::BITS - 16;

/// A sharded, thread-safe LRU cache.
///
/// The key space is partitioned across a fixed set of independent
/// [`LruShard`]s by a hash of the key, so operations on different shards
/// never contend with each other. Capacity and size are aggregated across
/// the shards.
pub struct ScalableLruCache<K, V, S = RandomState> {
    hash_builder: S,
    shards: Vec<LruShard<K, V, S>>,
}

impl<K, V> ScalableLruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn with_capacity(total_capacity: usize) -> ScalableLruCache<K, V> {
        ScalableLruCache::with_capacity_and_shards(total_capacity, 0)
    }

    /// A `shard_count` of zero picks the available parallelism of the
    /// machine.
    pub fn with_capacity_and_shards(
        total_capacity: usize,
        shard_count: usize,
    ) -> ScalableLruCache<K, V> {
        ScalableLruCache::with_capacity_and_hasher(total_capacity, shard_count, RandomState::new())
    }
}

impl<K, V, S> ScalableLruCache<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    pub fn with_capacity_and_hasher(
        total_capacity: usize,
        shard_count: usize,
        hash_builder: S,
    ) -> ScalableLruCache<K, V, S> {
        assert!(total_capacity > 0, "total capacity must be greater than 0");

        let requested = if shard_count == 0 {
            thread::available_parallelism()
                .map(NonZero::get)
                .unwrap_or(1)
        } else {
            shard_count
        };
        // never hand out zero-capacity shards
        let shard_count = cmp::min(requested, total_capacity);

        let capacity_per_shard = total_capacity / shard_count;
        let remainder = total_capacity % shard_count;

        let mut shards = Vec::with_capacity(shard_count);
        for i in 0..shard_count {
            // the remainder goes to the first shard, so the shard
            // capacities sum to the total exactly
            let capacity = if i == 0 {
                capacity_per_shard + remainder
            } else {
                capacity_per_shard
            };
            shards.push(LruShard::with_capacity_and_hasher(
                capacity,
                capacity,
                hash_builder.clone(),
            ));
        }

        ScalableLruCache {
            hash_builder,
            shards,
        }
    }

    pub fn insert(&self, key: K, value: V) -> bool {
        self.shard(&key).insert(key, value)
    }

    pub fn find<Q>(&self, key: &Q) -> Option<ConstAccessor<'_, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.shard(key).find(key)
    }

    pub fn erase<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.shard(key).erase(key)
    }

    /// Clears shard after shard. Not required to produce a consistent
    /// result when other operations run concurrently.
    pub fn clear(&self) {
        for shard in &self.shards {
            shard.clear();
        }
    }

    /// Snapshot aggregation over the shards; concurrent updates may be
    /// observed in any interleaving.
    pub fn size(&self) -> usize {
        self.shards.iter().map(LruShard::size).sum()
    }

    pub fn capacity(&self) -> usize {
        self.shards.iter().map(LruShard::capacity).sum()
    }

    /// Size of one shard; out-of-range indices report 0.
    pub fn shard_size(&self, shard_idx: usize) -> usize {
        self.shards.get(shard_idx).map_or(0, LruShard::size)
    }

    /// Capacity of one shard; out-of-range indices report 0.
    pub fn shard_capacity(&self, shard_idx: usize) -> usize {
        self.shards.get(shard_idx).map_or(0, LruShard::capacity)
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    pub fn stats(&self) -> Stats {
        let mut stats = Stats::default();
        for shard in &self.shards {
            stats.merge(&shard.stats());
        }
        stats
    }

    fn shard<Q>(&self, key: &Q) -> &LruShard<K, V, S>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash_builder.hash_one(key);
        let shard_idx = (hash >> SHARD_SELECTION_SHIFT) as usize % self.shards.len();
        self.shards
            .get(shard_idx)
            .expect("modulo op must return valid shard index")
    }
}
