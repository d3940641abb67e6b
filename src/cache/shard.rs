use crate::cache::RandomState;
use crate::cache::accessor::ConstAccessor;
use crate::cache::entry::Entry;
use crate::cache::recency_list::RecencyList;
use crate::cache::stats::{Counters, Stats};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry as MapEntry;
use parking_lot::Mutex;
use std::borrow::Borrow;
use std::hash::{BuildHasher, Hash};
use std::sync::atomic::{AtomicUsize, Ordering};

/// A single thread-safe LRU partition: a concurrent hash map from key to
/// value combined with a recency list under one mutex.
///
/// `insert` and `erase` may block briefly on the list mutex; `find` only
/// ever try-locks it, so a contended lookup skips its recency update
/// instead of stalling (approximate LRU).
pub struct LruShard<K, V, S = RandomState> {
    map: DashMap<K, Entry<V>, S>,
    list: Mutex<RecencyList<K>>,
    current_size: AtomicUsize,
    capacity: usize,
    counters: Counters,
}

impl<K, V> LruShard<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(capacity: usize) -> LruShard<K, V> {
        LruShard::with_capacity_and_hasher(capacity, capacity, RandomState::new())
    }
}

impl<K, V, S> LruShard<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    /// `bucket_hint` pre-sizes the concurrent map; the map grows on its own
    /// beyond it.
    pub fn with_capacity_and_hasher(
        capacity: usize,
        bucket_hint: usize,
        hash_builder: S,
    ) -> LruShard<K, V, S> {
        assert!(capacity > 0, "capacity must be greater than 0");

        LruShard {
            map: DashMap::with_capacity_and_hasher(bucket_hint, hash_builder),
            list: Mutex::new(RecencyList::new()),
            current_size: AtomicUsize::new(0),
            capacity,
            counters: Counters::default(),
        }
    }

    /// Inserts a new key, evicting the least-recently-used entry when the
    /// shard is full. Returns false without touching the stored value if
    /// the key is already present.
    pub fn insert(&self, key: K, value: V) -> bool {
        let node = self.list.lock().allocate(key.clone());

        let inserted = match self.map.entry(key) {
            MapEntry::Occupied(_) => false,
            MapEntry::Vacant(slot) => {
                slot.insert(Entry::new(value, node));
                true
            }
        };
        if !inserted {
            // the key kept its first value; the node never joined the list
            self.list.lock().release(node);
            return false;
        }

        // Evict before linking, so the eviction and the pending insertion
        // cancel out in the size accounting.
        let mut size = self.current_size.load(Ordering::SeqCst);
        let mut popped = false;
        if size >= self.capacity {
            self.pop_front();
            popped = true;
        }

        self.list.lock().push_back(node);

        if !popped {
            size = self.current_size.fetch_add(1, Ordering::SeqCst);
        }

        // Concurrent inserts may have pushed the count past capacity. A
        // single compare-and-set and at most one extra eviction per insert
        // restores the bound without a retry loop.
        if size > self.capacity
            && self
                .current_size
                .compare_exchange(size, size - 1, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
        {
            self.pop_front();
        }

        true
    }

    /// Looks up a key and hands back a read handle carrying a copy of the
    /// value. A hit promotes the key to most-recently used when the list
    /// mutex can be taken without blocking; otherwise the order is left
    /// untouched.
    pub fn find<Q>(&self, key: &Q) -> Option<ConstAccessor<'_, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (value, node) = match self.map.get(key) {
            None => {
                self.counters.increment_miss_count();
                return None;
            }
            Some(guard) => {
                let entry = guard.value();
                // copy the value out so the map read guard drops before the
                // list mutex is touched
                (entry.value().clone(), entry.node())
            }
        };

        if let Some(mut list) = self.list.try_lock() {
            list.promote(node);
        }

        self.counters.increment_hit_count();
        Some(ConstAccessor::new(value))
    }

    /// Removes a key. Returns the number of entries removed (0 or 1).
    pub fn erase<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = match self.map.get(key) {
            None => return 0,
            Some(guard) => guard.value().node(),
        };

        // Only the thread whose removal takes effect unlinks the node and
        // decrements the size; a racing erase observes a miss.
        if self.map.remove(key).is_none() {
            return 0;
        }

        self.list.lock().remove(node);
        self.current_size.fetch_sub(1, Ordering::SeqCst);

        1
    }

    /// Drops every entry. Not required to produce a consistent result when
    /// other operations run on the same shard concurrently.
    pub fn clear(&self) {
        self.map.clear();
        self.list.lock().clear();
        self.current_size.store(0, Ordering::SeqCst);
    }

    pub fn size(&self) -> usize {
        self.current_size.load(Ordering::SeqCst)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> Stats {
        self.counters.snapshot()
    }

    /// Evicts the least-recently-used entry. Does not adjust
    /// `current_size`; callers account for the change themselves.
    fn pop_front(&self) {
        let key = {
            let mut list = self.list.lock();
            match list.pop_front() {
                None => return,
                Some(key) => key,
            }
        };

        // The list lock is released before touching the map; a find racing
        // into this window sees a stale node reference and skips its
        // promotion.
        if self.map.remove(&key).is_some() {
            self.counters.increment_eviction_count();
        }
    }
}
