use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Stats {
    pub hit_count: u64,
    pub miss_count: u64,
    pub eviction_count: u64,
}

impl Stats {
    pub(crate) fn merge(&mut self, other: &Stats) {
        self.hit_count += other.hit_count;
        self.miss_count += other.miss_count;
        self.eviction_count += other.eviction_count;
    }
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    hit_count: AtomicU64,
    miss_count: AtomicU64,
    eviction_count: AtomicU64,
}

impl Counters {
    pub(crate) fn snapshot(&self) -> Stats {
        Stats {
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
            eviction_count: self.eviction_count.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn increment_hit_count(&self) {
        self.hit_count.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn increment_miss_count(&self) {
        self.miss_count.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn increment_eviction_count(&self) {
        self.eviction_count.fetch_add(1, Ordering::Relaxed);
    }
}
