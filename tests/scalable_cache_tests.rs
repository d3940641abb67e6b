use scalable_lru::ScalableLruCache;
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn single_shard_eviction_spares_promoted_keys() {
    let cache = ScalableLruCache::with_capacity_and_shards(3, 1);
    cache.insert(1, 10);
    cache.insert(2, 20);
    cache.insert(3, 30);

    // touching 2 promotes it, so 1 becomes the eviction victim
    assert_eq!(cache.find(&2).as_deref(), Some(&20));
    cache.insert(4, 40);

    assert!(cache.find(&1).is_none(), "expect 1 to be evicted");
    assert_eq!(cache.find(&2).as_deref(), Some(&20));
    assert_eq!(cache.find(&3).as_deref(), Some(&30));
    assert_eq!(cache.find(&4).as_deref(), Some(&40));
    assert_eq!(cache.size(), 3);
}

#[test]
fn duplicate_insert_keeps_the_first_value() {
    let cache = ScalableLruCache::with_capacity(100);

    assert!(cache.insert(5, 50));
    assert!(!cache.insert(5, 99));
    assert_eq!(cache.find(&5).as_deref(), Some(&50));
}

#[test]
fn erase_of_a_missing_key_reports_zero() {
    let cache: ScalableLruCache<u64, u64> = ScalableLruCache::with_capacity(100);

    assert_eq!(cache.erase(&999), 0);
}

#[test]
fn an_insert_is_visible_to_other_threads() {
    let cache = Arc::new(ScalableLruCache::with_capacity_and_shards(64, 4));

    let writer = Arc::clone(&cache);
    thread::spawn(move || {
        writer.insert(7, "seven");
    })
    .join()
    .unwrap();

    assert_eq!(cache.find(&7).as_deref(), Some(&"seven"));
}

#[test]
fn accessor_can_be_released_early() {
    let cache = ScalableLruCache::with_capacity(16);
    cache.insert(1, String::from("one"));

    let mut accessor = cache.find(&1).expect("expect hit for 1");
    assert_eq!(*accessor, "one");
    assert!(!accessor.empty());

    accessor.release();
    assert!(accessor.empty());
    assert_eq!(accessor.get(), None);
}

#[test]
fn concurrent_load_stays_bounded() {
    let cache = Arc::new(ScalableLruCache::with_capacity_and_shards(256, 8));
    let threads = 8;
    let iters = 2_000;
    let barrier = Arc::new(Barrier::new(threads));

    let mut handles = Vec::new();
    for t in 0..threads {
        let cache = Arc::clone(&cache);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            for i in 0..iters {
                let key = (i * 17 + t) % 1024;
                cache.insert(key, (t, i));
                let _ = cache.find(&key);
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    // the size counter may sit above capacity only by the transient
    // per-insert accounting window
    assert!(
        cache.size() <= cache.capacity() + threads,
        "cache size {} exceeds capacity {} by more than the transient window",
        cache.size(),
        cache.capacity()
    );
}

#[test]
fn random_operation_chaos_keeps_the_cache_consistent() {
    let cache = Arc::new(ScalableLruCache::with_capacity_and_shards(128, 4));
    let threads = 8;
    let iters = 4_000;

    let mut handles = Vec::new();
    for _ in 0..threads {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for _ in 0..iters {
                let key = rand::random::<u16>() % 512;
                match rand::random::<u8>() % 4 {
                    0 | 1 => {
                        cache.insert(key, u32::from(key) * 10);
                    }
                    2 => {
                        // a hit must carry the value the key was inserted with
                        if let Some(found) = cache.find(&key) {
                            assert_eq!(*found, u32::from(key) * 10);
                        }
                    }
                    _ => {
                        cache.erase(&key);
                    }
                }
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert!(cache.size() <= cache.capacity() + threads);
}

#[test]
fn stats_reflect_the_traffic() {
    let cache: ScalableLruCache<u64, u64> = ScalableLruCache::with_capacity_and_shards(64, 4);

    for key in 0..16 {
        cache.insert(key, key);
    }
    for key in 0..16 {
        assert!(cache.find(&key).is_some());
    }
    for key in 100..110 {
        assert!(cache.find(&key).is_none());
    }

    let stats = cache.stats();
    assert_eq!(stats.hit_count, 16);
    assert_eq!(stats.miss_count, 10);
}
