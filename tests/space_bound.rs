use blocksort::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cmp::Ordering;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

// Live `Counted` values and the highest count seen. Global, so this file holds a single test.
static LIVE: AtomicUsize = AtomicUsize::new(0);
static PEAK: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug)]
struct Counted(u32);

impl Counted {
    fn new(key: u32) -> Self {
        let live = LIVE.fetch_add(1, AtomicOrdering::SeqCst) + 1;
        PEAK.fetch_max(live, AtomicOrdering::SeqCst);
        Counted(key)
    }
}

impl Clone for Counted {
    fn clone(&self) -> Self {
        Counted::new(self.0)
    }
}

impl Drop for Counted {
    fn drop(&mut self) {
        LIVE.fetch_sub(1, AtomicOrdering::SeqCst);
    }
}

#[test]
fn test_extra_values_bounded_by_cache() {
    let mut rng = StdRng::seed_from_u64(8);
    let count = 50_000;
    let keys: Vec<u32> = (0..count).map(|_| rng.random_range(0..5000)).collect();

    for cache in [0, 7, 512] {
        let mut data: Vec<Counted> = keys.iter().map(|&k| Counted::new(k)).collect();
        let baseline = LIVE.load(AtomicOrdering::SeqCst);
        PEAK.store(baseline, AtomicOrdering::SeqCst);

        let config = BlockSortConfig::default().with_cache_capacity(cache);
        let mut ops = blocksort::core::by_fn(|a: &Counted, b: &Counted| a.0.cmp(&b.0));
        block_sort_with(&mut data, &mut ops, &config);

        let extra = PEAK.load(AtomicOrdering::SeqCst) - baseline;
        assert!(extra <= cache + 2, "cache {cache}: {extra} extra live values");
        assert_eq!(LIVE.load(AtomicOrdering::SeqCst), baseline, "cache {cache}: leaked values");
        assert!(data.windows(2).all(|w| w[0].0.cmp(&w[1].0) != Ordering::Greater));

        drop(data);
    }
}
