#![no_main]

use blocksort::{BlockSortConfig, block_sort_with};
use blocksort::core::by_fn;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (&[u8], usize)| {
    let mut arr: Vec<(u8, u8)> = data.0.chunks_exact(2).map(|c| (c[0], c[1])).collect();
    let mut arr2 = arr.clone();

    // Small caches and short runs reach the internal buffer paths on short inputs.
    let config = BlockSortConfig::default()
        .with_cache_capacity(data.1 % 40)
        .with_run_size(4 << (data.1 / 40 % 3));

    let mut ops = by_fn(|a: &(u8, u8), b: &(u8, u8)| a.1.cmp(&b.1));
    block_sort_with(&mut arr, &mut ops, &config);
    arr2.sort_by(|a, b| a.1.cmp(&b.1));
    assert_eq!(arr, arr2);
});
