//! # Blocksort
//!
//! `blocksort` is a stable, in-place block merge sort with a small, fixed scratch footprint. It
//! sorts any slice of `Clone` values using at most a caller-chosen number of elements of scratch
//! space (512 by default), no matter how long the slice is.
//!
//! ## Key Features
//!
//! - **Stable**: Elements that compare equal keep their original relative order.
//! - **Bounded memory**: Small merges go through a fixed-size cache. Larger merges borrow runs of
//!   distinct values from the sequence itself as internal buffers and give them back afterwards.
//! - **Adaptive**: Already sorted runs are detected and skipped; sorted input is never written.
//! - **Pluggable operations**: Every comparison, exchange and write goes through the [`SortOps`]
//!   trait, so the sort can be counted, traced or redirected (see [`core::Counting`]).
//!
//! ## Usage
//!
//! ### Basic Usage
//!
//! ```rust
//! use blocksort::block_sort;
//!
//! let mut data = vec!["banana", "apple", "cherry", "date"];
//! block_sort(&mut data);
//!
//! assert_eq!(data, vec!["apple", "banana", "cherry", "date"]);
//! ```
//!
//! ### Custom Operations
//!
//! Implement [`SortOps`] to observe or customize what the sort does to the sequence, and pass a
//! [`BlockSortConfig`] to bound the cache.
//!
//! ```rust
//! use blocksort::{block_sort_with, BlockSortConfig};
//! use blocksort::core::{by_fn, Counting};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct User {
//!     name: &'static str,
//!     age: u32,
//! }
//!
//! let mut users = vec![
//!     User { name: "Carol", age: 35 },
//!     User { name: "Alice", age: 30 },
//!     User { name: "Bob", age: 30 },
//! ];
//!
//! let mut ops = Counting::new(by_fn(|a: &User, b: &User| a.age.cmp(&b.age)));
//! let config = BlockSortConfig::default().with_cache_capacity(0);
//! block_sort_with(&mut users, &mut ops, &config);
//!
//! let names: Vec<_> = users.iter().map(|u| u.name).collect();
//! assert_eq!(names, vec!["Alice", "Bob", "Carol"]);
//! assert!(ops.counts().compares > 0);
//! ```
//!
//! ## Performance Characteristics
//!
//! - **Best Case**: O(N) comparisons and no writes when the input is already sorted.
//! - **Worst Case**: O(N log N) comparisons and moves.
//! - **Memory Overhead**: A cache of `min(cache_capacity, N)` cloned elements, allocated once per
//!   call, plus a handful of indices.

pub mod algo;
pub mod config;
pub mod core;
pub mod merge;
pub mod range;

mod buffer;
mod search;

// The hooks are always compiled in; without the feature they do nothing.
#[cfg(not(feature = "tracking"))]
mod tracking;
#[cfg(feature = "tracking")]
pub mod tracking;

pub use algo::{block_sort, block_sort_by, block_sort_by_key, block_sort_with};
pub use config::BlockSortConfig;
pub use crate::core::{Counting, Natural, SortOps};

pub mod prelude {
    pub use crate::algo::{block_sort, block_sort_by, block_sort_by_key, block_sort_with};
    pub use crate::config::BlockSortConfig;
    pub use crate::core::SortOps;
}
