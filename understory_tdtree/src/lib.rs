// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_tdtree --heading-base-level=0

//! Understory TD-Tree: an in-memory temporal-validity cache index.
//!
//! A TD-Tree maps an object identifier plus a half-open validity interval
//! `[start, end)` to a cached value, and answers "which value is valid for
//! object X at time T" without going back to the backing store.
//!
//! - Each record is the point `(start, end)` of a plane. Valid intervals fill
//!   the right triangle `end >= start` bounded by [`MAX_VALUE`].
//! - The triangle is tiled by leaves, each owning a smaller right isosceles
//!   triangle. A full leaf divides along its altitude into two halves.
//! - A point-in-time query at `t` covers the rectangle `[0, t] × [t, max]`;
//!   whole subtrees of leaves inside or outside it are settled at once.
//!
//! Object ids are hashed with [`object_id_hash`]. Distinct ids may collide, in
//! which case they share cached records.
//!
//! # Example
//!
//! ```rust
//! use understory_tdtree::TdTree;
//!
//! let mut cache: TdTree<&str> = TdTree::new();
//! cache.insert_value("station-7", 1_000, 2_000, "calibrated")?;
//! cache.insert_value("station-7", 2_000, 2_000, "inspected")?;
//!
//! assert_eq!(cache.get_value("station-7", 1_500), Some(&"calibrated"));
//! // Intervals are half-open; an empty interval is valid at its single instant.
//! assert_eq!(cache.get_value("station-7", 2_000), Some(&"inspected"));
//! assert_eq!(cache.get_value("station-7", 2_001), None);
//!
//! // Move the calibration so it stays valid from 1500 onwards.
//! cache.set_key_temporals("station-7", 1_200, 1_500)?;
//! assert_eq!(cache.get_value("station-7", 1_200), None);
//! assert_eq!(cache.get_value("station-7", 9_000), Some(&"calibrated"));
//! assert_eq!(cache.index_size(), 2);
//! # Ok::<(), understory_tdtree::TdTreeError>(())
//! ```
//!
//! Smaller blocks and a narrower domain make the leaf layout easy to inspect:
//!
//! ```rust
//! use understory_tdtree::{LeafKind, TdTree, TdTreeConfig};
//!
//! let config = TdTreeConfig::default().with_block_size(2).with_max_value(1024);
//! let mut cache: TdTree<u32> = TdTree::with_config(config)?;
//! for (i, (start, end)) in [(600, 1000), (10, 20), (100, 900)].into_iter().enumerate() {
//!     cache.insert_value(&format!("obj-{i}"), start, end, i as u32)?;
//! }
//!
//! let stats = cache.leaf_statistics();
//! assert_eq!(stats.len(), 2);
//! assert!(stats.iter().all(|leaf| leaf.kind == LeafKind::Splittable));
//! assert_eq!(stats[0].binary_id, "10");
//! # Ok::<(), understory_tdtree::TdTreeError>(())
//! ```
//!
//! ## Maintenance
//!
//! Deleted records leave holes in their leaf until
//! [`TdTree::rebuild_index`] reinserts the survivors. Use
//! [`TdTree::calculate_fragmentation`] to decide when that is worth it.
//!
//! ## Logging
//!
//! Splits, collapses, rebuilds, and drops are reported as `tracing` debug
//! events; insert routing and query pruning as trace events.
//!
//! ## Features
//!
//! - `std` (default): float rounding from the standard library.
//! - `libm`: float rounding from `libm`, for `no_std` targets.
//! - `serde`: `Serialize`/`Deserialize` for [`TdTreeConfig`] and [`LeafStatistics`].
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

mod bits;
mod cache;
mod config;
mod error;
mod geometry;
mod index;
mod leaf;
mod search;
mod split;
mod types;

pub use bits::{id_length, id_similarity, match_length, object_id_hash};
pub use cache::TemporalCache;
pub use config::{DEFAULT_BLOCK_SIZE, MAX_VALUE, TdTreeConfig};
pub use error::{Result, TdTreeError};
pub use index::TdTree;
pub use types::{LeafId, LeafKind, LeafStatistics, RecordKey};

#[cfg(test)]
mod proptests;
