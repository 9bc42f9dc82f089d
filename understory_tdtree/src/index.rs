// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The TD-Tree index: leaf routing, split integration, and the cache operations.

use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Reverse;
use core::fmt::Debug;
use core::sync::atomic::{AtomicI64, Ordering};

use crate::bits::{id_similarity, object_id_hash};
use crate::config::TdTreeConfig;
use crate::error::{Result, TdTreeError};
use crate::geometry::Geometry;
use crate::leaf::{InsertOutcome, LeafNode};
use crate::search::candidate_leaves;
use crate::types::{LeafId, LeafStatistics, RecordKey};

/// Temporal-validity index over `(object, [start, end))` keys.
///
/// Records are points `(start, end)` in a right triangle of the plane, which
/// the index tiles with leaf triangles. A leaf that overflows divides along
/// its altitude. A leaf that can no longer divide becomes an unbounded point
/// leaf.
///
/// Reads take `&self` and mutations `&mut self`; there is no interior locking.
/// The record counter is atomic so [`index_size`](Self::index_size) can be
/// sampled through a shared reference.
pub struct TdTree<V> {
    config: TdTreeConfig,
    geometry: Geometry,
    /// Live leaves in creation order. Never empty.
    leaves: Vec<LeafNode<V>>,
    /// Depth of the deepest leaf ever created since the last reset.
    max_depth: u32,
    size: AtomicI64,
}

impl<V> Default for TdTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Debug for TdTree<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TdTree")
            .field("leaves", &self.leaves.len())
            .field("max_depth", &self.max_depth)
            .field("size", &self.index_size())
            .field("block_size", &self.config.block_size)
            .finish_non_exhaustive()
    }
}

impl<V> TdTree<V> {
    /// Create an empty index with the default configuration.
    pub fn new() -> Self {
        Self::from_valid_config(TdTreeConfig::default())
    }

    /// Create an empty index after validating `config`.
    pub fn with_config(config: TdTreeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: TdTreeConfig) -> Self {
        let geometry = Geometry::new(config.max_value);
        let root = LeafNode::splittable(LeafId::ROOT, geometry.root(), config.block_size);
        Self {
            config,
            geometry,
            leaves: vec![root],
            max_depth: 0,
            size: AtomicI64::new(0),
        }
    }

    /// Configuration the index was built with.
    pub fn config(&self) -> &TdTreeConfig {
        &self.config
    }

    /// Slots per splittable leaf.
    pub fn block_size(&self) -> usize {
        self.config.block_size
    }

    /// Inclusive upper bound for interval ends.
    pub fn max_value(&self) -> i64 {
        self.config.max_value
    }

    /// Number of live leaves.
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Depth of the deepest leaf created since construction or the last reset.
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Running count of stored records.
    ///
    /// Incremented for every newly stored key and decremented by deletes.
    pub fn index_size(&self) -> i64 {
        self.size.load(Ordering::Relaxed)
    }

    /// Cache `value` for `object_id` over `[start, end)`.
    ///
    /// Pass `start == end` for a fact valid at a single instant. Inserting a
    /// key that is already present keeps the existing value.
    ///
    /// # Errors
    ///
    /// Fails without touching the index when `start` is negative or `end`
    /// exceeds [`max_value`](Self::max_value).
    pub fn insert_value(&mut self, object_id: &str, start: i64, end: i64, value: V) -> Result<()> {
        self.insert_record(RecordKey::new(object_id_hash(object_id), start, end), value)
            .map(|_| ())
    }

    /// Cache `value` under a precomputed key.
    ///
    /// Returns `true` if the key was new, `false` if it was already present.
    ///
    /// # Errors
    ///
    /// Same bounds as [`insert_value`](Self::insert_value).
    pub fn insert_record(&mut self, key: RecordKey, value: V) -> Result<bool> {
        self.check_bounds(key.start, key.end)?;
        Ok(self.store(key, value))
    }

    /// The value cached for `object_id` that is valid at `at`.
    ///
    /// When several records of the object are valid at `at`, the one with the
    /// smallest key wins: earliest start, then earliest end. The answer does
    /// not depend on how records are spread over leaves.
    pub fn get_value(&self, object_id: &str, at: i64) -> Option<&V> {
        let object = object_id_hash(object_id);
        self.candidates(at)
            .into_iter()
            .filter_map(|position| self.leaves[position].first_valid(object, at))
            .min_by_key(|(key, _)| **key)
            .map(|(_, value)| value)
    }

    /// Remove the record of `object_id` valid at `at` that
    /// [`get_value`](Self::get_value) would return.
    pub fn delete_value(&mut self, object_id: &str, at: i64) -> bool {
        let Some((position, key)) = self.find_record(object_id_hash(object_id), at) else {
            return false;
        };
        let removed = self.leaves[position].remove(&key);
        if removed {
            self.size.fetch_sub(1, Ordering::Relaxed);
        }
        removed
    }

    /// Replace the value of the record of `object_id` valid at `at` that
    /// [`get_value`](Self::get_value) would return, keeping its interval.
    pub fn update_value(&mut self, object_id: &str, at: i64, value: V) -> bool {
        let Some((position, key)) = self.find_record(object_id_hash(object_id), at) else {
            return false;
        };
        match self.leaves[position].value_mut(&key) {
            Some(current) => {
                *current = value;
                true
            }
            None => false,
        }
    }

    /// Move the record of `object_id` valid at `at` to `[new_start, new_end)`
    /// with `value`.
    ///
    /// The new record is stored even if nothing was valid at `at`. Returns
    /// whether an old record was removed.
    ///
    /// # Errors
    ///
    /// The new interval is checked before anything is removed.
    pub fn replace_key_value(
        &mut self,
        object_id: &str,
        at: i64,
        new_start: i64,
        new_end: i64,
        value: V,
    ) -> Result<bool> {
        self.check_bounds(new_start, new_end)?;
        let removed = self.delete_value(object_id, at);
        self.store(
            RecordKey::new(object_id_hash(object_id), new_start, new_end),
            value,
        );
        Ok(removed)
    }

    /// Drop every leaf and start over from an empty root.
    pub fn drop_index(&mut self) {
        tracing::debug!(leaves = self.leaves.len(), "dropping index");
        self.reset();
        self.size.store(0, Ordering::Relaxed);
    }

    /// Reinsert every live record into a fresh tree.
    ///
    /// Tombstones disappear and leaves are sized to the surviving records.
    pub fn rebuild_index(&mut self) {
        let leaves = core::mem::take(&mut self.leaves);
        let records: Vec<_> = leaves
            .into_iter()
            .filter(|leaf| leaf.record_count() > 0)
            .flat_map(LeafNode::dump_leaf)
            .collect();
        tracing::debug!(records = records.len(), "rebuilding index");
        self.reset();
        self.size.store(0, Ordering::Relaxed);
        for (key, value) in records {
            self.store(key, value);
        }
    }

    /// Mean tombstone share over populated leaves, or 0 if none are populated.
    pub fn calculate_fragmentation(&self) -> f64 {
        let (sum, populated) = self
            .leaves
            .iter()
            .filter(|leaf| leaf.record_count() > 0)
            .fold((0.0, 0_u32), |(sum, count), leaf| {
                (sum + leaf.fragmentation(), count + 1)
            });
        if populated == 0 {
            0.0
        } else {
            sum / f64::from(populated)
        }
    }

    /// A snapshot of every live leaf, in collection order.
    pub fn leaf_statistics(&self) -> Vec<LeafStatistics> {
        self.leaves
            .iter()
            .map(|leaf| {
                let id = leaf.id();
                let triangle = leaf.triangle();
                LeafStatistics {
                    id: id.get(),
                    binary_id: id.binary(),
                    kind: leaf.kind(),
                    vertices: self.geometry.triangle_vertices(triangle),
                    direction: triangle.direction.get(),
                    record_count: leaf.record_count(),
                    fragmentation: leaf.fragmentation(),
                }
            })
            .collect()
    }

    fn check_bounds(&self, start: i64, end: i64) -> Result<()> {
        if start < 0 {
            return Err(TdTreeError::NegativeStart { start });
        }
        if end > self.config.max_value {
            return Err(TdTreeError::EndOutOfRange {
                end,
                max_value: self.config.max_value,
            });
        }
        Ok(())
    }

    fn reset(&mut self) {
        let root = LeafNode::splittable(LeafId::ROOT, self.geometry.root(), self.config.block_size);
        self.leaves = vec![root];
        self.max_depth = 0;
    }

    pub(crate) fn candidates(&self, at: i64) -> Vec<usize> {
        candidate_leaves(&self.leaves, &self.geometry, at)
    }

    /// Leaf position and key of the smallest record of `object` valid at `at`.
    fn find_record(&self, object: i64, at: i64) -> Option<(usize, RecordKey)> {
        self.candidates(at)
            .into_iter()
            .filter_map(|position| {
                let (key, _) = self.leaves[position].first_valid(object, at)?;
                Some((position, *key))
            })
            .min_by_key(|&(_, key)| key)
    }

    /// The region `(start, end)` falls in, descending no deeper than any leaf.
    fn matching_leaf(&self, start: i64, end: i64) -> LeafId {
        let mut id = LeafId::ROOT;
        let mut triangle = self.geometry.root();
        while triangle.depth < self.max_depth {
            let (lower, higher) = self.geometry.children(&triangle);
            if self.geometry.check_point_intersection(&lower, start, end) {
                id = id.lower_child();
                triangle = lower;
            } else {
                id = id.higher_child();
                triangle = higher;
            }
        }
        id
    }

    /// Position of the first leaf sharing the longest prefix with the region
    /// of `key`.
    fn route(&self, key: &RecordKey) -> usize {
        let target = self.matching_leaf(key.start, key.end);
        let position = closest_leaf(&self.leaves, target);
        tracing::trace!(
            region = target.get(),
            leaf = self.leaves[position].id().get(),
            "routing insert"
        );
        position
    }

    /// Store a key whose bounds were already checked. Returns whether it was new.
    fn store(&mut self, key: RecordKey, value: V) -> bool {
        let position = self.route(&key);
        match self.leaves[position].insert(key, value, &self.geometry) {
            InsertOutcome::Duplicate => return false,
            InsertOutcome::Stored | InsertOutcome::Collapsed => {}
            InsertOutcome::Split(split) => {
                let retired = self.leaves.remove(position);
                debug_assert_eq!(retired.record_count(), 0, "a split leaf keeps no records");
                let children = split.into_leaves();
                for child in &children {
                    self.max_depth = self.max_depth.max(child.id().depth());
                }
                tracing::debug!(
                    leaf = retired.id().get(),
                    children = children.len(),
                    max_depth = self.max_depth,
                    "leaf split"
                );
                self.leaves.extend(children);
            }
        }
        self.size.fetch_add(1, Ordering::Relaxed);
        true
    }
}

/// Position of the leaf sharing the longest prefix with `region`. Ties go to
/// the leaf that comes first in `leaves`.
fn closest_leaf<V>(leaves: &[LeafNode<V>], region: LeafId) -> usize {
    leaves
        .iter()
        .enumerate()
        .min_by_key(|(_, leaf)| Reverse(id_similarity(leaf.id().get(), region.get())))
        .map_or(0, |(position, _)| position)
}

impl<V: PartialEq> TdTree<V> {
    /// Remove every record whose value equals `value`. Returns how many were removed.
    pub fn delete_keys_with_value(&mut self, value: &V) -> usize {
        let removed: usize = self
            .leaves
            .iter_mut()
            .filter(|leaf| leaf.record_count() > 0)
            .map(|leaf| leaf.delete_keys_with_value(value))
            .sum();
        let count = i64::try_from(removed).unwrap_or(i64::MAX);
        self.size.fetch_sub(count, Ordering::Relaxed);
        removed
    }
}

impl<V: Clone> TdTree<V> {
    /// Move the value of `object_id` valid at `at` to `[new_start, max_value)`.
    ///
    /// Returns `false` and changes nothing if no value is valid at `at`.
    ///
    /// # Errors
    ///
    /// Fails when `new_start` is negative.
    pub fn set_key_temporals(&mut self, object_id: &str, at: i64, new_start: i64) -> Result<bool> {
        self.set_key_temporals_until(object_id, at, new_start, self.config.max_value)
    }

    /// Move the value of `object_id` valid at `at` to `[new_start, new_end)`.
    ///
    /// Returns `false` and changes nothing if no value is valid at `at`.
    ///
    /// # Errors
    ///
    /// Fails when the new interval is out of bounds.
    pub fn set_key_temporals_until(
        &mut self,
        object_id: &str,
        at: i64,
        new_start: i64,
        new_end: i64,
    ) -> Result<bool> {
        self.check_bounds(new_start, new_end)?;
        let Some(value) = self.get_value(object_id, at).cloned() else {
            return Ok(false);
        };
        self.replace_key_value(object_id, at, new_start, new_end, value)?;
        Ok(true)
    }
}
