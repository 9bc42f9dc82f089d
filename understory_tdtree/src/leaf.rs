// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Leaf storage: fixed-capacity splittable leaves and unbounded point leaves.

use alloc::boxed::Box;
use alloc::vec::Vec;

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;

use crate::geometry::{Geometry, MAX_ENCODABLE_DEPTH, triangle_is_point};
use crate::split::LeafSplit;
use crate::types::{LeafId, LeafKind, RecordKey, Triangle};

/// Result of offering a record to a leaf.
#[derive(Debug)]
pub(crate) enum InsertOutcome<V> {
    /// The record now lives in this leaf.
    Stored,
    /// An identical key was already present; nothing changed.
    Duplicate,
    /// The leaf replaced itself with a point leaf of the same id holding the record.
    Collapsed,
    /// The leaf divided; it is retired and the split holds its records.
    Split(LeafSplit<V>),
}

/// A leaf of the index.
#[derive(Debug)]
pub(crate) enum LeafNode<V> {
    Splittable(SplittableLeaf<V>),
    Point(PointLeaf<V>),
}

/// Fixed-capacity leaf. Deleted slots become tombstones and are not reused.
#[derive(Debug)]
pub(crate) struct SplittableLeaf<V> {
    id: LeafId,
    triangle: Triangle,
    block_size: usize,
    slots: Vec<Option<(RecordKey, V)>>,
    live: usize,
}

/// Terminal leaf keyed by the full record key.
#[derive(Debug)]
pub(crate) struct PointLeaf<V> {
    id: LeafId,
    triangle: Triangle,
    records: HashMap<RecordKey, V>,
}

impl<V> LeafNode<V> {
    /// An empty splittable leaf.
    pub(crate) fn splittable(id: LeafId, triangle: Triangle, block_size: usize) -> Self {
        Self::Splittable(SplittableLeaf {
            id,
            triangle,
            block_size,
            slots: Vec::with_capacity(block_size),
            live: 0,
        })
    }

    pub(crate) fn id(&self) -> LeafId {
        match self {
            Self::Splittable(leaf) => leaf.id,
            Self::Point(leaf) => leaf.id,
        }
    }

    pub(crate) fn triangle(&self) -> &Triangle {
        match self {
            Self::Splittable(leaf) => &leaf.triangle,
            Self::Point(leaf) => &leaf.triangle,
        }
    }

    pub(crate) fn kind(&self) -> LeafKind {
        if self.is_splittable() {
            LeafKind::Splittable
        } else {
            LeafKind::Point
        }
    }

    pub(crate) fn is_splittable(&self) -> bool {
        matches!(self, Self::Splittable(_))
    }

    /// Live records held by this leaf.
    pub(crate) fn record_count(&self) -> usize {
        match self {
            Self::Splittable(leaf) => leaf.live,
            Self::Point(leaf) => leaf.records.len(),
        }
    }

    /// Store `key` unless it is already present, dividing a full splittable leaf.
    pub(crate) fn insert(
        &mut self,
        key: RecordKey,
        value: V,
        geometry: &Geometry,
    ) -> InsertOutcome<V> {
        let leaf = match self {
            Self::Point(leaf) => return leaf.insert(key, value),
            Self::Splittable(leaf) => leaf,
        };
        if leaf.contains(&key) {
            return InsertOutcome::Duplicate;
        }
        if leaf.slots.len() < leaf.block_size {
            leaf.slots.push(Some((key, value)));
            leaf.live += 1;
            return InsertOutcome::Stored;
        }

        let id = leaf.id;
        let triangle = leaf.triangle;
        let block_size = leaf.block_size;
        let mut entries = leaf.take_records();
        entries.push((key, value));

        let (lower, higher) = geometry.children(&triangle);
        let boundary = geometry.triangle_vertices(&lower);
        if triangle_is_point(&boundary) || lower.depth == MAX_ENCODABLE_DEPTH {
            tracing::debug!(
                leaf = id.get(),
                records = entries.len(),
                "collapsing into point leaf"
            );
            *self = Self::Point(PointLeaf {
                id,
                triangle,
                records: entries.into_iter().collect(),
            });
            return InsertOutcome::Collapsed;
        }

        let lower_leaf = Self::splittable(id.lower_child(), lower, block_size);
        let higher_leaf = Self::splittable(id.higher_child(), higher, block_size);
        let mut split = LeafSplit::Divided {
            retired: id,
            lower_triangle: lower,
            lower: Box::new(LeafSplit::Leaf(lower_leaf)),
            higher: Box::new(LeafSplit::Leaf(higher_leaf)),
        };
        for (key, value) in entries {
            split.insert(key, value, geometry);
        }
        InsertOutcome::Split(split)
    }

    /// The smallest key describing `object` at `at`, with its value.
    pub(crate) fn first_valid(&self, object: i64, at: i64) -> Option<(&RecordKey, &V)> {
        match self {
            Self::Splittable(leaf) => leaf
                .slots
                .iter()
                .flatten()
                .filter(|(key, _)| key.is_valid_at(object, at))
                .min_by_key(|(key, _)| *key)
                .map(|(key, value)| (key, value)),
            Self::Point(leaf) => leaf
                .records
                .iter()
                .filter(|(key, _)| key.is_valid_at(object, at))
                .min_by_key(|(key, _)| *key),
        }
    }

    /// Remove the record stored under `key`, leaving a tombstone in a splittable leaf.
    pub(crate) fn remove(&mut self, key: &RecordKey) -> bool {
        match self {
            Self::Splittable(leaf) => {
                let Some(slot) = leaf
                    .slots
                    .iter_mut()
                    .find(|slot| matches!(slot, Some((existing, _)) if existing == key))
                else {
                    return false;
                };
                *slot = None;
                leaf.live -= 1;
                true
            }
            Self::Point(leaf) => leaf.records.remove(key).is_some(),
        }
    }

    /// Mutable access to the value stored under `key`.
    pub(crate) fn value_mut(&mut self, key: &RecordKey) -> Option<&mut V> {
        match self {
            Self::Splittable(leaf) => leaf
                .slots
                .iter_mut()
                .flatten()
                .find(|(existing, _)| existing == key)
                .map(|(_, value)| value),
            Self::Point(leaf) => leaf.records.get_mut(key),
        }
    }

    /// Every live record, consuming the leaf.
    pub(crate) fn dump_leaf(self) -> Vec<(RecordKey, V)> {
        match self {
            Self::Splittable(leaf) => leaf.slots.into_iter().flatten().collect(),
            Self::Point(leaf) => leaf.records.into_iter().collect(),
        }
    }

    /// Share of written slots that are tombstones.
    #[allow(
        clippy::cast_precision_loss,
        reason = "Slot counts are bounded by the block size."
    )]
    pub(crate) fn fragmentation(&self) -> f64 {
        match self {
            Self::Splittable(leaf) if !leaf.slots.is_empty() => {
                let tombstones = leaf.slots.len() - leaf.live;
                tombstones as f64 / leaf.slots.len() as f64
            }
            _ => 0.0,
        }
    }
}

impl<V: PartialEq> LeafNode<V> {
    /// Remove every record whose value equals `value`.
    pub(crate) fn delete_keys_with_value(&mut self, value: &V) -> usize {
        match self {
            Self::Splittable(leaf) => {
                let mut removed = 0;
                for slot in &mut leaf.slots {
                    if matches!(slot, Some((_, current)) if current == value) {
                        *slot = None;
                        removed += 1;
                    }
                }
                leaf.live -= removed;
                removed
            }
            Self::Point(leaf) => {
                let before = leaf.records.len();
                leaf.records.retain(|_, current| current != value);
                before - leaf.records.len()
            }
        }
    }
}

impl<V> SplittableLeaf<V> {
    fn contains(&self, key: &RecordKey) -> bool {
        self.slots
            .iter()
            .flatten()
            .any(|(existing, _)| existing == key)
    }

    /// Move out every live record, leaving the leaf empty.
    fn take_records(&mut self) -> Vec<(RecordKey, V)> {
        self.live = 0;
        core::mem::take(&mut self.slots)
            .into_iter()
            .flatten()
            .collect()
    }
}

impl<V> PointLeaf<V> {
    fn insert(&mut self, key: RecordKey, value: V) -> InsertOutcome<V> {
        match self.records.entry(key) {
            Entry::Occupied(_) => InsertOutcome::Duplicate,
            Entry::Vacant(slot) => {
                slot.insert(value);
                InsertOutcome::Stored
            }
        }
    }
}
