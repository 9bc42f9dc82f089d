// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transient result of a splittable leaf dividing.

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;

use crate::geometry::Geometry;
use crate::leaf::{InsertOutcome, LeafNode};
use crate::types::{LeafId, RecordKey, Triangle};

/// A divided leaf and its realized descendants.
///
/// A child that overflowed while the parent's records were being partitioned
/// is itself a nested `Divided`.
#[derive(Debug)]
pub(crate) enum LeafSplit<V> {
    /// A realized leaf that takes part in the live collection.
    Leaf(LeafNode<V>),
    /// A retired leaf and the two halves that replace it.
    Divided {
        retired: LeafId,
        /// Records inside this triangle go to `lower`, all others to `higher`.
        lower_triangle: Triangle,
        lower: Box<Self>,
        higher: Box<Self>,
    },
}

impl<V> LeafSplit<V> {
    /// Route a record down to the realized leaf that owns its point.
    pub(crate) fn insert(&mut self, key: RecordKey, value: V, geometry: &Geometry) {
        match self {
            Self::Divided {
                lower_triangle,
                lower,
                higher,
                ..
            } => {
                let inside = geometry.check_point_intersection(lower_triangle, key.start, key.end);
                let child = if inside { lower } else { higher };
                child.insert(key, value, geometry);
            }
            Self::Leaf(leaf) => {
                if let InsertOutcome::Split(nested) = leaf.insert(key, value, geometry) {
                    *self = nested;
                }
            }
        }
    }

    /// Realized leaves, lower halves before higher ones.
    pub(crate) fn into_leaves(self) -> Vec<LeafNode<V>> {
        let mut leaves = Vec::new();
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            match node {
                Self::Leaf(leaf) => leaves.push(leaf),
                Self::Divided {
                    retired,
                    lower,
                    higher,
                    ..
                } => {
                    tracing::trace!(leaf = retired.get(), "retired by split");
                    pending.push(*higher);
                    pending.push(*lower);
                }
            }
        }
        leaves
    }
}
