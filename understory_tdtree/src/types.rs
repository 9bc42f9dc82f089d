// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types: leaf identifiers, record keys, triangle orientation, and
//! per-leaf statistics.

use alloc::format;
use alloc::string::String;

use kurbo::Point;

use crate::bits::id_length;

/// Identifier of a leaf region.
///
/// A leaf id encodes the root-to-leaf path of an implicit binary tree behind a
/// leading sentinel `1` bit:
///
/// - The root is `1` at depth 0.
/// - The lower child of `L` is `L << 1`, the higher child is `(L << 1) | 1`.
/// - `depth = bit_length(id) - 1`.
///
/// Ids are never reused or renumbered for the lifetime of an index.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LeafId(u32);

impl LeafId {
    /// The root region.
    pub const ROOT: Self = Self(1);

    pub(crate) const fn new(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw encoded path.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Depth below the root.
    pub const fn depth(self) -> u32 {
        id_length(self.0) - 1
    }

    /// Path rendered as a binary string, sentinel bit included.
    pub fn binary(self) -> String {
        format!("{:b}", self.0)
    }

    pub(crate) const fn lower_child(self) -> Self {
        Self(self.0 << 1)
    }

    pub(crate) const fn higher_child(self) -> Self {
        Self((self.0 << 1) | 1)
    }

    /// The ancestor made of the leading `length` bits of this id.
    pub(crate) const fn prefix(self, length: u32) -> Self {
        Self(self.0 >> (id_length(self.0) - length))
    }
}

/// Orientation of a leaf triangle, in 45° steps counter-clockwise from +start.
///
/// The direction points from the right-angle apex towards the midpoint of the
/// hypotenuse. Even directions are axis-aligned, odd ones are diagonal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct Direction(u8);

impl Direction {
    /// The root triangle opens towards +start and -end.
    pub(crate) const ROOT: Self = Self(7);

    pub(crate) const fn get(self) -> u8 {
        self.0
    }

    /// Directions of the `(lower, higher)` children after bisecting along the
    /// altitude from the apex.
    pub(crate) const fn children(self) -> (Self, Self) {
        let d = self.0;
        if d >= 1 && d <= 4 {
            (Self((d + 5) % 8), Self(d + 3))
        } else {
            (Self((d + 3) % 8), Self((d + 5) % 8))
        }
    }
}

/// Right isosceles triangle owned by a leaf: apex at the right angle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct Triangle {
    pub(crate) apex: Point,
    pub(crate) direction: Direction,
    pub(crate) depth: u32,
}

/// Key of a cached record: hashed object id and validity interval.
///
/// The record sits at the point `(start, end)` of the index plane.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey {
    /// Hash of the object id, see [`object_id_hash`](crate::object_id_hash).
    pub object: i64,
    /// First instant of validity.
    pub start: i64,
    /// First instant past validity. Equal to `start` for instantaneous facts.
    pub end: i64,
}

impl RecordKey {
    /// Create a key from a hashed object id and an interval.
    pub const fn new(object: i64, start: i64, end: i64) -> Self {
        Self { object, start, end }
    }

    /// Whether this record describes `object` at instant `at`.
    ///
    /// Matches `start <= at < end`, or `start == end == at` for point validity.
    pub const fn is_valid_at(&self, object: i64, at: i64) -> bool {
        self.object == object
            && ((self.start <= at && at < self.end) || (self.start == self.end && self.end == at))
    }
}

/// Storage variant of a leaf.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LeafKind {
    /// Fixed-capacity slots; divides when full.
    Splittable,
    /// Unbounded map; terminal.
    Point,
}

/// Diagnostic snapshot of one leaf.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LeafStatistics {
    /// Encoded leaf path.
    pub id: u32,
    /// Leaf path as a binary string.
    pub binary_id: String,
    /// Storage variant.
    pub kind: LeafKind,
    /// Triangle vertices, apex first, counter-clockwise.
    pub vertices: [Point; 3],
    /// Orientation code in `0..8`.
    pub direction: u8,
    /// Live records.
    pub record_count: usize,
    /// Share of written slots that hold tombstones.
    pub fragmentation: f64,
}

impl LeafStatistics {
    /// The leaf this snapshot describes.
    pub const fn leaf_id(&self) -> LeafId {
        LeafId::new(self.id)
    }
}
