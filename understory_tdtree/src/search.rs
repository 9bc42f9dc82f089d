// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Candidate-leaf pruning for point-in-time queries.
//!
//! A record `[start, end)` is valid at `t` only if `start <= t <= end`, which
//! is the rectangle `[0, t] × [t, max]` of the index plane. The search walks
//! leaf-id prefixes from the root downwards, testing the triangle of each
//! prefix against that rectangle, and settles whole subtrees at once whenever
//! a prefix triangle is fully inside or fully outside.

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use kurbo::Point;

use crate::bits::match_length;
use crate::geometry::{Geometry, RectOverlap};
use crate::leaf::LeafNode;

/// Positions in `leaves` of the populated leaves that may hold a record valid
/// at `at`, in discovery order.
pub(crate) fn candidate_leaves<V>(
    leaves: &[LeafNode<V>],
    geometry: &Geometry,
    at: i64,
) -> Vec<usize> {
    let mut queue: VecDeque<usize> = leaves
        .iter()
        .enumerate()
        .filter(|(_, leaf)| leaf.record_count() > 0)
        .map(|(position, _)| position)
        .collect();
    if queue.len() == 1 {
        return queue.into_iter().collect();
    }

    #[allow(
        clippy::cast_precision_loss,
        reason = "Query instants stay within the 2^53 domain bound."
    )]
    let rect = Point::new(at as f64, at as f64);
    let mut candidates = Vec::new();
    let mut length = 1;
    while let Some(front) = queue.pop_front() {
        let id = leaves[front].id();
        let prefix = id.prefix(length);
        let shares_prefix =
            |position: &usize| match_length(leaves[*position].id().get(), prefix.get()) == length;
        match geometry.check_rectangle_intersection(&geometry.triangle_at(prefix), rect) {
            RectOverlap::Contained => {
                candidates.push(front);
                let (inside, rest): (Vec<usize>, Vec<usize>) =
                    queue.into_iter().partition(shares_prefix);
                candidates.extend(inside);
                queue = rest.into();
                length = 1;
            }
            RectOverlap::Disjoint => {
                queue.retain(|position| !shares_prefix(position));
                length = 1;
            }
            RectOverlap::Partial { inside } if id == prefix => {
                tracing::trace!(leaf = id.get(), inside, "partially covered leaf kept");
                candidates.push(front);
                length = 1;
            }
            RectOverlap::Partial { .. } => {
                queue.push_front(front);
                length += 1;
            }
        }
    }
    candidates
}
