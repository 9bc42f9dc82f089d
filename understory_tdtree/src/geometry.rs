// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Triangle geometry of the index plane.
//!
//! The plane has `start` on x and `end` on y. The root triangle has its right
//! angle at `(0, max)` and legs running down to `(0, 0)` and right to
//! `(max, max)`, so it covers every interval with `end >= start`. Each split
//! bisects a triangle along the altitude from its apex, producing two right
//! isosceles children whose apex is the midpoint of the parent's hypotenuse.
//!
//! Leg lengths shrink by `√2/2` per level. The table below stores them as
//! exact halvings of the domain bound on even depths, and every vertex offset
//! actually applied is an even-depth length, so apexes and vertices land on
//! exactly representable coordinates and sibling triangles share edges bit for
//! bit.

use alloc::vec::Vec;
use core::f64::consts::FRAC_1_SQRT_2;

use kurbo::Point;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::bits::id_length;
use crate::types::{Direction, LeafId, Triangle};

/// Deepest level a leaf may occupy; leaves that would split past it become
/// point leaves instead.
pub(crate) const MAX_ENCODABLE_DEPTH: u32 = id_length(i32::MAX as u32) - 1;

/// Decimal places kept by [`Geometry::normalize_zero`].
const ROUNDING_SCALE: f64 = 1e6;

/// Magnitude past which every `f64` already sits on the micro grid.
const EXACT_MAGNITUDE: f64 = 9_007_199_254.740_992;

/// Outcome of testing a triangle against a query rectangle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum RectOverlap {
    /// All three vertices lie inside.
    Contained,
    /// No vertex lies inside.
    Disjoint,
    /// One or two vertices lie inside.
    Partial { inside: u8 },
}

/// Per-index geometry tables.
#[derive(Clone, Debug)]
pub(crate) struct Geometry {
    max_value: f64,
    /// `lengths[d]` is the leg length at depth `d`.
    lengths: Vec<f64>,
}

impl Geometry {
    pub(crate) fn new(max_value: i64) -> Self {
        #[allow(
            clippy::cast_precision_loss,
            reason = "Domain bounds are validated to be at most 2^53."
        )]
        let max = max_value as f64;
        let lengths = (0..=MAX_ENCODABLE_DEPTH + 2)
            .map(|depth| {
                let base = if depth % 2 == 0 {
                    max
                } else {
                    max * FRAC_1_SQRT_2
                };
                base / f64::from(1_u32 << (depth / 2))
            })
            .collect();
        Self {
            max_value: max,
            lengths,
        }
    }

    /// Leg length of a triangle at `depth`.
    #[inline]
    pub(crate) fn adjusted_length(&self, depth: u32) -> f64 {
        self.lengths[depth as usize]
    }

    /// `adjusted_length(depth) · √2/2`, taken from the next table row.
    #[inline]
    fn half_diagonal(&self, depth: u32) -> f64 {
        self.lengths[depth as usize + 1]
    }

    /// Round to six decimals, drop the sign, and clamp to the domain bound.
    pub(crate) fn normalize_zero(&self, value: f64) -> f64 {
        let rounded = if value.abs() >= EXACT_MAGNITUDE {
            value
        } else {
            (value * ROUNDING_SCALE).round() / ROUNDING_SCALE
        };
        let magnitude = rounded.abs();
        if magnitude > self.max_value {
            self.max_value
        } else {
            magnitude
        }
    }

    fn normalized(&self, x: f64, y: f64) -> Point {
        Point::new(self.normalize_zero(x), self.normalize_zero(y))
    }

    /// The root triangle.
    pub(crate) fn root(&self) -> Triangle {
        Triangle {
            apex: Point::new(0.0, self.max_value),
            direction: Direction::ROOT,
            depth: 0,
        }
    }

    /// Vertices of `triangle`: apex first, then the leg ends counter-clockwise.
    pub(crate) fn triangle_vertices(&self, triangle: &Triangle) -> [Point; 3] {
        let l = self.adjusted_length(triangle.depth);
        let h = self.half_diagonal(triangle.depth);
        let Point { x, y } = triangle.apex;
        let legs = match triangle.direction.get() {
            0 => [(x + h, y - h), (x + h, y + h)],
            1 => [(x + l, y), (x, y + l)],
            2 => [(x + h, y + h), (x - h, y + h)],
            3 => [(x, y + l), (x - l, y)],
            4 => [(x - h, y + h), (x - h, y - h)],
            5 => [(x - l, y), (x, y - l)],
            6 => [(x - h, y - h), (x + h, y - h)],
            _ => [(x, y - l), (x + l, y)],
        };
        [
            self.normalized(x, y),
            self.normalized(legs[0].0, legs[0].1),
            self.normalized(legs[1].0, legs[1].1),
        ]
    }

    /// Apex shared by both children of a triangle whose children sit at `depth`.
    pub(crate) fn child_apex(&self, depth: u32, parent: Direction, apex: Point) -> Point {
        let c = self.adjusted_length(depth);
        let q = self.half_diagonal(depth);
        let Point { x, y } = apex;
        let (cx, cy) = match parent.get() {
            0 => (x + c, y),
            1 => (x + q, y + q),
            2 => (x, y + c),
            3 => (x - q, y + q),
            4 => (x - c, y),
            5 => (x - q, y - q),
            6 => (x, y - c),
            _ => (x + q, y - q),
        };
        self.normalized(cx, cy)
    }

    /// The `(lower, higher)` children of `parent`.
    pub(crate) fn children(&self, parent: &Triangle) -> (Triangle, Triangle) {
        let depth = parent.depth + 1;
        let apex = self.child_apex(depth, parent.direction, parent.apex);
        let (lower, higher) = parent.direction.children();
        (
            Triangle {
                apex,
                direction: lower,
                depth,
            },
            Triangle {
                apex,
                direction: higher,
                depth,
            },
        )
    }

    /// Triangle of the region `id`, derived by walking its path from the root.
    pub(crate) fn triangle_at(&self, id: LeafId) -> Triangle {
        let depth = id.depth();
        let mut triangle = self.root();
        for level in (0..depth).rev() {
            let (lower, higher) = self.children(&triangle);
            triangle = if (id.get() >> level) & 1 == 0 {
                lower
            } else {
                higher
            };
        }
        triangle
    }

    /// Whether `(start, end)` lies in `triangle`, edges included.
    pub(crate) fn check_point_intersection(
        &self,
        triangle: &Triangle,
        start: i64,
        end: i64,
    ) -> bool {
        #[allow(
            clippy::cast_precision_loss,
            reason = "Interval bounds never exceed the 2^53 domain bound."
        )]
        let (x, y) = (start as f64, end as f64);
        point_in_triangle(x, y, &self.triangle_vertices(triangle))
    }

    /// Test `triangle` against `[0, rect.x] × [rect.y, max]` by vertex containment.
    pub(crate) fn check_rectangle_intersection(
        &self,
        triangle: &Triangle,
        rect: Point,
    ) -> RectOverlap {
        let inside = self
            .triangle_vertices(triangle)
            .iter()
            .filter(|v| (0.0..=rect.x).contains(&v.x) && (rect.y..=self.max_value).contains(&v.y))
            .count();
        match inside {
            3 => RectOverlap::Contained,
            0 => RectOverlap::Disjoint,
            1 => RectOverlap::Partial { inside: 1 },
            _ => RectOverlap::Partial { inside: 2 },
        }
    }
}

#[inline]
fn edge_sign(p: Point, a: Point, b: Point) -> f64 {
    (p.x - b.x) * (a.y - b.y) - (a.x - b.x) * (p.y - b.y)
}

/// Same-side test: true when `(x, y)` is on the same side of all three edges.
///
/// A zero sign agrees with either side, so points on an edge are inside.
pub(crate) fn point_in_triangle(x: f64, y: f64, vertices: &[Point; 3]) -> bool {
    let p = Point::new(x, y);
    let [a, b, c] = *vertices;
    let d1 = edge_sign(p, a, b);
    let d2 = edge_sign(p, b, c);
    let d3 = edge_sign(p, c, a);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

/// Whether any two vertices coincide, so the triangle cannot be subdivided.
pub(crate) fn triangle_is_point(vertices: &[Point; 3]) -> bool {
    let [a, b, c] = *vertices;
    a == b || b == c || a == c
}
