// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bit helpers over leaf identifiers, plus the object id hash.
//!
//! Leaf ids carry a leading sentinel `1` bit, so the bit-length of an id is its
//! depth plus one. Two prefix metrics exist: [`id_similarity`] aligns ids by
//! shifting and is used to route inserts, [`match_length`] scans the binary
//! renderings and is used to prune candidate leaves.

/// Seed of the object id hash.
const HASH_SEED: i64 = 1_125_899_906_842_597;

/// Number of significant bits in `id` (`floor(log2(id)) + 1`, or 0 for 0).
#[inline]
pub const fn id_length(id: u32) -> u32 {
    u32::BITS - id.leading_zeros()
}

/// Leading bits shared by `a` and `b` once the longer id is shifted down to
/// the bit-length of the shorter one. Zero if either id is zero.
pub fn id_similarity(a: u32, b: u32) -> u32 {
    if a == 0 || b == 0 {
        return 0;
    }
    let (len_a, len_b) = (id_length(a), id_length(b));
    let (a, b, len) = if len_a > len_b {
        (a >> (len_a - len_b), b, len_b)
    } else {
        (a, b >> (len_b - len_a), len_a)
    };
    len - id_length(a ^ b)
}

/// Leading characters on which the binary renderings of `a` and `b` agree.
///
/// The scan runs left to right over `format!("{a:b}")` and `format!("{b:b}")`
/// and stops at the first mismatch or at the end of the shorter rendering.
/// Zero renders as `"0"`.
pub fn match_length(a: u32, b: u32) -> u32 {
    let width_a = id_length(a).max(1);
    let width_b = id_length(b).max(1);
    let mut matched = 0;
    while matched < width_a.min(width_b) {
        let bit_a = (a >> (width_a - 1 - matched)) & 1;
        let bit_b = (b >> (width_b - 1 - matched)) & 1;
        if bit_a != bit_b {
            break;
        }
        matched += 1;
    }
    matched
}

/// Deterministic 64-bit polynomial hash of a caller-supplied object id.
///
/// Folds `h = 31 * h + unit` over the UTF-16 code units of `object_id` with
/// wrapping arithmetic. Distinct ids may collide.
pub fn object_id_hash(object_id: &str) -> i64 {
    object_id.encode_utf16().fold(HASH_SEED, |h, unit| {
        h.wrapping_mul(31).wrapping_add(i64::from(unit))
    })
}
