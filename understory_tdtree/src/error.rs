// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type for index construction and insertion.

/// Errors reported by [`TdTree`](crate::TdTree).
///
/// Lookups, deletes, and updates of absent records are not errors; they
/// return `None` or `false`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TdTreeError {
    /// The validity interval starts before zero.
    #[error("validity start {start} is negative")]
    NegativeStart {
        /// Offending start value.
        start: i64,
    },
    /// The validity interval ends past the index's maximum value.
    #[error("validity end {end} exceeds the maximum value {max_value}")]
    EndOutOfRange {
        /// Offending end value.
        end: i64,
        /// Upper bound of the index domain.
        max_value: i64,
    },
    /// Splittable leaves need room for at least one record.
    #[error("block size must be at least 1")]
    InvalidBlockSize,
    /// The domain bound must be positive and exactly representable as `f64`.
    #[error("maximum value {max_value} must be in 1..=2^53")]
    InvalidMaxValue {
        /// Offending bound.
        max_value: i64,
    },
}

/// Result alias used throughout the crate.
pub type Result<T, E = TdTreeError> = core::result::Result<T, E>;
