// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Index configuration and domain constants.

use crate::error::{Result, TdTreeError};

/// Upper bound of the validity domain: 5000-01-01T00:00:00Z in epoch milliseconds.
///
/// Indexes that share cached data must agree on this bound, since it fixes the
/// geometry of every leaf triangle.
pub const MAX_VALUE: i64 = 95_617_584_000_000;

/// Default number of records a splittable leaf holds before it divides.
pub const DEFAULT_BLOCK_SIZE: usize = 64;

/// Largest domain bound whose leaf coordinates stay exact in `f64`.
const MAX_REPRESENTABLE: i64 = 1 << 53;

/// Construction parameters for a [`TdTree`](crate::TdTree).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TdTreeConfig {
    /// Slots per splittable leaf.
    pub block_size: usize,
    /// Inclusive upper bound for interval ends.
    pub max_value: i64,
}

impl Default for TdTreeConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            max_value: MAX_VALUE,
        }
    }
}

impl TdTreeConfig {
    /// Replace the leaf block size.
    #[must_use]
    pub const fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Replace the domain bound.
    ///
    /// Only indexes that never exchange records with default-configured ones
    /// should change this.
    #[must_use]
    pub const fn with_max_value(mut self, max_value: i64) -> Self {
        self.max_value = max_value;
        self
    }

    /// Check that the parameters describe a usable index.
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(TdTreeError::InvalidBlockSize);
        }
        if self.max_value <= 0 || self.max_value > MAX_REPRESENTABLE {
            return Err(TdTreeError::InvalidMaxValue {
                max_value: self.max_value,
            });
        }
        Ok(())
    }
}
