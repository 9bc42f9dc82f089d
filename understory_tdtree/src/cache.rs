// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cache-manager facing interface.

use alloc::vec::Vec;

use crate::error::Result;
use crate::index::TdTree;
use crate::types::LeafStatistics;

/// Operations a cache manager needs from a temporal index.
///
/// Reads hand out owned values so implementations are free to store records
/// in whatever form suits them.
pub trait TemporalCache<V> {
    /// Cache `value` for `object_id` over `[start, end)`.
    fn insert_value(&mut self, object_id: &str, start: i64, end: i64, value: V) -> Result<()>;

    /// The value cached for `object_id` that is valid at `at`.
    fn get_value(&self, object_id: &str, at: i64) -> Option<V>;

    /// Remove one record of `object_id` valid at `at`.
    fn delete_value(&mut self, object_id: &str, at: i64) -> bool;

    /// Remove every record holding `value`.
    fn delete_keys_with_value(&mut self, value: &V) -> usize;

    /// Replace the value of the record of `object_id` valid at `at`.
    fn update_value(&mut self, object_id: &str, at: i64, value: V) -> bool;

    /// Delete the record of `object_id` valid at `at` and store `value` over
    /// `[new_start, new_end)`.
    fn replace_key_value(
        &mut self,
        object_id: &str,
        at: i64,
        new_start: i64,
        new_end: i64,
        value: V,
    ) -> Result<bool>;

    /// Move the value of `object_id` valid at `at` to `[new_start, new_end)`,
    /// where a missing `new_end` means the end of the domain.
    fn set_key_temporals(
        &mut self,
        object_id: &str,
        at: i64,
        new_start: i64,
        new_end: Option<i64>,
    ) -> Result<bool>;

    /// Compact storage by reinserting every record.
    fn rebuild_index(&mut self);

    /// Discard every record.
    fn drop_index(&mut self);

    /// Mean share of dead slots in populated storage.
    fn calculate_fragmentation(&self) -> f64;

    /// Per-leaf diagnostics.
    fn leaf_statistics(&self) -> Vec<LeafStatistics>;

    /// Number of stored records.
    fn index_size(&self) -> i64;

    /// Upper bound of the validity domain.
    fn max_value(&self) -> i64;
}

impl<V: Clone + PartialEq> TemporalCache<V> for TdTree<V> {
    fn insert_value(&mut self, object_id: &str, start: i64, end: i64, value: V) -> Result<()> {
        Self::insert_value(self, object_id, start, end, value)
    }

    fn get_value(&self, object_id: &str, at: i64) -> Option<V> {
        Self::get_value(self, object_id, at).cloned()
    }

    fn delete_value(&mut self, object_id: &str, at: i64) -> bool {
        Self::delete_value(self, object_id, at)
    }

    fn delete_keys_with_value(&mut self, value: &V) -> usize {
        Self::delete_keys_with_value(self, value)
    }

    fn update_value(&mut self, object_id: &str, at: i64, value: V) -> bool {
        Self::update_value(self, object_id, at, value)
    }

    fn replace_key_value(
        &mut self,
        object_id: &str,
        at: i64,
        new_start: i64,
        new_end: i64,
        value: V,
    ) -> Result<bool> {
        Self::replace_key_value(self, object_id, at, new_start, new_end, value)
    }

    fn set_key_temporals(
        &mut self,
        object_id: &str,
        at: i64,
        new_start: i64,
        new_end: Option<i64>,
    ) -> Result<bool> {
        let new_end = new_end.unwrap_or(self.config().max_value);
        self.set_key_temporals_until(object_id, at, new_start, new_end)
    }

    fn rebuild_index(&mut self) {
        Self::rebuild_index(self);
    }

    fn drop_index(&mut self) {
        Self::drop_index(self);
    }

    fn calculate_fragmentation(&self) -> f64 {
        Self::calculate_fragmentation(self)
    }

    fn leaf_statistics(&self) -> Vec<LeafStatistics> {
        Self::leaf_statistics(self)
    }

    fn index_size(&self) -> i64 {
        Self::index_size(self)
    }

    fn max_value(&self) -> i64 {
        Self::max_value(self)
    }
}
