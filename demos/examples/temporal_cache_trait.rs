// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Driving the index through the `TemporalCache` trait.
//!
//! A cache manager written against the trait can swap index implementations.
//!
//! Run:
//! - `cargo run -p understory_tdtree_demos --example temporal_cache_trait`

use understory_tdtree::{Result, TdTree, TemporalCache};

/// Close the state that opened at `since` and open `state` at `at`.
fn transition(
    cache: &mut dyn TemporalCache<String>,
    object_id: &str,
    since: i64,
    at: i64,
    state: &str,
) -> Result<()> {
    cache.set_key_temporals(object_id, at, since, Some(at))?;
    let max = cache.max_value();
    cache.insert_value(object_id, at, max, state.to_owned())
}

fn main() -> Result<()> {
    let mut tree: TdTree<String> = TdTree::new();
    let cache: &mut dyn TemporalCache<String> = &mut tree;

    let max = cache.max_value();
    cache.insert_value("door-1", 0, max, "closed".to_owned())?;
    transition(cache, "door-1", 0, 1_000, "open")?;
    transition(cache, "door-1", 1_000, 2_500, "closed")?;

    for at in [500, 1_000, 2_000, 2_500, 10_000] {
        println!("door-1 at {at}: {:?}", cache.get_value("door-1", at));
    }
    println!("records: {}", cache.index_size());
    Ok(())
}
