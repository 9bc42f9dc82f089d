// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Basic usage of Understory TD-Tree: cache, look up, move, and delete values.

use understory_tdtree::{TdTree, TdTreeError};

fn main() -> Result<(), TdTreeError> {
    let mut cache: TdTree<&str> = TdTree::new();
    cache.insert_value("pump-3", 1_000, 5_000, "running")?;
    cache.insert_value("pump-3", 5_000, 9_000, "stopped")?;
    cache.insert_value("pump-4", 2_000, 2_000, "serviced")?;

    for at in [999, 1_000, 4_999, 5_000, 9_000] {
        println!("pump-3 at {at}: {:?}", cache.get_value("pump-3", at));
    }
    println!("pump-4 at 2000: {:?}", cache.get_value("pump-4", 2_000));

    // Extend the stopped state to the end of the domain.
    cache.set_key_temporals("pump-3", 6_000, 5_000)?;
    println!("pump-3 at 50000: {:?}", cache.get_value("pump-3", 50_000));

    cache.delete_value("pump-4", 2_000);
    println!(
        "records: {}, leaves: {}",
        cache.index_size(),
        cache.leaf_count()
    );
    Ok(())
}
