// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Leaf layout.
//!
//! Build an index over a tiny domain and print each leaf's triangle, so the
//! decomposition of interval space can be followed by hand.
//!
//! Run:
//! - `cargo run -p understory_tdtree_demos --example leaf_layout`

use understory_tdtree::{TdTree, TdTreeConfig, TdTreeError};

fn main() -> Result<(), TdTreeError> {
    let config = TdTreeConfig::default()
        .with_block_size(2)
        .with_max_value(1024);
    let mut tree: TdTree<u32> = TdTree::with_config(config)?;
    let intervals = [
        (600, 1000),
        (10, 20),
        (100, 900),
        (300, 310),
        (900, 1020),
        (50, 60),
    ];
    for (i, (start, end)) in intervals.into_iter().enumerate() {
        tree.insert_value(&format!("obj-{i}"), start, end, i as u32)?;
    }

    for leaf in tree.leaf_statistics() {
        let [apex, a, b] = leaf.vertices;
        println!(
            "leaf {:>6} {:?} dir {} records {} apex ({}, {}) legs {:.1}",
            leaf.binary_id,
            leaf.kind,
            leaf.direction,
            leaf.record_count,
            apex.x,
            apex.y,
            apex.distance(a).max(apex.distance(b)),
        );
    }

    // Which leaves are consulted depends on the query instant.
    for at in [15, 305, 700] {
        let hits: Vec<_> = (0..intervals.len())
            .filter_map(|i| tree.get_value(&format!("obj-{i}"), at))
            .collect();
        println!("valid at {at}: {hits:?}");
    }
    Ok(())
}
