// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cache lifecycle with logging.
//!
//! Fill a small-block index until it splits, delete part of it, check
//! fragmentation, and rebuild. Split and rebuild events are logged.
//!
//! Run:
//! - `cargo run -p understory_tdtree_demos --example cache_lifecycle`

use tracing_subscriber::EnvFilter;
use understory_tdtree::{TdTree, TdTreeConfig, TdTreeError};

const HOUR_MS: i64 = 3_600_000;
const BASE: i64 = 1_700_000_000_000;

fn main() -> Result<(), TdTreeError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = TdTreeConfig::default().with_block_size(8);
    let mut cache: TdTree<String> = TdTree::with_config(config)?;

    // Hourly readings for a handful of meters over two days.
    for meter in 0..6 {
        for hour in 0..48 {
            let start = BASE + hour * HOUR_MS;
            cache.insert_value(
                &format!("meter-{meter}"),
                start,
                start + HOUR_MS,
                format!("meter-{meter} reading #{hour}"),
            )?;
        }
    }
    println!(
        "stored {} records in {} leaves (depth {})",
        cache.index_size(),
        cache.leaf_count(),
        cache.max_depth()
    );

    let noon = BASE + 12 * HOUR_MS + 30 * 60_000;
    println!("meter-2 at noon: {:?}", cache.get_value("meter-2", noon));

    // Forget every even hour of the first day.
    for meter in 0..6 {
        for hour in (0..24).step_by(2) {
            cache.delete_value(&format!("meter-{meter}"), BASE + hour * HOUR_MS);
        }
    }
    println!(
        "after deletes: {} records, fragmentation {:.3}",
        cache.index_size(),
        cache.calculate_fragmentation()
    );

    cache.rebuild_index();
    println!(
        "after rebuild: {} records in {} leaves, fragmentation {:.3}",
        cache.index_size(),
        cache.leaf_count(),
        cache.calculate_fragmentation()
    );

    cache.drop_index();
    println!("after drop: {} records", cache.index_size());
    Ok(())
}
